use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

/// Number of decimals of the native token (wei per ether).
pub const NATIVE_TOKEN_DECIMALS: u32 = 18;

/// Render a signed quantity the way the provider encodes hex values: `0x1f`, `-0x1f`, `0x0`.
pub fn format_signed_hex(value: &BigInt) -> String {
	format!("{:#x}", value)
}

/// Render an exact base-unit amount as a decimal token amount, e.g. `-1.500000000000000000`.
pub fn format_token_amount(amount: &BigInt, decimals: u32) -> String {
	let scale = BigUint::from(10u32).pow(decimals);
	let magnitude = amount.magnitude();
	let whole = magnitude / &scale;
	let fraction = magnitude % &scale;
	let sign = if amount.sign() == num_bigint::Sign::Minus && !magnitude.is_zero() {
		"-"
	} else {
		""
	};

	if decimals == 0 {
		return format!("{}{}", sign, whole);
	}

	format!(
		"{}{}.{:0>width$}",
		sign,
		whole,
		fraction.to_string(),
		width = decimals as usize
	)
}
