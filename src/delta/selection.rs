use crate::delta::Deltas;
use crate::ledger::WalletDelta;

use itertools::Itertools;
use std::cmp::Reverse;

/// Pick the address whose balance moved the most in absolute terms.
///
/// Wallets are ranked ascending by `|delta|` and the last one wins. Equal magnitudes are broken
/// by address, the lexicographically smallest address ranking highest. Returns `None` when no
/// wallet was observed.
pub fn most_changed(deltas: &Deltas) -> Option<WalletDelta> {
	deltas
		.iter()
		.map(|(address, delta)| (delta.magnitude(), Reverse(address.as_str()), delta))
		.sorted()
		.next_back()
		.map(|(_, Reverse(address), delta)| WalletDelta::new(address, delta.clone()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use num_bigint::BigInt;

	fn deltas(entries: &[(&str, i64)]) -> Deltas {
		entries
			.iter()
			.map(|(address, delta)| (address.to_string(), BigInt::from(*delta)))
			.collect()
	}

	#[test]
	fn test_largest_magnitude_wins() {
		let winner = most_changed(&deltas(&[("A", -15), ("B", 10), ("F", 5)])).unwrap();
		assert_eq!(winner.address, "A");
		assert_eq!(winner.delta, BigInt::from(-15));

		let winner = most_changed(&deltas(&[("A", -25), ("B", 1025), ("F", -1000)])).unwrap();
		assert_eq!(winner.address, "B");
	}

	#[test]
	fn test_empty_has_no_winner() {
		assert_eq!(most_changed(&Deltas::new()), None);
	}

	#[test]
	fn test_ties_prefer_smallest_address() {
		let ranked = deltas(&[("0xbb", 40), ("0xaa", -40), ("0xcc", 40), ("0xdd", 3)]);

		for _ in 0..10 {
			assert_eq!(most_changed(&ranked).unwrap().address, "0xaa");
		}
	}

	#[test]
	fn test_zero_deltas_still_select() {
		let winner = most_changed(&deltas(&[("self", 0)])).unwrap();
		assert_eq!(winner.address, "self");
	}
}
