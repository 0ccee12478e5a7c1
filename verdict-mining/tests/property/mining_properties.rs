//! Property tests: subsequence containment against a reference
//! implementation, and containment under random interleaving.

use proptest::prelude::*;

use verdict_mining::is_subsequence;

/// Reference implementation: recursive definition of subsequence.
fn is_subsequence_ref(needle: &[u8], hay: &[u8]) -> bool {
    match (needle.first(), hay.first()) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(n), Some(h)) if n == h => is_subsequence_ref(&needle[1..], &hay[1..]),
        _ => is_subsequence_ref(needle, &hay[1..]),
    }
}

proptest! {
    /// Greedy two-pointer scan agrees with the recursive definition.
    #[test]
    fn matches_reference(
        needle in proptest::collection::vec(0u8..6, 0..8),
        hay in proptest::collection::vec(0u8..6, 0..16),
    ) {
        prop_assert_eq!(
            is_subsequence(&needle, &hay),
            is_subsequence_ref(&needle, &hay)
        );
    }

    /// Interleaving filler elements into a sequence never breaks containment.
    #[test]
    fn interleaved_needle_is_contained(
        needle in proptest::collection::vec(0u8..6, 1..8),
        gaps in proptest::collection::vec(proptest::collection::vec(10u8..20, 0..4), 1..9),
    ) {
        // Build hay = gap₀ n₀ gap₁ n₁ … with filler drawn from a disjoint
        // symbol range.
        let mut hay = Vec::new();
        for (i, n) in needle.iter().enumerate() {
            if let Some(g) = gaps.get(i) {
                hay.extend_from_slice(g);
            }
            hay.push(*n);
        }
        if let Some(g) = gaps.get(needle.len()) {
            hay.extend_from_slice(g);
        }

        prop_assert!(is_subsequence(&needle, &hay));
    }

    /// A sequence always contains itself and every prefix of itself.
    #[test]
    fn reflexive_and_prefix_closed(
        seq in proptest::collection::vec(0u8..6, 0..12),
        cut in 0usize..12,
    ) {
        prop_assert!(is_subsequence(&seq, &seq));
        let cut = cut.min(seq.len());
        prop_assert!(is_subsequence(&seq[..cut], &seq));
    }
}
