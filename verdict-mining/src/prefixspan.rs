//! PrefixSpan frequent-subsequence mining over interned symbol sequences.
//!
//! Projection-based: each recursion step counts the symbols occurring
//! after the current prefix in every projected sequence, extends the
//! prefix with each frequent symbol, and recurses on the new projection.
//! Support counts sequences, not occurrences.

use std::collections::HashMap;

/// A mined subsequence with its sequence-level support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequentSequence {
    pub items: Vec<u32>,
    pub support: usize,
}

/// PrefixSpan miner.
#[derive(Debug, Clone)]
pub struct PrefixSpan {
    pub min_support: usize,
    pub max_length: usize,
}

/// One entry in a projected database: (sequence index, next scan position).
type Projection = Vec<(usize, usize)>;

impl PrefixSpan {
    pub fn new(min_support: usize, max_length: usize) -> Self {
        Self {
            min_support: min_support.max(1),
            max_length: max_length.max(1),
        }
    }

    /// Mine all frequent subsequences of length 1..=max_length.
    pub fn mine(&self, db: &[Vec<u32>]) -> Vec<FrequentSequence> {
        let initial: Projection = db
            .iter()
            .enumerate()
            .filter(|(_, seq)| !seq.is_empty())
            .map(|(i, _)| (i, 0))
            .collect();

        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.grow(db, &initial, &mut prefix, &mut out);
        out
    }

    fn grow(
        &self,
        db: &[Vec<u32>],
        projection: &Projection,
        prefix: &mut Vec<u32>,
        out: &mut Vec<FrequentSequence>,
    ) {
        if prefix.len() >= self.max_length {
            return;
        }

        // Count each candidate symbol once per projected sequence.
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for &(seq_idx, pos) in projection {
            let mut seen: Vec<u32> = Vec::new();
            for &sym in &db[seq_idx][pos..] {
                if !seen.contains(&sym) {
                    seen.push(sym);
                    *counts.entry(sym).or_default() += 1;
                }
            }
        }

        // Deterministic extension order.
        let mut frequent: Vec<(u32, usize)> = counts
            .into_iter()
            .filter(|&(_, support)| support >= self.min_support)
            .collect();
        frequent.sort_by_key(|&(sym, _)| sym);

        for (sym, support) in frequent {
            // Project: advance each sequence past its first occurrence of `sym`.
            let projected: Projection = projection
                .iter()
                .filter_map(|&(seq_idx, pos)| {
                    db[seq_idx][pos..]
                        .iter()
                        .position(|&s| s == sym)
                        .map(|offset| (seq_idx, pos + offset + 1))
                })
                .collect();

            prefix.push(sym);
            out.push(FrequentSequence {
                items: prefix.clone(),
                support,
            });
            self.grow(db, &projected, prefix, out);
            prefix.pop();
        }
    }
}
