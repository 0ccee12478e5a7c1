//! Hierarchical coverage-greedy mining engine.
//!
//! Walks the configured support levels from highest to lowest, mines the
//! not-yet-covered remainder at each level, classifies candidates by their
//! benign/malware split, and greedily keeps patterns that claim new
//! sequences. Longer, more discriminative patterns are considered first so
//! shorter generic ones only mop up what is left.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use verdict_core::config::MiningConfig;
use verdict_core::errors::{MiningError, VerdictResult};
use verdict_core::models::{ActionSequence, MinedPattern, PatternCoverage, PatternKind};

use crate::coverage::{classify, conflicts_globally, covering_indices};
use crate::interner::Interner;
use crate::prefixspan::PrefixSpan;

/// A classified candidate awaiting greedy selection.
struct Candidate {
    items: Vec<u32>,
    support: usize,
    kind: PatternKind,
    coverage: PatternCoverage,
    covered_benign: Vec<usize>,
    covered_malware: Vec<usize>,
}

/// The mining engine. Stateless between runs; all knobs come from config.
pub struct MiningEngine {
    config: MiningConfig,
}

impl MiningEngine {
    pub fn new(config: MiningConfig) -> Self {
        Self { config }
    }

    /// Mine patterns from labeled corpora.
    ///
    /// `covered_benign` / `covered_malware` on each returned pattern hold
    /// the sequence indices (into the respective input slice) the pattern
    /// newly claimed; together they partition the covered corpus.
    pub fn mine(
        &self,
        benign: &[ActionSequence],
        malware: &[ActionSequence],
    ) -> VerdictResult<Vec<MinedPattern>> {
        let total = benign.len() + malware.len();
        if total == 0 {
            return Err(MiningError::EmptyCorpus.into());
        }

        let mut interner = Interner::new();
        let benign_syms: Vec<Vec<u32>> =
            benign.iter().map(|s| interner.intern_all(&s.actions)).collect();
        let malware_syms: Vec<Vec<u32>> =
            malware.iter().map(|s| interner.intern_all(&s.actions)).collect();

        // Highest support first; duplicates collapse.
        let mut levels = self.config.support_levels.clone();
        levels.sort_unstable_by(|a, b| b.cmp(a));
        levels.dedup();

        let mut covered_benign: HashSet<usize> = HashSet::new();
        let mut covered_malware: HashSet<usize> = HashSet::new();
        let mut accepted: Vec<MinedPattern> = Vec::new();
        let level_budget = Duration::from_secs(self.config.max_level_duration_secs);

        for level in levels {
            let covered_frac =
                (covered_benign.len() + covered_malware.len()) as f64 / total as f64;
            if covered_frac >= self.config.early_stop_coverage {
                info!(covered_frac, "early-stop coverage reached, ending mining");
                break;
            }

            let remaining_benign: Vec<usize> =
                (0..benign_syms.len()).filter(|i| !covered_benign.contains(i)).collect();
            let remaining_malware: Vec<usize> =
                (0..malware_syms.len()).filter(|i| !covered_malware.contains(i)).collect();
            if remaining_benign.is_empty() && remaining_malware.is_empty() {
                break;
            }

            let started = Instant::now();
            let candidates = self.mine_level(
                level,
                &benign_syms,
                &malware_syms,
                &remaining_benign,
                &remaining_malware,
            );

            if candidates.is_empty() {
                debug!(level, "no candidates at this support level");
                continue;
            }

            let (selected, timed_out) = self.select_greedy(
                candidates,
                level,
                &interner,
                &mut covered_benign,
                &mut covered_malware,
                started,
                level_budget,
            );

            info!(
                level,
                selected = selected.len(),
                covered_benign = covered_benign.len(),
                covered_malware = covered_malware.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "support level complete"
            );
            accepted.extend(selected);

            if timed_out {
                warn!(level, "level exceeded time budget, skipping lower support levels");
                break;
            }
        }

        info!(patterns = accepted.len(), "mining complete");
        Ok(accepted)
    }

    /// Mine one support level over the uncovered remainder and classify
    /// the results. Per-level problems are non-fatal: they log and yield
    /// zero candidates.
    fn mine_level(
        &self,
        level: usize,
        benign_syms: &[Vec<u32>],
        malware_syms: &[Vec<u32>],
        remaining_benign: &[usize],
        remaining_malware: &[usize],
    ) -> Vec<Candidate> {
        let db: Vec<Vec<u32>> = remaining_benign
            .iter()
            .map(|&i| benign_syms[i].clone())
            .chain(remaining_malware.iter().map(|&i| malware_syms[i].clone()))
            .collect();

        let miner = PrefixSpan::new(level, self.config.max_pattern_length);
        let mined = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            miner.mine(&db)
        })) {
            Ok(m) => m,
            Err(_) => {
                warn!(level, "miner panicked on malformed input, treating as empty level");
                return Vec::new();
            }
        };

        // Dedup by subsequence, keeping the maximum observed support.
        let mut best: std::collections::HashMap<Vec<u32>, usize> = std::collections::HashMap::new();
        for f in mined {
            if f.items.len() < self.config.min_pattern_length {
                continue;
            }
            let entry = best.entry(f.items).or_insert(0);
            *entry = (*entry).max(f.support);
        }

        debug!(level, unique = best.len(), "deduplicated frequent subsequences");

        let threshold = self.config.distinction_threshold;
        best.into_par_iter()
            .filter_map(|(items, support)| {
                let covered_b = covering_indices(&items, benign_syms, remaining_benign);
                let covered_m = covering_indices(&items, malware_syms, remaining_malware);
                let coverage = PatternCoverage::new(covered_b.len(), covered_m.len());
                let kind = classify(&coverage, threshold)?;
                if conflicts_globally(&items, kind, benign_syms, malware_syms, threshold) {
                    return None;
                }
                Some(Candidate {
                    items,
                    support,
                    kind,
                    coverage,
                    covered_benign: covered_b,
                    covered_malware: covered_m,
                })
            })
            .collect()
    }

    /// Greedy selection for one round: order by
    /// `(-length, -max_ratio, -support)` and accept only candidates that
    /// claim at least one sequence no earlier pattern claimed.
    #[allow(clippy::too_many_arguments)]
    fn select_greedy(
        &self,
        mut candidates: Vec<Candidate>,
        level: usize,
        interner: &Interner,
        covered_benign: &mut HashSet<usize>,
        covered_malware: &mut HashSet<usize>,
        started: Instant,
        budget: Duration,
    ) -> (Vec<MinedPattern>, bool) {
        candidates.sort_by(|a, b| {
            b.items
                .len()
                .cmp(&a.items.len())
                .then_with(|| {
                    b.coverage
                        .max_ratio()
                        .partial_cmp(&a.coverage.max_ratio())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| b.support.cmp(&a.support))
        });

        let mut round_benign: HashSet<usize> = HashSet::new();
        let mut round_malware: HashSet<usize> = HashSet::new();
        let mut selected = Vec::new();
        let mut timed_out = false;

        for cand in candidates {
            if started.elapsed() > budget {
                timed_out = true;
                break;
            }

            let new_benign: Vec<usize> = cand
                .covered_benign
                .iter()
                .copied()
                .filter(|i| !round_benign.contains(i))
                .collect();
            let new_malware: Vec<usize> = cand
                .covered_malware
                .iter()
                .copied()
                .filter(|i| !round_malware.contains(i))
                .collect();
            if new_benign.is_empty() && new_malware.is_empty() {
                continue;
            }

            round_benign.extend(&new_benign);
            round_malware.extend(&new_malware);

            selected.push(MinedPattern {
                subsequence: interner.resolve_all(&cand.items),
                kind: cand.kind,
                support: cand.support,
                discovery_level: level,
                coverage: cand.coverage,
                covered_benign: new_benign,
                covered_malware: new_malware,
            });
        }

        // Merge the round into the global coverage sets; coverage only grows.
        covered_benign.extend(round_benign);
        covered_malware.extend(round_malware);

        (selected, timed_out)
    }
}
