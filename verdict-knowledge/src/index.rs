//! In-memory serving view of the knowledge base.
//!
//! `PatternIndex` maps exact subsequences to pattern IDs and patterns to
//! their owned case IDs; `KnowledgeBase` bundles the index with the loaded
//! records and the flat vector indexes.

use std::collections::HashMap;

use tracing::info;
use verdict_core::models::{CaseLabel, CaseRecord, Pattern};
use verdict_core::VerdictResult;

use crate::store::KnowledgeStore;
use crate::vector::FlatVectorIndex;

/// Case IDs a pattern owns, split by label.
#[derive(Debug, Clone, Default)]
pub struct CaseIdSplit {
    pub benign: Vec<i64>,
    pub malware: Vec<i64>,
}

impl CaseIdSplit {
    pub fn all(&self) -> impl Iterator<Item = i64> + '_ {
        self.benign.iter().chain(self.malware.iter()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.benign.is_empty() && self.malware.is_empty()
    }
}

/// Exact-subsequence lookup plus pattern→cases ownership.
///
/// The same subsequence can be mined at several support levels, so a key
/// maps to a list of pattern IDs.
#[derive(Debug, Default)]
pub struct PatternIndex {
    by_subsequence: HashMap<Vec<String>, Vec<i64>>,
    cases_by_pattern: HashMap<i64, CaseIdSplit>,
}

impl PatternIndex {
    pub fn build(patterns: &[Pattern], cases: &[CaseRecord]) -> Self {
        let mut by_subsequence: HashMap<Vec<String>, Vec<i64>> = HashMap::new();
        for p in patterns {
            by_subsequence
                .entry(p.subsequence.clone())
                .or_default()
                .push(p.id);
        }

        let mut cases_by_pattern: HashMap<i64, CaseIdSplit> = HashMap::new();
        for c in cases {
            let split = cases_by_pattern.entry(c.pattern_id).or_default();
            match c.label {
                CaseLabel::Benign => split.benign.push(c.id),
                CaseLabel::Malware => split.malware.push(c.id),
            }
        }

        Self {
            by_subsequence,
            cases_by_pattern,
        }
    }

    /// Iterate all indexed subsequence keys with their pattern IDs.
    pub fn entries(&self) -> impl Iterator<Item = (&Vec<String>, &Vec<i64>)> {
        self.by_subsequence.iter()
    }

    pub fn pattern_ids_for(&self, subsequence: &[String]) -> Option<&Vec<i64>> {
        self.by_subsequence.get(subsequence)
    }

    pub fn cases_for(&self, pattern_id: i64) -> Option<&CaseIdSplit> {
        self.cases_by_pattern.get(&pattern_id)
    }

    pub fn is_empty(&self) -> bool {
        self.by_subsequence.is_empty()
    }
}

/// Everything the query path needs, loaded read-only from the store.
#[derive(Debug)]
pub struct KnowledgeBase {
    pub patterns: HashMap<i64, Pattern>,
    pub cases: HashMap<i64, CaseRecord>,
    pub index: PatternIndex,
    /// Pattern subsequence embeddings.
    pub pattern_vectors: FlatVectorIndex,
    /// Case code-context embeddings.
    pub case_context_vectors: FlatVectorIndex,
}

impl KnowledgeBase {
    /// Load the full knowledge base into memory.
    pub fn load(store: &KnowledgeStore) -> VerdictResult<Self> {
        let patterns = store.load_patterns()?;
        let cases = store.load_cases()?;
        let index = PatternIndex::build(&patterns, &cases);

        let mut pattern_vectors = FlatVectorIndex::new();
        for p in &patterns {
            pattern_vectors.insert(p.id, &p.embedding);
        }
        let mut case_context_vectors = FlatVectorIndex::new();
        for c in &cases {
            case_context_vectors.insert(c.id, &c.context_embedding);
        }

        info!(
            patterns = patterns.len(),
            cases = cases.len(),
            "knowledge base loaded"
        );

        Ok(Self {
            patterns: patterns.into_iter().map(|p| (p.id, p)).collect(),
            cases: cases.into_iter().map(|c| (c.id, c)).collect(),
            index,
            pattern_vectors,
            case_context_vectors,
        })
    }
}
