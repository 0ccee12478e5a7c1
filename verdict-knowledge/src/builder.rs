//! Checkpointed knowledge-base builder.
//!
//! Work is independent per pattern and runs on a rayon pool; each worker
//! enriches, embeds, and hands the finished rows to the single-writer
//! store, which commits them together with the checkpoint row. A restarted
//! build reads the checkpoint table and skips completed patterns, so every
//! pattern is enriched exactly once across restarts.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};
use verdict_core::config::KnowledgeConfig;
use verdict_core::errors::VerdictResult;
use verdict_core::models::{ActionSequence, CaseRecord, MinedPattern, Pattern};
use verdict_core::traits::{IEmbeddingProvider, ILlmProvider};

use crate::enrichment::{self, CaseAnnotations};
use crate::store::KnowledgeStore;

/// Summary of one build run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub patterns_processed: usize,
    pub patterns_skipped: usize,
    pub cases_written: usize,
    pub enrichment_fallbacks: usize,
}

/// Builds the persisted knowledge base from mined patterns and their
/// source sequences.
pub struct KnowledgeBuilder<'a> {
    store: &'a KnowledgeStore,
    llm: &'a dyn ILlmProvider,
    embedder: &'a dyn IEmbeddingProvider,
    config: KnowledgeConfig,
}

impl<'a> KnowledgeBuilder<'a> {
    pub fn new(
        store: &'a KnowledgeStore,
        llm: &'a dyn ILlmProvider,
        embedder: &'a dyn IEmbeddingProvider,
        config: KnowledgeConfig,
    ) -> Self {
        Self {
            store,
            llm,
            embedder,
            config,
        }
    }

    /// Run the build. `benign` and `malware` are the same corpora the
    /// miner saw; pattern coverage indices refer into them.
    ///
    /// Pattern IDs are positional in `mined`, so a resumed build over the
    /// same mining output maps onto the identical ID space.
    pub fn build(
        &self,
        mined: &[MinedPattern],
        benign: &[ActionSequence],
        malware: &[ActionSequence],
    ) -> VerdictResult<BuildReport> {
        let done = self.store.checkpointed_ids()?;
        let work: Vec<(i64, &MinedPattern)> = mined
            .iter()
            .enumerate()
            .map(|(i, m)| (i as i64, m))
            .filter(|(id, _)| !done.contains(id))
            .collect();
        let skipped = mined.len() - work.len();

        info!(
            total = mined.len(),
            pending = work.len(),
            skipped,
            "knowledge build starting"
        );

        let fallbacks = AtomicUsize::new(0);
        let cases_written = AtomicUsize::new(0);

        let run = || -> VerdictResult<()> {
            work.par_iter().try_for_each(|&(id, mp)| {
                let (pattern, cases, used_fallback) =
                    self.process_pattern(id, mp, benign, malware);
                if used_fallback {
                    fallbacks.fetch_add(1, Ordering::Relaxed);
                }
                cases_written.fetch_add(cases.len(), Ordering::Relaxed);
                self.store.commit_pattern(&pattern, &cases)
            })
        };

        if self.config.worker_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.worker_threads)
                .build()
                .map_err(|e| verdict_core::VerdictError::Config {
                    reason: e.to_string(),
                })?;
            pool.install(run)?;
        } else {
            run()?;
        }

        self.store.set_meta("embedding_model", self.embedder.name())?;
        self.store
            .set_meta("dimensions", &self.embedder.dimensions().to_string())?;
        self.store
            .set_meta("pattern_count", &self.store.pattern_count()?.to_string())?;
        self.store
            .set_meta("case_count", &self.store.case_count()?.to_string())?;
        self.store
            .set_meta("built_at", &chrono::Utc::now().to_rfc3339())?;

        let report = BuildReport {
            patterns_processed: work.len(),
            patterns_skipped: skipped,
            cases_written: cases_written.into_inner(),
            enrichment_fallbacks: fallbacks.into_inner(),
        };
        info!(
            processed = report.patterns_processed,
            skipped = report.patterns_skipped,
            cases = report.cases_written,
            fallbacks = report.enrichment_fallbacks,
            "knowledge build complete"
        );
        Ok(report)
    }

    /// Enrich and embed one pattern plus its owned cases. Provider
    /// failures degrade (minimal enrichment, zero vectors); they never
    /// abort the build.
    fn process_pattern(
        &self,
        id: i64,
        mined: &MinedPattern,
        benign: &[ActionSequence],
        malware: &[ActionSequence],
    ) -> (Pattern, Vec<CaseRecord>, bool) {
        let benign_snippets: Vec<&str> = mined
            .covered_benign
            .iter()
            .take(self.config.max_case_samples)
            .map(|&i| benign[i].code_context.as_str())
            .collect();
        let malware_snippets: Vec<&str> = mined
            .covered_malware
            .iter()
            .take(self.config.max_case_samples)
            .map(|&i| malware[i].code_context.as_str())
            .collect();

        let user_prompt =
            enrichment::pattern_user_prompt(mined, &benign_snippets, &malware_snippets);
        let (enriched, used_fallback) = match self
            .llm
            .complete(enrichment::PATTERN_SYSTEM_PROMPT, &user_prompt)
        {
            Ok(raw) => enrichment::parse_pattern_enrichment(&raw, &mined.subsequence),
            Err(e) => {
                warn!(pattern_id = id, error = %e, "enrichment call failed, using minimal summary");
                (
                    verdict_core::models::PatternEnrichment::minimal(&mined.subsequence),
                    true,
                )
            }
        };

        let embedding = self.embed_or_zero(&mined.subsequence.join(" "));

        let pattern = Pattern {
            id,
            subsequence: mined.subsequence.clone(),
            kind: mined.kind,
            support: mined.support,
            discovery_level: mined.discovery_level,
            coverage: mined.coverage.clone(),
            enrichment: enriched,
            embedding,
        };

        // Case IDs are positional too: benign index i → i, malware index
        // j → benign.len() + j. Stable across resumed builds.
        let mut cases = Vec::with_capacity(
            mined.covered_benign.len() + mined.covered_malware.len(),
        );
        for &i in &mined.covered_benign {
            cases.push(self.build_case(i as i64, id, &benign[i]));
        }
        for &j in &mined.covered_malware {
            cases.push(self.build_case((benign.len() + j) as i64, id, &malware[j]));
        }

        (pattern, cases, used_fallback)
    }

    fn build_case(&self, case_id: i64, pattern_id: i64, seq: &ActionSequence) -> CaseRecord {
        let sequence_embedding = self.embed_or_zero(&seq.joined());
        let context_embedding = self.embed_or_zero(&seq.code_context);

        let annotations = if self.config.enrich_cases {
            let prompt = enrichment::case_user_prompt(
                &seq.filename,
                seq.label.as_str(),
                &seq.actions,
                &seq.code_context,
            );
            match self.llm.complete(enrichment::CASE_SYSTEM_PROMPT, &prompt) {
                Ok(raw) => enrichment::parse_case_annotations(&raw),
                Err(e) => {
                    warn!(case_id, error = %e, "case summary call failed, leaving annotations empty");
                    CaseAnnotations::default()
                }
            }
        } else {
            CaseAnnotations::default()
        };

        CaseRecord {
            id: case_id,
            pattern_id,
            filename: seq.filename.clone(),
            label: seq.label,
            action_sequence: seq.actions.clone(),
            code_context: seq.code_context.clone(),
            sequence_embedding,
            context_embedding,
            case_summary: annotations.case_summary,
            key_behaviors: annotations.key_behaviors,
            risk_indicators: annotations.risk_indicators,
        }
    }

    fn embed_or_zero(&self, text: &str) -> Vec<f32> {
        match self.embedder.embed(text) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "embedding failed, storing zero vector");
                vec![0.0; self.embedder.dimensions()]
            }
        }
    }
}
