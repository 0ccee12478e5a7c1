//! The detection engine.

use tracing::{debug, info, warn};
use verdict_core::config::{DetectionConfig, DetectionStrategy, RetrievalConfig};
use verdict_core::constants::{CONFLICTING_MATCH_CONFIDENCE, DETERMINISTIC_CONFIDENCE};
use verdict_core::models::{
    DetectionOutput, MatchCategory, Pattern, PatternKind, PatternMatch, SimilarCase,
};
use verdict_core::traits::{IEmbeddingProvider, ILlmProvider};
use verdict_core::VerdictResult;
use verdict_knowledge::index::KnowledgeBase;
use verdict_retrieval::RetrievalEngine;

use crate::category::classify_matches;
use crate::prompts::{detection_user_prompt, parse_verdict, DETECTION_SYSTEM_PROMPT};
use crate::risk;

/// Two-strategy detection over a loaded knowledge base.
pub struct DetectionEngine<'a> {
    kb: &'a KnowledgeBase,
    retrieval: RetrievalEngine<'a>,
    llm: &'a dyn ILlmProvider,
    config: DetectionConfig,
}

impl<'a> DetectionEngine<'a> {
    pub fn new(
        kb: &'a KnowledgeBase,
        embedder: &'a dyn IEmbeddingProvider,
        llm: &'a dyn ILlmProvider,
        config: DetectionConfig,
        retrieval_config: RetrievalConfig,
    ) -> Self {
        Self {
            kb,
            retrieval: RetrievalEngine::new(kb, embedder, retrieval_config),
            llm,
            config,
        }
    }

    /// Analyze one package sample and return a structured verdict.
    ///
    /// Never returns an error: retrieval and LLM failures collapse into
    /// an output with `detection_method == "error"` and the cause in
    /// `llm_reasoning`.
    pub fn detect(&self, actions: &[String], code_context: &str) -> DetectionOutput {
        let result = match self.config.strategy {
            DetectionStrategy::PureRag => self.pure_rag(actions, code_context),
            DetectionStrategy::PatternRag => self.pattern_rag(actions, code_context),
        };
        match result {
            Ok(output) => {
                info!(
                    method = %output.detection_method,
                    malicious = output.is_malicious,
                    confidence = output.confidence,
                    "detection complete"
                );
                output
            }
            Err(e) => {
                warn!(error = %e, "detection failed");
                DetectionOutput::error(e.to_string())
            }
        }
    }

    fn pattern_rag(&self, actions: &[String], code_context: &str) -> VerdictResult<DetectionOutput> {
        let matches = self.retrieval.find_matching_patterns(actions);
        let matched: Vec<&Pattern> = matches
            .iter()
            .filter_map(|m| self.kb.patterns.get(&m.pattern_id))
            .collect();
        let kinds: Vec<PatternKind> = matched.iter().map(|p| p.kind).collect();
        let category = classify_matches(&kinds);
        debug!(matches = matches.len(), ?category, "match set classified");

        match category {
            MatchCategory::DeterministicMalware => Ok(self.deterministic(
                matches,
                &matched,
                true,
                DETERMINISTIC_CONFIDENCE,
                "Matched action patterns observed exclusively in malware.",
                "Quarantine the package and review the matched behaviors manually.",
            )),
            MatchCategory::DeterministicBoth => Ok(self.deterministic(
                matches,
                &matched,
                true,
                CONFLICTING_MATCH_CONFIDENCE,
                "Matched both malware-only and benign-only patterns; treating the malware evidence as decisive.",
                "Quarantine the package and review the conflicting matches manually.",
            )),
            MatchCategory::DeterministicBenign => Ok(self.deterministic(
                matches,
                &matched,
                false,
                DETERMINISTIC_CONFIDENCE,
                "Matched action patterns observed exclusively in benign packages.",
                "No action required.",
            )),
            MatchCategory::JustificationOnly | MatchCategory::NoMatch => {
                self.llm_analysis(actions, code_context, matches, "pattern_rag")
            }
        }
    }

    fn pure_rag(&self, actions: &[String], code_context: &str) -> VerdictResult<DetectionOutput> {
        self.llm_analysis(actions, code_context, Vec::new(), "pure_rag")
    }

    /// A verdict settled by pure pattern matches alone. No retrieval, no
    /// LLM call.
    fn deterministic(
        &self,
        matches: Vec<PatternMatch>,
        matched: &[&Pattern],
        is_malicious: bool,
        confidence: f64,
        explanation: &str,
        recommendation: &str,
    ) -> DetectionOutput {
        let keyword_hit = risk::matched_patterns_mention_keyword(matched.iter().copied());
        let summaries: Vec<String> = matched
            .iter()
            .filter(|p| p.kind.is_pure())
            .map(|p| p.subsequence.join(" -> "))
            .collect();

        DetectionOutput {
            is_malicious,
            confidence,
            risk_level: risk::risk_level(&self.config, is_malicious, confidence, keyword_hit),
            detection_method: "pattern_match".to_string(),
            matched_patterns: matches,
            top_similar_cases: Vec::new(),
            explanation: format!("{explanation} Patterns: {}.", summaries.join("; ")),
            recommendation: recommendation.to_string(),
            llm_reasoning: String::new(),
        }
    }

    /// Retrieval plus a single LLM call. Shared by pure-RAG and the
    /// ambiguous pattern-RAG branches; index matches seed the prompt with
    /// their annotations when present.
    fn llm_analysis(
        &self,
        actions: &[String],
        code_context: &str,
        matches: Vec<PatternMatch>,
        method: &str,
    ) -> VerdictResult<DetectionOutput> {
        let seed: Vec<&Pattern> = matches
            .iter()
            .filter_map(|m| self.kb.patterns.get(&m.pattern_id))
            .collect();

        let similar_patterns = self.retrieval.similar_patterns(actions)?;
        let cases = self.retrieve_evidence_cases(actions, code_context, &matches)?;

        let prompt =
            detection_user_prompt(actions, code_context, &seed, &similar_patterns, &cases);
        let raw = self.llm.complete(DETECTION_SYSTEM_PROMPT, &prompt)?;
        let Some(verdict) = parse_verdict(&raw) else {
            warn!(response_len = raw.len(), "llm verdict did not parse");
            return Ok(DetectionOutput::error(format!(
                "unparseable llm verdict: {raw}"
            )));
        };

        let pattern_sims: Vec<f64> = similar_patterns.iter().map(|p| p.similarity).collect();
        let case_sims: Vec<f64> = cases.iter().map(|c| c.similarity).collect();
        let consistency = risk::label_consistency(&cases, verdict.is_malicious);
        let confidence = risk::confidence(
            &self.config,
            risk::average_similarity(&pattern_sims),
            risk::average_similarity(&case_sims),
            consistency,
        );

        let keyword_hit = risk::mentions_high_risk_keyword(&similar_patterns, &cases)
            || risk::matched_patterns_mention_keyword(seed.iter().copied());

        Ok(DetectionOutput {
            is_malicious: verdict.is_malicious,
            confidence,
            risk_level: risk::risk_level(
                &self.config,
                verdict.is_malicious,
                confidence,
                keyword_hit,
            ),
            detection_method: method.to_string(),
            matched_patterns: matches,
            top_similar_cases: cases,
            explanation: verdict.explanation,
            recommendation: verdict.recommendation,
            llm_reasoning: verdict.reasoning,
        })
    }

    /// Cases grounding the LLM prompt: the best-matched pattern's own case
    /// pool when available, otherwise a corpus-wide context search.
    fn retrieve_evidence_cases(
        &self,
        actions: &[String],
        code_context: &str,
        matches: &[PatternMatch],
    ) -> VerdictResult<Vec<SimilarCase>> {
        if let Some(best) = matches.first() {
            let cases = self
                .retrieval
                .retrieve_cases(actions, code_context, best.pattern_id)?;
            if !cases.is_empty() {
                return Ok(cases);
            }
        }
        self.retrieval.similar_cases(code_context)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use verdict_core::errors::ProviderError;
    use verdict_core::models::{
        CaseLabel, CaseRecord, PatternCoverage, PatternEnrichment, RiskLevel,
    };
    use verdict_knowledge::index::PatternIndex;
    use verdict_knowledge::vector::FlatVectorIndex;

    struct CountingLlm {
        calls: AtomicUsize,
        response: Option<String>,
    }

    impl CountingLlm {
        fn returning(response: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Some(response.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ILlmProvider for CountingLlm {
        fn complete(&self, _system: &str, _user: &str) -> VerdictResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Some(r) => Ok(r.clone()),
                None => Err(ProviderError::Unavailable {
                    provider: "mock".to_string(),
                }
                .into()),
            }
        }

        fn name(&self) -> &str {
            "counting-mock"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    struct FixedEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl FixedEmbedder {
        fn empty() -> Self {
            Self {
                vectors: HashMap::new(),
            }
        }
    }

    impl IEmbeddingProvider for FixedEmbedder {
        fn embed(&self, text: &str) -> VerdictResult<Vec<f32>> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![1.0, 0.0]))
        }

        fn embed_batch(&self, texts: &[String]) -> VerdictResult<Vec<Vec<f32>>> {
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn pattern(id: i64, subseq: &[&str], kind: PatternKind) -> Pattern {
        Pattern {
            id,
            subsequence: strings(subseq),
            kind,
            support: 3,
            discovery_level: 1,
            coverage: match kind.biased_label() {
                CaseLabel::Benign => PatternCoverage::new(3, 0),
                CaseLabel::Malware => PatternCoverage::new(0, 3),
            },
            enrichment: PatternEnrichment {
                semantic_summary: "reads env and posts it".to_string(),
                security_assessment: "possible exfiltration".to_string(),
                ..Default::default()
            },
            embedding: vec![1.0, 0.0],
        }
    }

    fn case(id: i64, pattern_id: i64, label: CaseLabel) -> CaseRecord {
        CaseRecord {
            id,
            pattern_id,
            filename: format!("pkg_{id}.py"),
            label,
            action_sequence: strings(&["a", "b"]),
            code_context: "code".to_string(),
            sequence_embedding: vec![1.0, 0.0],
            context_embedding: vec![1.0, 0.0],
            case_summary: "does things".to_string(),
            key_behaviors: vec![],
            risk_indicators: vec![],
        }
    }

    fn knowledge_base(patterns: Vec<Pattern>, cases: Vec<CaseRecord>) -> KnowledgeBase {
        let index = PatternIndex::build(&patterns, &cases);
        let mut pattern_vectors = FlatVectorIndex::new();
        for p in &patterns {
            pattern_vectors.insert(p.id, &p.embedding);
        }
        let mut case_context_vectors = FlatVectorIndex::new();
        for c in &cases {
            case_context_vectors.insert(c.id, &c.context_embedding);
        }
        KnowledgeBase {
            patterns: patterns.into_iter().map(|p| (p.id, p)).collect(),
            cases: cases.into_iter().map(|c| (c.id, c)).collect(),
            index,
            pattern_vectors,
            case_context_vectors,
        }
    }

    fn make_engine<'a>(
        kb: &'a KnowledgeBase,
        embedder: &'a FixedEmbedder,
        llm: &'a CountingLlm,
        strategy: DetectionStrategy,
    ) -> DetectionEngine<'a> {
        DetectionEngine::new(
            kb,
            embedder,
            llm,
            DetectionConfig {
                strategy,
                ..Default::default()
            },
            RetrievalConfig::default(),
        )
    }

    const MALICIOUS_VERDICT: &str = r#"{
        "is_malicious": true,
        "explanation": "exfiltrates environment variables",
        "reasoning": "sequence matches known exfiltration flow",
        "recommendation": "remove the package"
    }"#;

    #[test]
    fn pure_malware_match_short_circuits_without_llm() {
        let kb = knowledge_base(
            vec![pattern(1, &["read_env", "http_post"], PatternKind::PureMalwareOnly)],
            vec![case(1, 1, CaseLabel::Malware)],
        );
        let embedder = FixedEmbedder::empty();
        let llm = CountingLlm::returning(MALICIOUS_VERDICT);
        let engine = make_engine(&kb, &embedder, &llm, DetectionStrategy::PatternRag);

        let out = engine.detect(&strings(&["read_env", "http_post"]), "code");
        assert!(out.is_malicious);
        assert_eq!(out.confidence, 0.95);
        assert_eq!(out.detection_method, "pattern_match");
        assert_eq!(out.risk_level, RiskLevel::High);
        assert_eq!(out.matched_patterns.len(), 1);
        assert_eq!(llm.calls(), 0);
    }

    #[test]
    fn pure_benign_match_short_circuits_benign() {
        let kb = knowledge_base(
            vec![pattern(1, &["open_file", "read_file"], PatternKind::PureBenignOnly)],
            vec![],
        );
        let embedder = FixedEmbedder::empty();
        let llm = CountingLlm::returning(MALICIOUS_VERDICT);
        let engine = make_engine(&kb, &embedder, &llm, DetectionStrategy::PatternRag);

        let out = engine.detect(&strings(&["open_file", "read_file"]), "code");
        assert!(!out.is_malicious);
        assert_eq!(out.confidence, 0.95);
        assert_eq!(out.risk_level, RiskLevel::Benign);
        assert_eq!(llm.calls(), 0);
    }

    #[test]
    fn conflicting_pure_matches_resolve_malicious() {
        let kb = knowledge_base(
            vec![
                pattern(1, &["a", "b"], PatternKind::PureMalwareOnly),
                pattern(2, &["a", "b", "c"], PatternKind::PureBenignOnly),
            ],
            vec![],
        );
        let embedder = FixedEmbedder::empty();
        let llm = CountingLlm::returning(MALICIOUS_VERDICT);
        let engine = make_engine(&kb, &embedder, &llm, DetectionStrategy::PatternRag);

        let out = engine.detect(&strings(&["a", "b", "c"]), "code");
        assert!(out.is_malicious);
        assert_eq!(out.confidence, 0.9);
        assert_eq!(out.detection_method, "pattern_match");
        assert_eq!(llm.calls(), 0);
    }

    #[test]
    fn biased_match_escalates_to_one_llm_call() {
        let kb = knowledge_base(
            vec![pattern(1, &["a", "b"], PatternKind::DistinctionMalwareBiased)],
            vec![case(1, 1, CaseLabel::Malware), case(2, 1, CaseLabel::Malware)],
        );
        let embedder = FixedEmbedder::empty();
        let llm = CountingLlm::returning(MALICIOUS_VERDICT);
        let engine = make_engine(&kb, &embedder, &llm, DetectionStrategy::PatternRag);

        let out = engine.detect(&strings(&["a", "b"]), "code");
        assert!(out.is_malicious);
        assert_eq!(out.detection_method, "pattern_rag");
        assert_eq!(llm.calls(), 1);
        assert!(!out.top_similar_cases.is_empty());
        assert_eq!(out.explanation, "exfiltrates environment variables");
        assert_eq!(out.llm_reasoning, "sequence matches known exfiltration flow");
        // All retrieved cases are malware and agree with the verdict.
        assert!(out.confidence > 0.4);
    }

    #[test]
    fn no_match_falls_back_to_rag_analysis() {
        let kb = knowledge_base(
            vec![pattern(1, &["x", "y"], PatternKind::DistinctionBenignBiased)],
            vec![case(1, 1, CaseLabel::Benign)],
        );
        let embedder = FixedEmbedder::empty();
        let llm = CountingLlm::returning(MALICIOUS_VERDICT);
        let engine = make_engine(&kb, &embedder, &llm, DetectionStrategy::PatternRag);

        let out = engine.detect(&strings(&["p", "q"]), "code");
        assert_eq!(out.detection_method, "pattern_rag");
        assert!(out.matched_patterns.is_empty());
        assert_eq!(llm.calls(), 1);
    }

    #[test]
    fn pure_rag_always_calls_llm_once() {
        let kb = knowledge_base(
            vec![pattern(1, &["a", "b"], PatternKind::PureMalwareOnly)],
            vec![case(1, 1, CaseLabel::Malware)],
        );
        let embedder = FixedEmbedder::empty();
        let llm = CountingLlm::returning(MALICIOUS_VERDICT);
        let engine = make_engine(&kb, &embedder, &llm, DetectionStrategy::PureRag);

        // Exact match exists, but pure-RAG ignores the index entirely.
        let out = engine.detect(&strings(&["a", "b"]), "code");
        assert_eq!(out.detection_method, "pure_rag");
        assert!(out.matched_patterns.is_empty());
        assert_eq!(llm.calls(), 1);
    }

    #[test]
    fn llm_failure_becomes_error_output() {
        let kb = knowledge_base(vec![], vec![]);
        let embedder = FixedEmbedder::empty();
        let llm = CountingLlm::failing();
        let engine = make_engine(&kb, &embedder, &llm, DetectionStrategy::PureRag);

        let out = engine.detect(&strings(&["a"]), "code");
        assert!(!out.is_malicious);
        assert_eq!(out.confidence, 0.0);
        assert_eq!(out.detection_method, "error");
        assert!(out.llm_reasoning.contains("unavailable"));
    }

    #[test]
    fn unparseable_verdict_becomes_error_output() {
        let kb = knowledge_base(vec![], vec![]);
        let embedder = FixedEmbedder::empty();
        let llm = CountingLlm::returning("I cannot answer in JSON.");
        let engine = make_engine(&kb, &embedder, &llm, DetectionStrategy::PureRag);

        let out = engine.detect(&strings(&["a"]), "code");
        assert_eq!(out.detection_method, "error");
        assert!(out.llm_reasoning.contains("unparseable"));
    }
}
