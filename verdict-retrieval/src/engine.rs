//! Query-time retrieval over a loaded knowledge base.

use std::path::Path;

use tracing::debug;
use verdict_core::config::RetrievalConfig;
use verdict_core::errors::RetrievalError;
use verdict_core::models::{PatternMatch, SimilarCase, SimilarPattern};
use verdict_core::traits::IEmbeddingProvider;
use verdict_core::VerdictResult;
use verdict_knowledge::index::KnowledgeBase;
use verdict_knowledge::store::KnowledgeStore;
use verdict_knowledge::vector::cosine_similarity;

use crate::matching::find_matches;

/// Open the store at `path` and load the full knowledge base.
///
/// Fails fast with `KnowledgeBaseMissing` when no database file exists, so
/// a misconfigured path surfaces before the first query instead of as an
/// empty result set.
pub fn load_knowledge_base(path: &Path) -> VerdictResult<KnowledgeBase> {
    if !path.exists() {
        return Err(RetrievalError::KnowledgeBaseMissing {
            path: path.display().to_string(),
        }
        .into());
    }
    let store = KnowledgeStore::open(path)?;
    KnowledgeBase::load(&store)
}

/// Retrieval engine: pattern matching plus embedding-similarity search.
pub struct RetrievalEngine<'a> {
    kb: &'a KnowledgeBase,
    embedder: &'a dyn IEmbeddingProvider,
    config: RetrievalConfig,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(
        kb: &'a KnowledgeBase,
        embedder: &'a dyn IEmbeddingProvider,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            kb,
            embedder,
            config,
        }
    }

    /// Match the query action sequence against the pattern index.
    pub fn find_matching_patterns(&self, actions: &[String]) -> Vec<PatternMatch> {
        let matches = find_matches(&self.kb.index, actions);
        debug!(
            query_len = actions.len(),
            matches = matches.len(),
            "pattern index matched"
        );
        matches
    }

    /// Retrieve the top-k cases owned by `pattern_id`, ranked by the
    /// combined similarity `sequence_weight * cos(seq) + context_weight *
    /// cos(ctx)`.
    ///
    /// A pattern with no committed cases yields an empty vector, not an
    /// error.
    pub fn retrieve_cases(
        &self,
        actions: &[String],
        code_context: &str,
        pattern_id: i64,
    ) -> VerdictResult<Vec<SimilarCase>> {
        let Some(split) = self.kb.index.cases_for(pattern_id) else {
            return Ok(Vec::new());
        };

        let seq_query = self.embedder.embed(&actions.join(" "))?;
        let ctx_query = self.embedder.embed(code_context)?;

        let mut scored: Vec<SimilarCase> = split
            .all()
            .filter_map(|case_id| self.kb.cases.get(&case_id))
            .map(|case| {
                let seq_sim = cosine_similarity(&seq_query, &case.sequence_embedding);
                let ctx_sim = cosine_similarity(&ctx_query, &case.context_embedding);
                let similarity = self.config.sequence_weight * seq_sim
                    + self.config.context_weight * ctx_sim;
                SimilarCase {
                    case_id: case.id,
                    pattern_id: case.pattern_id,
                    label: case.label,
                    filename: case.filename.clone(),
                    similarity,
                    case_summary: case.case_summary.clone(),
                    risk_indicators: case.risk_indicators.clone(),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.case_id.cmp(&b.case_id))
        });
        scored.truncate(self.config.top_k);
        Ok(scored)
    }

    /// Top-k patterns by sequence-embedding similarity, for queries that
    /// matched nothing in the index.
    pub fn similar_patterns(&self, actions: &[String]) -> VerdictResult<Vec<SimilarPattern>> {
        if self.kb.pattern_vectors.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed(&actions.join(" "))?;
        let hits = self.kb.pattern_vectors.search(&query, self.config.top_k);

        Ok(hits
            .into_iter()
            .filter_map(|(pattern_id, similarity)| {
                self.kb.patterns.get(&pattern_id).map(|p| SimilarPattern {
                    pattern_id,
                    similarity,
                    kind: p.kind,
                    semantic_summary: p.enrichment.semantic_summary.clone(),
                    security_assessment: p.enrichment.security_assessment.clone(),
                })
            })
            .collect())
    }

    /// Top-k cases across the whole corpus by code-context similarity.
    pub fn similar_cases(&self, code_context: &str) -> VerdictResult<Vec<SimilarCase>> {
        if self.kb.case_context_vectors.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed(code_context)?;
        let hits = self
            .kb
            .case_context_vectors
            .search(&query, self.config.top_k);

        Ok(hits
            .into_iter()
            .filter_map(|(case_id, similarity)| {
                self.kb.cases.get(&case_id).map(|case| SimilarCase {
                    case_id,
                    pattern_id: case.pattern_id,
                    label: case.label,
                    filename: case.filename.clone(),
                    similarity,
                    case_summary: case.case_summary.clone(),
                    risk_indicators: case.risk_indicators.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use verdict_core::models::{
        CaseLabel, CaseRecord, Pattern, PatternCoverage, PatternEnrichment, PatternKind,
    };
    use verdict_knowledge::index::PatternIndex;
    use verdict_knowledge::vector::FlatVectorIndex;

    /// Embedder returning canned vectors per exact input text.
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl StubEmbedder {
        fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            }
        }
    }

    impl IEmbeddingProvider for StubEmbedder {
        fn embed(&self, text: &str) -> VerdictResult<Vec<f32>> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0; 4]))
        }

        fn embed_batch(&self, texts: &[String]) -> VerdictResult<Vec<Vec<f32>>> {
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn dimensions(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Unit vector at a given cosine to e_axis, using e_axis+1 for the
    /// orthogonal component.
    fn vector_at_cosine(axis: usize, cos: f32) -> Vec<f32> {
        let mut v = vec![0.0f32; 4];
        v[axis] = cos;
        v[axis + 1] = (1.0 - cos * cos).sqrt();
        v
    }

    fn case(
        id: i64,
        pattern_id: i64,
        label: CaseLabel,
        seq_emb: Vec<f32>,
        ctx_emb: Vec<f32>,
    ) -> CaseRecord {
        CaseRecord {
            id,
            pattern_id,
            filename: format!("pkg_{id}.py"),
            label,
            action_sequence: strings(&["a", "b"]),
            code_context: String::new(),
            sequence_embedding: seq_emb,
            context_embedding: ctx_emb,
            case_summary: format!("case {id}"),
            key_behaviors: vec![],
            risk_indicators: vec![],
        }
    }

    fn pattern(id: i64, subseq: &[&str], kind: PatternKind) -> Pattern {
        Pattern {
            id,
            subsequence: strings(subseq),
            kind,
            support: 3,
            discovery_level: 1,
            coverage: PatternCoverage::new(0, 3),
            enrichment: PatternEnrichment {
                semantic_summary: format!("pattern {id}"),
                security_assessment: "assessment".to_string(),
                ..Default::default()
            },
            embedding: vec![1.0, 0.0, 0.0, 0.0],
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

    #[test]
    fn combined_score_ranks_cases() {
        // Query sequence embeds to e0, query context to e2. Case cosines:
        //   case 1: seq 0.2, ctx 0.9 -> 0.4*0.2 + 0.6*0.9 = 0.62
        //   case 2: seq 0.9, ctx 0.5 -> 0.4*0.9 + 0.6*0.5 = 0.66
        //   case 3: seq 0.3, ctx 0.1 -> 0.4*0.3 + 0.6*0.1 = 0.18
        let cases = vec![
            case(
                1,
                7,
                CaseLabel::Malware,
                vector_at_cosine(0, 0.2),
                vector_at_cosine(2, 0.9),
            ),
            case(
                2,
                7,
                CaseLabel::Malware,
                vector_at_cosine(0, 0.9),
                vector_at_cosine(2, 0.5),
            ),
            case(
                3,
                7,
                CaseLabel::Benign,
                vector_at_cosine(0, 0.3),
                vector_at_cosine(2, 0.1),
            ),
        ];
        let kb = knowledge_base(vec![pattern(7, &["a", "b"], PatternKind::PureMalwareOnly)], cases);
        let embedder = StubEmbedder::new(&[
            ("a b", vec![1.0, 0.0, 0.0, 0.0]),
            ("ctx", vec![0.0, 0.0, 1.0, 0.0]),
        ]);
        let engine = RetrievalEngine::new(&kb, &embedder, RetrievalConfig::default());

        let hits = engine
            .retrieve_cases(&strings(&["a", "b"]), "ctx", 7)
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].case_id, 2);
        assert_eq!(hits[1].case_id, 1);
        assert_eq!(hits[2].case_id, 3);
        assert!((hits[0].similarity - 0.66).abs() < 1e-6);
        assert!((hits[1].similarity - 0.62).abs() < 1e-6);
        assert!((hits[2].similarity - 0.18).abs() < 1e-6);
    }

    #[test]
    fn top_k_truncates_case_results() {
        let cases: Vec<CaseRecord> = (1..=8)
            .map(|i| {
                case(
                    i,
                    7,
                    CaseLabel::Malware,
                    vector_at_cosine(0, 0.1 * i as f32),
                    vector_at_cosine(2, 0.1 * i as f32),
                )
            })
            .collect();
        let kb = knowledge_base(vec![pattern(7, &["a", "b"], PatternKind::PureMalwareOnly)], cases);
        let embedder = StubEmbedder::new(&[
            ("a b", vec![1.0, 0.0, 0.0, 0.0]),
            ("ctx", vec![0.0, 0.0, 1.0, 0.0]),
        ]);
        let config = RetrievalConfig {
            top_k: 3,
            ..Default::default()
        };
        let engine = RetrievalEngine::new(&kb, &embedder, config);

        let hits = engine
            .retrieve_cases(&strings(&["a", "b"]), "ctx", 7)
            .unwrap();
        assert_eq!(hits.len(), 3);
        // Highest cosines first.
        assert_eq!(hits[0].case_id, 8);
        assert_eq!(hits[1].case_id, 7);
        assert_eq!(hits[2].case_id, 6);
    }

    #[test]
    fn unknown_pattern_retrieves_no_cases() {
        let kb = knowledge_base(
            vec![pattern(7, &["a", "b"], PatternKind::PureMalwareOnly)],
            vec![],
        );
        let embedder = StubEmbedder::new(&[]);
        let engine = RetrievalEngine::new(&kb, &embedder, RetrievalConfig::default());

        let hits = engine
            .retrieve_cases(&strings(&["a", "b"]), "ctx", 99)
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn exact_match_found_through_engine() {
        let kb = knowledge_base(
            vec![pattern(1, &["read_env_var", "base64_encode", "http_post"], PatternKind::PureMalwareOnly)],
            vec![],
        );
        let embedder = StubEmbedder::new(&[]);
        let engine = RetrievalEngine::new(&kb, &embedder, RetrievalConfig::default());

        let hits = engine.find_matching_patterns(&strings(&[
            "read_env_var",
            "base64_encode",
            "http_post",
        ]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].match_type, verdict_core::models::MatchType::Exact);
        assert_eq!(hits[0].match_length, 3);
    }

    #[test]
    fn similar_patterns_ranked_by_sequence_embedding() {
        let mut p1 = pattern(1, &["a", "b"], PatternKind::PureMalwareOnly);
        p1.embedding = vec![1.0, 0.0, 0.0, 0.0];
        let mut p2 = pattern(2, &["c", "d"], PatternKind::PureBenignOnly);
        p2.embedding = vec![0.0, 1.0, 0.0, 0.0];
        let kb = knowledge_base(vec![p1, p2], vec![]);

        let embedder = StubEmbedder::new(&[("a b", vec![0.9, 0.1, 0.0, 0.0])]);
        let engine = RetrievalEngine::new(&kb, &embedder, RetrievalConfig::default());

        let hits = engine.similar_patterns(&strings(&["a", "b"])).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].pattern_id, 1);
        assert_eq!(hits[0].kind, PatternKind::PureMalwareOnly);
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[test]
    fn empty_knowledge_base_yields_empty_results() {
        let kb = knowledge_base(vec![], vec![]);
        let embedder = StubEmbedder::new(&[]);
        let engine = RetrievalEngine::new(&kb, &embedder, RetrievalConfig::default());

        assert!(engine.find_matching_patterns(&strings(&["a"])).is_empty());
        assert!(engine.similar_patterns(&strings(&["a"])).unwrap().is_empty());
        assert!(engine.similar_cases("ctx").unwrap().is_empty());
    }

    #[test]
    fn missing_database_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.db");
        let err = load_knowledge_base(&path).unwrap_err();
        assert!(err.to_string().contains("knowledge base missing"));
    }
}
