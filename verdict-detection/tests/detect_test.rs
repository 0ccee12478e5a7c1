//! Full-pipeline test: mine a corpus, build the knowledge base, load it,
//! and detect against it.

use std::sync::atomic::{AtomicUsize, Ordering};

use verdict_core::config::{DetectionConfig, KnowledgeConfig, MiningConfig, RetrievalConfig};
use verdict_core::errors::VerdictResult;
use verdict_core::models::{ActionSequence, CaseLabel, MatchType, PatternKind, RiskLevel};
use verdict_core::traits::ILlmProvider;
use verdict_detection::DetectionEngine;
use verdict_knowledge::{KnowledgeBase, KnowledgeBuilder, KnowledgeStore};
use verdict_mining::MiningEngine;
use verdict_providers::HashingEmbedder;

struct CountingLlm {
    calls: AtomicUsize,
}

impl CountingLlm {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ILlmProvider for CountingLlm {
    fn complete(&self, _system: &str, _user: &str) -> VerdictResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(r#"{
            "semantic_summary": "posts environment data to a remote host",
            "security_assessment": "credential_theft risk",
            "is_malicious": true,
            "explanation": "exfiltration flow",
            "reasoning": "matches known malware cases",
            "recommendation": "remove"
        }"#
        .to_string())
    }

    fn name(&self) -> &str {
        "counting-mock"
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn exfil_sequence(i: usize) -> ActionSequence {
    ActionSequence::new(
        vec![
            "read_env_var".to_string(),
            "encode_base64".to_string(),
            "http_post".to_string(),
        ],
        CaseLabel::Malware,
        format!("mal_{i}.py"),
        "requests.post(url, data=b64(os.environ))",
    )
}

#[test]
fn mined_pattern_drives_deterministic_detection() {
    // Five identical malware sequences, no benign corpus.
    let malware: Vec<ActionSequence> = (0..5).map(exfil_sequence).collect();
    let benign: Vec<ActionSequence> = Vec::new();

    let mining_config = MiningConfig {
        support_levels: vec![1],
        ..Default::default()
    };
    let mined = MiningEngine::new(mining_config).mine(&benign, &malware).unwrap();

    // The longest covering subsequence wins selection and claims all five
    // sequences, so exactly one pattern survives.
    assert_eq!(mined.len(), 1);
    assert_eq!(mined[0].subsequence.len(), 3);
    assert_eq!(mined[0].kind, PatternKind::PureMalwareOnly);
    assert_eq!(mined[0].support, 5);
    assert_eq!(mined[0].covered_malware.len(), 5);

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("kb.db");
    let store = KnowledgeStore::open(&db).unwrap();
    let llm = CountingLlm::new();
    let embedder = HashingEmbedder::new(64);

    let knowledge_config = KnowledgeConfig {
        enrich_cases: false,
        worker_threads: 0,
        ..Default::default()
    };
    let builder = KnowledgeBuilder::new(&store, &llm, &embedder, knowledge_config);
    let report = builder.build(&mined, &benign, &malware).unwrap();
    assert_eq!(report.patterns_processed, 1);
    assert_eq!(report.cases_written, 5);
    let build_calls = llm.calls();

    let kb = KnowledgeBase::load(&store).unwrap();
    let engine = DetectionEngine::new(
        &kb,
        &embedder,
        &llm,
        DetectionConfig::default(),
        RetrievalConfig::default(),
    );

    // An exact query short-circuits deterministically: no further LLM use.
    let out = engine.detect(
        &[
            "read_env_var".to_string(),
            "encode_base64".to_string(),
            "http_post".to_string(),
        ],
        "requests.post(url, data=b64(os.environ))",
    );

    assert!(out.is_malicious);
    assert_eq!(out.confidence, 0.95);
    assert_eq!(out.detection_method, "pattern_match");
    assert_eq!(out.risk_level, RiskLevel::High);
    assert_eq!(out.matched_patterns.len(), 1);
    assert_eq!(out.matched_patterns[0].match_type, MatchType::Exact);
    assert_eq!(out.matched_patterns[0].match_length, 3);
    assert_eq!(llm.calls(), build_calls);
}

#[test]
fn unknown_sequence_escalates_to_rag() {
    let malware: Vec<ActionSequence> = (0..5).map(exfil_sequence).collect();
    let benign: Vec<ActionSequence> = Vec::new();

    let mining_config = MiningConfig {
        support_levels: vec![1],
        ..Default::default()
    };
    let mined = MiningEngine::new(mining_config).mine(&benign, &malware).unwrap();

    let store = KnowledgeStore::open_in_memory().unwrap();
    let llm = CountingLlm::new();
    let embedder = HashingEmbedder::new(64);
    let builder = KnowledgeBuilder::new(
        &store,
        &llm,
        &embedder,
        KnowledgeConfig {
            enrich_cases: false,
            worker_threads: 0,
            ..Default::default()
        },
    );
    builder.build(&mined, &benign, &malware).unwrap();
    let build_calls = llm.calls();

    let kb = KnowledgeBase::load(&store).unwrap();
    let engine = DetectionEngine::new(
        &kb,
        &embedder,
        &llm,
        DetectionConfig::default(),
        RetrievalConfig::default(),
    );

    // No index match: one LLM call grounded in vector retrieval.
    let out = engine.detect(
        &["open_file".to_string(), "write_file".to_string()],
        "open('x').write(y)",
    );

    assert_eq!(out.detection_method, "pattern_rag");
    assert!(out.matched_patterns.is_empty());
    assert_eq!(llm.calls(), build_calls + 1);
    assert!(out.is_malicious);
    assert!(out.confidence <= 1.0 && out.confidence >= 0.0);
}
