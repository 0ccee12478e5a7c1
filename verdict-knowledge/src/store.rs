//! SQLite-backed knowledge store.
//!
//! One file holds patterns, cases, embeddings (little-endian f32 blobs),
//! the resumable build checkpoint, and run metadata. All writes go through
//! a single connection behind a mutex; the serving path only reads.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::info;
use verdict_core::errors::{KnowledgeError, VerdictResult};
use verdict_core::models::{CaseLabel, CaseRecord, Pattern, PatternCoverage, PatternKind};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS patterns (
    id               INTEGER PRIMARY KEY,
    subsequence      TEXT NOT NULL,
    kind             TEXT NOT NULL,
    support          INTEGER NOT NULL,
    discovery_level  INTEGER NOT NULL,
    benign_count     INTEGER NOT NULL,
    malware_count    INTEGER NOT NULL,
    benign_ratio     REAL NOT NULL,
    malware_ratio    REAL NOT NULL,
    enrichment       TEXT NOT NULL,
    embedding        BLOB NOT NULL,
    dimensions       INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS cases (
    id                  INTEGER PRIMARY KEY,
    pattern_id          INTEGER NOT NULL REFERENCES patterns(id),
    filename            TEXT NOT NULL,
    label               TEXT NOT NULL,
    action_sequence     TEXT NOT NULL,
    code_context        TEXT NOT NULL,
    sequence_embedding  BLOB NOT NULL,
    context_embedding   BLOB NOT NULL,
    case_summary        TEXT NOT NULL,
    key_behaviors       TEXT NOT NULL,
    risk_indicators     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cases_pattern ON cases(pattern_id);

CREATE TABLE IF NOT EXISTS checkpoint (
    pattern_id    INTEGER PRIMARY KEY,
    completed_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meta (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);
";

fn to_knowledge_err(message: impl Into<String>) -> KnowledgeError {
    KnowledgeError::Sqlite {
        message: message.into(),
    }
}

/// Encode an embedding as little-endian f32 bytes.
pub(crate) fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

/// Decode little-endian f32 bytes back into an embedding.
pub(crate) fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// The persisted knowledge base.
pub struct KnowledgeStore {
    conn: Mutex<Connection>,
}

impl KnowledgeStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> VerdictResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(|e| to_knowledge_err(e.to_string()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> VerdictResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_knowledge_err(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> VerdictResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Commit one pattern, its owned cases, and its checkpoint row in a
    /// single savepoint. Idempotent: re-running a committed pattern
    /// replaces identical rows.
    pub fn commit_pattern(&self, pattern: &Pattern, cases: &[CaseRecord]) -> VerdictResult<()> {
        let conn = self.conn.lock();
        conn.execute_batch("SAVEPOINT commit_pattern")
            .map_err(|e| to_knowledge_err(e.to_string()))?;

        match Self::commit_pattern_inner(&conn, pattern, cases) {
            Ok(()) => {
                conn.execute_batch("RELEASE commit_pattern")
                    .map_err(|e| to_knowledge_err(e.to_string()))?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK TO commit_pattern");
                let _ = conn.execute_batch("RELEASE commit_pattern");
                Err(e)
            }
        }
    }

    fn commit_pattern_inner(
        conn: &Connection,
        pattern: &Pattern,
        cases: &[CaseRecord],
    ) -> VerdictResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO patterns
             (id, subsequence, kind, support, discovery_level,
              benign_count, malware_count, benign_ratio, malware_ratio,
              enrichment, embedding, dimensions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                pattern.id,
                serde_json::to_string(&pattern.subsequence)?,
                pattern.kind.as_str(),
                pattern.support as i64,
                pattern.discovery_level as i64,
                pattern.coverage.benign_count as i64,
                pattern.coverage.malware_count as i64,
                pattern.coverage.benign_ratio,
                pattern.coverage.malware_ratio,
                serde_json::to_string(&pattern.enrichment)?,
                f32_vec_to_bytes(&pattern.embedding),
                pattern.embedding.len() as i64,
            ],
        )
        .map_err(|e| to_knowledge_err(e.to_string()))?;

        for case in cases {
            conn.execute(
                "INSERT OR REPLACE INTO cases
                 (id, pattern_id, filename, label, action_sequence, code_context,
                  sequence_embedding, context_embedding, case_summary,
                  key_behaviors, risk_indicators)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    case.id,
                    case.pattern_id,
                    case.filename,
                    case.label.as_str(),
                    serde_json::to_string(&case.action_sequence)?,
                    case.code_context,
                    f32_vec_to_bytes(&case.sequence_embedding),
                    f32_vec_to_bytes(&case.context_embedding),
                    case.case_summary,
                    serde_json::to_string(&case.key_behaviors)?,
                    serde_json::to_string(&case.risk_indicators)?,
                ],
            )
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO checkpoint (pattern_id, completed_at) VALUES (?1, ?2)",
            params![pattern.id, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| to_knowledge_err(e.to_string()))?;

        Ok(())
    }

    /// Pattern IDs already committed by a previous (possibly interrupted) build.
    pub fn checkpointed_ids(&self) -> VerdictResult<HashSet<i64>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT pattern_id FROM checkpoint")
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .map_err(|e| to_knowledge_err(e.to_string()))?;

        let mut out = HashSet::new();
        for row in rows {
            out.insert(row.map_err(|e| to_knowledge_err(e.to_string()))?);
        }
        Ok(out)
    }

    /// Load every pattern.
    pub fn load_patterns(&self) -> VerdictResult<Vec<Pattern>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, subsequence, kind, support, discovery_level,
                        benign_count, malware_count, benign_ratio, malware_ratio,
                        enrichment, embedding
                 FROM patterns ORDER BY id",
            )
            .map_err(|e| to_knowledge_err(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, f64>(7)?,
                    row.get::<_, f64>(8)?,
                    row.get::<_, String>(9)?,
                    row.get::<_, Vec<u8>>(10)?,
                ))
            })
            .map_err(|e| to_knowledge_err(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            let (id, subseq, kind, support, level, bc, mc, br, mr, enrichment, blob) =
                row.map_err(|e| to_knowledge_err(e.to_string()))?;
            out.push(Pattern {
                id,
                subsequence: serde_json::from_str(&subseq)?,
                kind: PatternKind::from_str(&kind)
                    .map_err(|e| to_knowledge_err(e))?,
                support: support as usize,
                discovery_level: level as usize,
                coverage: PatternCoverage {
                    benign_count: bc as usize,
                    malware_count: mc as usize,
                    benign_ratio: br,
                    malware_ratio: mr,
                },
                enrichment: serde_json::from_str(&enrichment)?,
                embedding: bytes_to_f32_vec(&blob),
            });
        }
        Ok(out)
    }

    /// Load every case.
    pub fn load_cases(&self) -> VerdictResult<Vec<CaseRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, pattern_id, filename, label, action_sequence, code_context,
                        sequence_embedding, context_embedding, case_summary,
                        key_behaviors, risk_indicators
                 FROM cases ORDER BY id",
            )
            .map_err(|e| to_knowledge_err(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Vec<u8>>(6)?,
                    row.get::<_, Vec<u8>>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                    row.get::<_, String>(10)?,
                ))
            })
            .map_err(|e| to_knowledge_err(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            let (id, pattern_id, filename, label, actions, ctx, seq_blob, ctx_blob, summary, behaviors, risks) =
                row.map_err(|e| to_knowledge_err(e.to_string()))?;
            out.push(CaseRecord {
                id,
                pattern_id,
                filename,
                label: CaseLabel::from_str(&label).map_err(|e| to_knowledge_err(e))?,
                action_sequence: serde_json::from_str(&actions)?,
                code_context: ctx,
                sequence_embedding: bytes_to_f32_vec(&seq_blob),
                context_embedding: bytes_to_f32_vec(&ctx_blob),
                case_summary: summary,
                key_behaviors: serde_json::from_str(&behaviors)?,
                risk_indicators: serde_json::from_str(&risks)?,
            });
        }
        Ok(out)
    }

    pub fn pattern_count(&self) -> VerdictResult<usize> {
        self.scalar_count("SELECT COUNT(*) FROM patterns")
    }

    pub fn case_count(&self) -> VerdictResult<usize> {
        self.scalar_count("SELECT COUNT(*) FROM cases")
    }

    fn scalar_count(&self, sql: &str) -> VerdictResult<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        Ok(n as usize)
    }

    /// Write a metadata key (embedding model, counts, build timestamp).
    pub fn set_meta(&self, key: &str, value: &str) -> VerdictResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e| to_knowledge_err(e.to_string()))?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> VerdictResult<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT value FROM meta WHERE key = ?1")
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        let mut rows = stmt
            .query(params![key])
            .map_err(|e| to_knowledge_err(e.to_string()))?;
        match rows.next().map_err(|e| to_knowledge_err(e.to_string()))? {
            Some(row) => Ok(Some(
                row.get::<_, String>(0)
                    .map_err(|e| to_knowledge_err(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    /// Log a one-line summary of what this store holds.
    pub fn log_summary(&self) -> VerdictResult<()> {
        info!(
            patterns = self.pattern_count()?,
            cases = self.case_count()?,
            "knowledge store"
        );
        Ok(())
    }
}
