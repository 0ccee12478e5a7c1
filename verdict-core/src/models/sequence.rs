use serde::{Deserialize, Serialize};

/// Ground-truth label of a code sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseLabel {
    Benign,
    Malware,
}

impl CaseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseLabel::Benign => "benign",
            CaseLabel::Malware => "malware",
        }
    }
}

impl std::fmt::Display for CaseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "benign" => Ok(CaseLabel::Benign),
            "malware" => Ok(CaseLabel::Malware),
            other => Err(format!("unknown case label: {other}")),
        }
    }
}

/// One labeled action sequence extracted upstream from a code sample.
///
/// Immutable once constructed; the mining and query paths only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSequence {
    /// Ordered abstracted API/behavior identifiers.
    pub actions: Vec<String>,
    /// Ground-truth label of the owning sample.
    pub label: CaseLabel,
    /// Source file or package name the sequence was extracted from.
    pub filename: String,
    /// Surrounding source snippet, used for context embeddings.
    pub code_context: String,
}

impl ActionSequence {
    pub fn new(
        actions: Vec<String>,
        label: CaseLabel,
        filename: impl Into<String>,
        code_context: impl Into<String>,
    ) -> Self {
        Self {
            actions,
            label,
            filename: filename.into(),
            code_context: code_context.into(),
        }
    }

    /// Space-joined action identifiers, the canonical text form used for
    /// sequence embeddings everywhere in the system.
    pub fn joined(&self) -> String {
        self.actions.join(" ")
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
