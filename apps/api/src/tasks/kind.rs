//! TaskKind — the closed set of text transformations a client can request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A transformation selector, received on the wire as its PascalCase name.
///
/// Unrecognized names are kept as `Other` so they round-trip unchanged
/// and fall back to the generic assistant prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskKind {
    Describe,
    CorrectGrammar,
    RephraseFluently,
    Pronounce,
    ExplainThis,
    TranslateToBengali,
    ExplainVocabulary,
    ImproveSentence,
    Other(String),
}

impl TaskKind {
    pub const RECOGNIZED: [TaskKind; 8] = [
        TaskKind::Describe,
        TaskKind::CorrectGrammar,
        TaskKind::RephraseFluently,
        TaskKind::Pronounce,
        TaskKind::ExplainThis,
        TaskKind::TranslateToBengali,
        TaskKind::ExplainVocabulary,
        TaskKind::ImproveSentence,
    ];

    pub fn parse(name: &str) -> Self {
        match name {
            "Describe" => TaskKind::Describe,
            "CorrectGrammar" => TaskKind::CorrectGrammar,
            "RephraseFluently" => TaskKind::RephraseFluently,
            "Pronounce" => TaskKind::Pronounce,
            "ExplainThis" => TaskKind::ExplainThis,
            "TranslateToBengali" => TaskKind::TranslateToBengali,
            "ExplainVocabulary" => TaskKind::ExplainVocabulary,
            "ImproveSentence" => TaskKind::ImproveSentence,
            other => TaskKind::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TaskKind::Describe => "Describe",
            TaskKind::CorrectGrammar => "CorrectGrammar",
            TaskKind::RephraseFluently => "RephraseFluently",
            TaskKind::Pronounce => "Pronounce",
            TaskKind::ExplainThis => "ExplainThis",
            TaskKind::TranslateToBengali => "TranslateToBengali",
            TaskKind::ExplainVocabulary => "ExplainVocabulary",
            TaskKind::ImproveSentence => "ImproveSentence",
            TaskKind::Other(name) => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, TaskKind::Other(_))
    }
}

impl From<String> for TaskKind {
    fn from(name: String) -> Self {
        TaskKind::parse(&name)
    }
}

impl From<TaskKind> for String {
    fn from(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
