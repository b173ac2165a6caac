use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scanner::ScanVerdict;

fn default_language() -> String {
    "python".to_string()
}

/// A single code-generation request: a natural-language task plus the target
/// language identifier. Immutable once built; one is created per pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub task: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl GenerationRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            language: default_language(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Generated source text tagged with where it came from: the remote backend,
/// or the local template fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Remote { code: String },
    Fallback { code: String },
}

impl GenerationOutcome {
    pub fn code(&self) -> &str {
        match self {
            GenerationOutcome::Remote { code } | GenerationOutcome::Fallback { code } => code,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            GenerationOutcome::Remote { code } | GenerationOutcome::Fallback { code } => code,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, GenerationOutcome::Fallback { .. })
    }
}

/// A generated source file written to disk. `created_at` is the timestamp
/// component baked into the filename (`YYYYMMDD_HHMMSS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedArtifact {
    pub path: PathBuf,
    pub created_at: String,
}

/// Terminal value of a pipeline run: the persisted artifact plus the scan
/// verdict. Scan failure lives inside `scan`, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub artifact: PersistedArtifact,
    pub scan: ScanVerdict,
}
