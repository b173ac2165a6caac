use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::sanitize::sanitize_hint;
use crate::types::PersistedArtifact;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const DEFAULT_EXTENSION: &str = "py";

/// Writes generated source files into an output directory under
/// timestamp-qualified names.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    extension: String,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persists `source_text` as `{sanitized_hint}_{YYYYMMDD_HHMMSS}.{ext}`
    /// inside the output directory, creating the directory first if absent.
    ///
    /// Two calls with the same hint inside the same second resolve to the same
    /// name and the later write overwrites the earlier one; callers needing
    /// stronger uniqueness must add their own suffix. I/O failures propagate
    /// unretried.
    pub fn persist(
        &self,
        source_text: &str,
        name_hint: &str,
    ) -> std::io::Result<PersistedArtifact> {
        fs::create_dir_all(&self.output_dir)?;

        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let file_name = format!("{}_{stamp}.{}", sanitize_hint(name_hint), self.extension);
        let path = self.output_dir.join(file_name);

        fs::write(&path, source_text)?;

        Ok(PersistedArtifact {
            path,
            created_at: stamp,
        })
    }
}
