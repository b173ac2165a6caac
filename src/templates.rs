use std::path::Path;

use serde::{Deserialize, Serialize};
use tera::Tera;

use crate::errors::PipelineError;
use crate::types::{GenerationOutcome, GenerationRequest};

/// Fallback template categories. Selection is keyword-driven so new
/// categories only need a table entry and a template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Upload,
    SqlDemo,
}

const KEYWORD_TABLE: &[(&str, TemplateKind)] = &[("upload", TemplateKind::Upload)];

impl TemplateKind {
    /// Picks a category from the task text: the first table keyword found as
    /// a case-insensitive substring wins, everything else gets the SQL demo.
    pub fn for_task(task: &str) -> Self {
        let lowered = task.to_lowercase();
        for (keyword, kind) in KEYWORD_TABLE {
            if lowered.contains(keyword) {
                return *kind;
            }
        }
        TemplateKind::SqlDemo
    }

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Upload => "file_upload.py.tera",
            TemplateKind::SqlDemo => "sql_demo.py.tera",
        }
    }
}

/// Read-only repository of fallback templates, loaded and parsed once at
/// construction. This is the terminal fallback of the generation path, so a
/// missing or unparseable template is a configuration error raised here, not
/// a runtime condition the pipeline recovers from later.
#[derive(Debug)]
pub struct TemplateLibrary {
    tera: Tera,
}

impl TemplateLibrary {
    /// Loads every `*.tera` file under `dir` and verifies the shipped
    /// categories are all present.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let dir = dir.as_ref();
        let pattern = dir.join("*.tera");
        let tera = Tera::new(&pattern.to_string_lossy())?;

        let library = Self { tera };
        for kind in [TemplateKind::Upload, TemplateKind::SqlDemo] {
            if !library.has_template(kind.file_name()) {
                return Err(PipelineError::Config(format!(
                    "missing template {} in {}",
                    kind.file_name(),
                    dir.display()
                )));
            }
        }
        Ok(library)
    }

    fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Renders the fallback source for `request`. With a successfully loaded
    /// library this only fails in pathological cases; the pipeline treats any
    /// error here as fatal configuration trouble.
    pub fn render_fallback(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, PipelineError> {
        let kind = TemplateKind::for_task(&request.task);
        let mut context = tera::Context::new();
        context.insert("task", &request.task);
        context.insert("language", &request.language);

        let code = self.tera.render(kind.file_name(), &context)?;
        Ok(GenerationOutcome::Fallback { code })
    }
}
