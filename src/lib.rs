mod backend;
mod config;
mod errors;
mod pipeline;
mod sanitize;
mod scanner;
mod store;
mod templates;
mod types;
pub mod ui;

pub use crate::backend::{CodeBackend, RemoteBackend};
pub use crate::config::{BackendConfig, PipelineConfig, ScanConfig};
pub use crate::errors::{BackendError, PipelineError};
pub use crate::pipeline::Pipeline;
pub use crate::sanitize::sanitize_hint;
pub use crate::scanner::runner::{MockRunner, OsRunner, RunCall, Runner};
pub use crate::scanner::{ScanInvoker, ScanStrategy, ScanVerdict, StrategyAttempt};
pub use crate::store::ArtifactStore;
pub use crate::templates::{TemplateKind, TemplateLibrary};
pub use crate::types::{GenerationOutcome, GenerationRequest, PersistedArtifact, PipelineResult};
