use thiserror::Error;

/// Failures from the remote generation backend.
///
/// All variants are recoverable: the pipeline answers any of them with the
/// template fallback, so none of these cross the orchestrator boundary.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Backend returned an empty code field")]
    EmptyCode,
}

/// Fatal pipeline failures. `Persist` is the only one raised mid-run; the
/// others surface when components are constructed or configured.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to persist artifact: {0}")]
    Persist(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
