use crate::backend::{CodeBackend, RemoteBackend};
use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::scanner::ScanInvoker;
use crate::store::ArtifactStore;
use crate::templates::TemplateLibrary;
use crate::types::{GenerationOutcome, GenerationRequest, PipelineResult};
use crate::ui;

/// Top-level coordinator: remote generation with template fallback, then
/// persistence, then a best-effort scan. One instance serves any number of
/// sequential or concurrent runs; the output directory is the only shared
/// mutable resource.
pub struct Pipeline {
    backend: Box<dyn CodeBackend>,
    templates: TemplateLibrary,
    store: ArtifactStore,
    scanner: ScanInvoker,
}

impl Pipeline {
    /// Wires the production pipeline from configuration. Fails fast on the
    /// configuration-missing class: absent templates, an unusable HTTP
    /// client, an empty scan chain.
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self::with_parts(
            Box::new(RemoteBackend::new(&config.backend)?),
            TemplateLibrary::load(&config.templates_dir)?,
            ArtifactStore::new(&config.output_dir),
            ScanInvoker::new(&config.scan)?,
        ))
    }

    /// Assembles a pipeline from pre-built components. Tests use this to
    /// substitute a fake backend or a scripted scan runner.
    pub fn with_parts(
        backend: Box<dyn CodeBackend>,
        templates: TemplateLibrary,
        store: ArtifactStore,
        scanner: ScanInvoker,
    ) -> Self {
        Self {
            backend,
            templates,
            store,
            scanner,
        }
    }

    /// Runs generate, persist, scan for one request.
    ///
    /// Backend failures fall back to template rendering; scan failures are
    /// reported inside the result. The only fatal mid-run path is failing to
    /// write the artifact.
    pub async fn run(&self, request: &GenerationRequest) -> Result<PipelineResult, PipelineError> {
        let outcome = match self.backend.generate(request).await {
            Ok(code) => {
                ui::info(format!("generation served by {} backend", self.backend.name()));
                GenerationOutcome::Remote { code }
            }
            Err(err) => {
                ui::warn(format!("backend unavailable, using template fallback: {err}"));
                self.templates.render_fallback(request)?
            }
        };

        let artifact = self.store.persist(outcome.code(), &request.task)?;
        ui::info(format!("artifact written to {}", artifact.path.display()));

        let scan = self.scanner.scan(&artifact.path).await;

        Ok(PipelineResult { artifact, scan })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::errors::BackendError;
    use crate::scanner::ScanStrategy;
    use crate::scanner::runner::MockRunner;
    use std::fs;
    use std::os::unix::process::ExitStatusExt;
    use std::process::Output;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct FixedBackend(String);

    #[async_trait::async_trait]
    impl CodeBackend for FixedBackend {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, BackendError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct DownBackend;

    #[async_trait::async_trait]
    impl CodeBackend for DownBackend {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, BackendError> {
            Err(BackendError::Api {
                status: 500,
                body: "model exploded".to_string(),
            })
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn output_with_code(code: i32, stdout: &str) -> Output {
        Output {
            status: std::process::ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    fn temp_templates() -> (TempDir, TemplateLibrary) {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("file_upload.py.tera"),
            "# upload: {{ task }} ({{ language }})\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("sql_demo.py.tera"),
            "# sql: {{ task }} ({{ language }})\n",
        )
        .unwrap();
        let library = TemplateLibrary::load(tmp.path()).unwrap();
        (tmp, library)
    }

    fn invoker(mock: Arc<MockRunner>) -> ScanInvoker {
        ScanInvoker::with_runner(
            mock,
            vec![
                ScanStrategy::module("python3", "bandit"),
                ScanStrategy::standalone("bandit"),
            ],
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn remote_success_persists_backend_code_verbatim() {
        let (_tpl_dir, templates) = temp_templates();
        let out = TempDir::new().unwrap();
        let mock = Arc::new(MockRunner::new());
        mock.push_output(Ok(output_with_code(0, "clean")));

        let pipeline = Pipeline::with_parts(
            Box::new(FixedBackend("print('from remote')".to_string())),
            templates,
            ArtifactStore::new(out.path()),
            invoker(mock),
        );

        let result = pipeline
            .run(&GenerationRequest::new("Upload file demo"))
            .await
            .unwrap();

        let written = fs::read_to_string(&result.artifact.path).unwrap();
        assert_eq!(written, "print('from remote')");
        assert!(result.scan.succeeded);
        assert_eq!(result.scan.attempted_strategies.len(), 1);
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_template() {
        let (_tpl_dir, templates) = temp_templates();
        let out = TempDir::new().unwrap();
        let mock = Arc::new(MockRunner::new());
        mock.push_output(Ok(output_with_code(0, "")));

        let pipeline = Pipeline::with_parts(
            Box::new(DownBackend),
            templates,
            ArtifactStore::new(out.path()),
            invoker(mock),
        );

        let result = pipeline
            .run(&GenerationRequest::new("Upload file demo"))
            .await
            .unwrap();

        let written = fs::read_to_string(&result.artifact.path).unwrap();
        assert_eq!(written, "# upload: Upload file demo (python)\n");
    }

    #[tokio::test]
    async fn scan_failure_does_not_fail_the_run() {
        let (_tpl_dir, templates) = temp_templates();
        let out = TempDir::new().unwrap();
        // No queued outputs: both strategies fail to launch.
        let mock = Arc::new(MockRunner::new());

        let pipeline = Pipeline::with_parts(
            Box::new(FixedBackend("pass".to_string())),
            templates,
            ArtifactStore::new(out.path()),
            invoker(mock),
        );

        let result = pipeline
            .run(&GenerationRequest::new("Query users safely"))
            .await
            .unwrap();

        assert!(!result.scan.succeeded);
        assert_eq!(result.scan.attempted_strategies.len(), 2);
        assert!(result.artifact.path.exists());
    }

    #[tokio::test]
    async fn persistence_failure_is_fatal() {
        let (_tpl_dir, templates) = temp_templates();
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        fs::write(&blocker, "occupied").unwrap();

        let pipeline = Pipeline::with_parts(
            Box::new(FixedBackend("pass".to_string())),
            templates,
            ArtifactStore::new(&blocker),
            invoker(Arc::new(MockRunner::new())),
        );

        let err = pipeline
            .run(&GenerationRequest::new("task"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Persist(_)));
    }
}
