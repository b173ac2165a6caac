use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

pub const CONFIG_PATH: &str = ".genguard/config.json";

/// Remote generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,

    /// Bearer credential. Never read from the config file; populated from
    /// `GENGUARD_BACKEND_SECRET` or by the front end.
    #[serde(skip)]
    pub secret: Option<String>,

    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            secret: None,
            timeout_secs: 120,
        }
    }
}

/// External scanner settings. `python` and `scanner` feed the default
/// strategy chain; `timeout_secs` bounds each strategy attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub timeout_secs: u64,
    pub python: String,
    pub scanner: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            python: "python3".to_string(),
            scanner: "bandit".to_string(),
        }
    }
}

/// Everything the pipeline needs, passed explicitly into constructors so
/// nothing reads global state after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub backend: BackendConfig,
    pub scan: ScanConfig,
    pub output_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            scan: ScanConfig::default(),
            output_dir: PathBuf::from("generated"),
            templates_dir: PathBuf::from("templates"),
        }
    }
}

impl PipelineConfig {
    /// Loads `.genguard/config.json` from the working directory when present,
    /// then applies `GENGUARD_*` environment overrides on top.
    pub fn load() -> Result<Self, PipelineError> {
        let mut config = Self::from_file(Path::new(CONFIG_PATH))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Reads a config file, or returns defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Environment beats file: `GENGUARD_BACKEND_URL`,
    /// `GENGUARD_BACKEND_SECRET`, `GENGUARD_SCAN_TIMEOUT`,
    /// `GENGUARD_OUTPUT_DIR`, `GENGUARD_TEMPLATES_DIR`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("GENGUARD_BACKEND_URL")
            && !url.is_empty()
        {
            self.backend.url = url;
        }
        if let Ok(secret) = env::var("GENGUARD_BACKEND_SECRET")
            && !secret.is_empty()
        {
            self.backend.secret = Some(secret);
        }
        if let Ok(timeout) = env::var("GENGUARD_SCAN_TIMEOUT")
            && let Ok(secs) = timeout.parse()
        {
            self.scan.timeout_secs = secs;
        }
        if let Ok(dir) = env::var("GENGUARD_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("GENGUARD_TEMPLATES_DIR")
            && !dir.is_empty()
        {
            self.templates_dir = PathBuf::from(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use tempfile::TempDir;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const VARS: &[&str] = &[
        "GENGUARD_BACKEND_URL",
        "GENGUARD_BACKEND_SECRET",
        "GENGUARD_SCAN_TIMEOUT",
        "GENGUARD_OUTPUT_DIR",
        "GENGUARD_TEMPLATES_DIR",
    ];

    struct EnvGuard {
        _lock: MutexGuard<'static, ()>,
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
            let saved = VARS.iter().map(|v| (*v, env::var(v).ok())).collect();

            // SAFETY: env mutation is guarded by ENV_LOCK.
            unsafe {
                for var in VARS {
                    env::remove_var(var);
                }
            }

            Self { _lock: lock, saved }
        }

        fn set(&self, var: &str, value: &str) {
            // SAFETY: env mutation is guarded by ENV_LOCK.
            unsafe {
                env::set_var(var, value);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // SAFETY: env mutation is guarded by ENV_LOCK.
            unsafe {
                for (var, value) in &self.saved {
                    match value {
                        Some(v) => env::set_var(var, v),
                        None => env::remove_var(var),
                    }
                }
            }
        }
    }

    #[test]
    fn defaults_are_sane() {
        let config = PipelineConfig::default();
        assert_eq!(config.backend.url, "http://localhost:8000");
        assert_eq!(config.backend.timeout_secs, 120);
        assert!(config.backend.secret.is_none());
        assert_eq!(config.scan.timeout_secs, 60);
        assert_eq!(config.scan.python, "python3");
        assert_eq!(config.scan.scanner, "bandit");
        assert_eq!(config.output_dir, PathBuf::from("generated"));
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = PipelineConfig::from_file(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config.backend.url, "http://localhost:8000");
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"backend":{"url":"http://10.0.0.5:9000"},"output_dir":"out"}"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.backend.url, "http://10.0.0.5:9000");
        assert_eq!(config.backend.timeout_secs, 120);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.scan.scanner, "bandit");
    }

    #[test]
    fn secret_in_file_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"backend":{"secret":"leaked"}}"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert!(config.backend.secret.is_none());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let guard = EnvGuard::new();
        guard.set("GENGUARD_BACKEND_URL", "http://envhost:7000");
        guard.set("GENGUARD_BACKEND_SECRET", "s3cr3t");
        guard.set("GENGUARD_SCAN_TIMEOUT", "15");
        guard.set("GENGUARD_OUTPUT_DIR", "/tmp/env-out");

        let mut config = PipelineConfig::default();
        config.backend.url = "http://filehost:8000".to_string();
        config.apply_env_overrides();

        assert_eq!(config.backend.url, "http://envhost:7000");
        assert_eq!(config.backend.secret.as_deref(), Some("s3cr3t"));
        assert_eq!(config.scan.timeout_secs, 15);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/env-out"));
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
    }

    #[test]
    fn unparseable_scan_timeout_is_ignored() {
        let guard = EnvGuard::new();
        guard.set("GENGUARD_SCAN_TIMEOUT", "soon");

        let mut config = PipelineConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.scan.timeout_secs, 60);
    }
}
