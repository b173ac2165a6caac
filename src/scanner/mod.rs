use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::errors::PipelineError;

pub mod runner;

use runner::{OsRunner, Runner};

/// One way of invoking the external scanner. The target file path is appended
/// to `args` at invocation time, so `args` holds only the fixed portion of
/// the command line.
#[derive(Debug, Clone)]
pub struct ScanStrategy {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl ScanStrategy {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
        }
    }

    /// Scanner reached through the interpreter's module loader.
    pub fn module(python: &str, scanner: &str) -> Self {
        Self::new(
            "module",
            python,
            vec!["-m".to_string(), scanner.to_string(), "-r".to_string()],
        )
    }

    /// Scanner reached directly as an executable on PATH.
    pub fn standalone(scanner: &str) -> Self {
        Self::new("standalone", scanner, vec!["-r".to_string()])
    }

    fn command_for(&self, target: &Path) -> (PathBuf, Vec<OsString>) {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(target.as_os_str().to_os_string());
        (PathBuf::from(&self.program), args)
    }
}

/// Record of one strategy invocation. `exit_code` is `None` when the process
/// never ran to completion: launch failure, timeout, or killed by a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StrategyAttempt {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Outcome of a full scan: every attempt in chain order, plus whether any of
/// them exited zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanVerdict {
    pub attempted_strategies: Vec<StrategyAttempt>,
    pub succeeded: bool,
}

/// Runs the scanner over a file through an ordered strategy chain, stopping
/// at the first strategy that exits zero.
///
/// Scanning is best-effort by contract: launch failures, timeouts, and
/// non-zero exits all become data in the verdict, never errors.
pub struct ScanInvoker {
    runner: Arc<dyn Runner>,
    strategies: Vec<ScanStrategy>,
    timeout: Duration,
}

impl std::fmt::Debug for ScanInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanInvoker")
            .field("strategies", &self.strategies)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ScanInvoker {
    /// Builds the default chain: the scanner as an interpreter module first,
    /// then as a standalone executable.
    pub fn new(config: &ScanConfig) -> Result<Self, PipelineError> {
        Self::with_runner(
            Arc::new(OsRunner),
            vec![
                ScanStrategy::module(&config.python, &config.scanner),
                ScanStrategy::standalone(&config.scanner),
            ],
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Builds an invoker over an explicit runner and chain. An empty chain is
    /// rejected here so `scan` always has something to attempt.
    pub fn with_runner(
        runner: Arc<dyn Runner>,
        strategies: Vec<ScanStrategy>,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        if strategies.is_empty() {
            return Err(PipelineError::Config(
                "scan strategy chain is empty".to_string(),
            ));
        }
        Ok(Self {
            runner,
            strategies,
            timeout,
        })
    }

    /// Tries each strategy in order against `target` until one exits zero.
    /// Never fails: an exhausted chain is reported through
    /// `ScanVerdict::succeeded`.
    pub async fn scan(&self, target: &Path) -> ScanVerdict {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            log::info!(
                "scanning {} via {} ({})",
                target.display(),
                strategy.name,
                strategy.program
            );
            let attempt = self.attempt(strategy, target).await;

            if !attempt.stdout.is_empty() {
                log::info!("scan output ({}):\n{}", strategy.name, attempt.stdout);
            }
            let done = attempt.succeeded();
            if !done {
                log::warn!(
                    "scan strategy {} failed (exit code {:?})",
                    strategy.name,
                    attempt.exit_code
                );
            }

            attempts.push(attempt);
            if done {
                break;
            }
        }

        let succeeded = attempts.iter().any(StrategyAttempt::succeeded);
        ScanVerdict {
            attempted_strategies: attempts,
            succeeded,
        }
    }

    async fn attempt(&self, strategy: &ScanStrategy, target: &Path) -> StrategyAttempt {
        let (program, args) = strategy.command_for(target);
        let runner = Arc::clone(&self.runner);

        // The timeout abandons the wait; the child itself is not killed.
        let run = tokio::task::spawn_blocking(move || runner.output(&program, &args));
        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(Ok(output))) => StrategyAttempt {
                strategy: strategy.name.clone(),
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Ok(Ok(Err(err))) => StrategyAttempt {
                strategy: strategy.name.clone(),
                exit_code: None,
                stdout: String::new(),
                stderr: format!("failed to launch {}: {err}", strategy.program),
            },
            Ok(Err(join_err)) => StrategyAttempt {
                strategy: strategy.name.clone(),
                exit_code: None,
                stdout: String::new(),
                stderr: format!("scan task failed: {join_err}"),
            },
            Err(_) => StrategyAttempt {
                strategy: strategy.name.clone(),
                exit_code: None,
                stdout: String::new(),
                stderr: format!("timed out after {}s", self.timeout.as_secs()),
            },
        }
    }
}
