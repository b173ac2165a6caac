use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

/// Seam between the scan chain and the operating system: everything that
/// launches a scanner process goes through this trait so tests can substitute
/// canned results.
pub trait Runner: Send + Sync {
    fn output(&self, program: &Path, args: &[OsString]) -> std::io::Result<Output>;
}

pub struct OsRunner;

impl Runner for OsRunner {
    fn output(&self, program: &Path, args: &[OsString]) -> std::io::Result<Output> {
        Command::new(program).args(args).output()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCall {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

/// Test double that records every invocation and replays queued outputs in
/// order. An exhausted queue returns an error, which the scan chain treats
/// like any other launch failure.
pub struct MockRunner {
    calls: Mutex<Vec<RunCall>>,
    outputs: Mutex<VecDeque<std::io::Result<Output>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outputs: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_output(&self, out: std::io::Result<Output>) {
        self.outputs.lock().unwrap().push_back(out);
    }

    pub fn calls(&self) -> Vec<RunCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for MockRunner {
    fn output(&self, program: &Path, args: &[OsString]) -> std::io::Result<Output> {
        self.calls.lock().unwrap().push(RunCall {
            program: program.to_path_buf(),
            args: args.to_vec(),
        });

        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(std::io::Error::other("MockRunner has no queued outputs")))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    fn scan_output(stdout: &str) -> Output {
        Output {
            status: std::process::ExitStatus::from_raw(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    #[test]
    fn mock_runner_records_calls_and_replays_outputs() {
        let mock = MockRunner::new();
        mock.push_output(Ok(scan_output("No issues identified.")));

        let out = mock
            .output(
                Path::new("bandit"),
                &[OsString::from("-r"), OsString::from("demo.py")],
            )
            .unwrap();

        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout), "No issues identified.");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, PathBuf::from("bandit"));
        assert_eq!(calls[0].args, vec![OsString::from("-r"), OsString::from("demo.py")]);
    }

    #[test]
    fn exhausted_queue_reports_an_error() {
        let mock = MockRunner::new();
        let err = mock.output(Path::new("bandit"), &[]).unwrap_err();
        assert!(err.to_string().contains("no queued outputs"));
    }
}
