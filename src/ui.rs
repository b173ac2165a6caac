use std::sync::atomic::{AtomicBool, Ordering};

use colored::*;

use crate::scanner::ScanVerdict;

static QUIET: AtomicBool = AtomicBool::new(false);

pub fn init_logging() {
    // Internal logs are opt-in via RUST_LOG. UI output remains separate.
    let mut builder = env_logger::Builder::from_default_env();
    // If user hasn't set RUST_LOG, default to warnings+.
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(log::LevelFilter::Warn);
    }
    let _ = builder.try_init();
}

/// Suppresses informational output. Warnings and errors still print.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn info(msg: impl AsRef<str>) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }
    println!("{} {}", "[INFO]".green().bold(), msg.as_ref());
}

pub fn warn(msg: impl AsRef<str>) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg.as_ref());
}

pub fn error(msg: impl AsRef<str>) {
    eprintln!("{} {}", "[ERROR]".red().bold(), msg.as_ref());
}

/// Per-strategy report of a finished scan, ending with the captured output of
/// the winning attempt when there is one.
pub fn scan_report(verdict: &ScanVerdict) {
    for attempt in &verdict.attempted_strategies {
        match attempt.exit_code {
            Some(0) => info(format!("scan via {} succeeded", attempt.strategy)),
            Some(code) => warn(format!(
                "scan via {} exited with code {code}",
                attempt.strategy
            )),
            None => warn(format!(
                "scan via {} did not run: {}",
                attempt.strategy,
                attempt.stderr.trim()
            )),
        }
    }

    match verdict.attempted_strategies.iter().find(|a| a.succeeded()) {
        Some(winner) if !winner.stdout.is_empty() => {
            println!("{}", winner.stdout.trim_end());
        }
        Some(_) => {}
        None => warn("scan failed on every strategy"),
    }
}
