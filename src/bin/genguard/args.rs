use anyhow::{Result, anyhow};
use std::env;

pub const USAGE: &str = "\
genguard - generate code via a remote backend with local fallback, then scan it

Usage:
  genguard --task <TEXT> [options]     generate, persist, and scan
  genguard --scan <FILE> [options]     scan an existing file only

Options:
  -t, --task <TEXT>        natural-language description of the code to generate
  -l, --lang <ID>          target language identifier (default: python)
  -s, --scan <FILE>        run only the scanner over an existing file
  -o, --output-dir <DIR>   directory for generated artifacts (default: generated)
      --backend-url <URL>  generation service base URL
  -q, --quiet              suppress informational output
  -h, --help               print this help
  -V, --version            print version";

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub task: Option<String>,        // -t/--task
    pub language: Option<String>,    // -l/--lang
    pub scan_target: Option<String>, // -s/--scan
    pub output_dir: Option<String>,  // -o/--output-dir
    pub backend_url: Option<String>, // --backend-url
    pub quiet: bool,                 // -q/--quiet
    pub help: bool,                  // -h/--help
    pub version: bool,               // -V/--version
}

/// What the invocation asks for, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliMode {
    Generate { task: String },
    ScanOnly { target: String },
    Help,
    Version,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Result<Self> {
        let args: Vec<String> = env::args().collect();
        Self::parse_from(&args[1..])
    }

    /// Parse from a slice of arguments (for testing)
    pub fn parse_from(args: &[String]) -> Result<Self> {
        let mut result = CliArgs {
            task: None,
            language: None,
            scan_target: None,
            output_dir: None,
            backend_url: None,
            quiet: false,
            help: false,
            version: false,
        };

        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];

            match arg.as_str() {
                "-t" | "--task" => {
                    i += 1;
                    if i >= args.len() {
                        return Err(anyhow!("{arg} requires a value"));
                    }
                    result.task = Some(args[i].clone());
                }
                "-l" | "--lang" => {
                    i += 1;
                    if i >= args.len() {
                        return Err(anyhow!("{arg} requires a value"));
                    }
                    result.language = Some(args[i].clone());
                }
                "-s" | "--scan" => {
                    i += 1;
                    if i >= args.len() {
                        return Err(anyhow!("{arg} requires a value"));
                    }
                    result.scan_target = Some(args[i].clone());
                }
                "-o" | "--output-dir" => {
                    i += 1;
                    if i >= args.len() {
                        return Err(anyhow!("{arg} requires a value"));
                    }
                    result.output_dir = Some(args[i].clone());
                }
                "--backend-url" => {
                    i += 1;
                    if i >= args.len() {
                        return Err(anyhow!("{arg} requires a value"));
                    }
                    result.backend_url = Some(args[i].clone());
                }
                "-q" | "--quiet" => {
                    result.quiet = true;
                }
                "-h" | "--help" => {
                    result.help = true;
                }
                "-V" | "--version" => {
                    result.version = true;
                }
                unknown => {
                    return Err(anyhow!("Unknown argument: {unknown}"));
                }
            }

            i += 1;
        }

        Ok(result)
    }

    /// Resolves the parsed flags into one mode. Help and version win over
    /// everything; otherwise exactly one of --task or --scan must be given.
    pub fn mode(&self) -> Result<CliMode> {
        if self.help {
            return Ok(CliMode::Help);
        }
        if self.version {
            return Ok(CliMode::Version);
        }
        if let Some(target) = &self.scan_target {
            if self.task.is_some() {
                return Err(anyhow!("--task and --scan are mutually exclusive"));
            }
            return Ok(CliMode::ScanOnly {
                target: target.clone(),
            });
        }
        match &self.task {
            Some(task) => Ok(CliMode::Generate { task: task.clone() }),
            None => Err(anyhow!("either --task or --scan is required")),
        }
    }
}
