use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use genguard::ui;
use genguard::{GenerationRequest, Pipeline, PipelineConfig, ScanInvoker};

mod args;
use args::{CliArgs, CliMode};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    ui::init_logging();

    let cli = match CliArgs::parse() {
        Ok(cli) => cli,
        Err(e) => usage_error(e),
    };
    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(e) => usage_error(e),
    };

    ui::set_quiet(cli.quiet);

    if let Err(err) = run(&cli, mode).await {
        ui::error(format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: &CliArgs, mode: CliMode) -> Result<()> {
    match mode {
        CliMode::Help => {
            println!("{}", args::USAGE);
        }
        CliMode::Version => {
            println!("genguard {}", env!("CARGO_PKG_VERSION"));
        }
        CliMode::ScanOnly { target } => {
            let config = load_config(cli)?;
            let invoker = ScanInvoker::new(&config.scan).context("building scan chain")?;
            let verdict = invoker.scan(Path::new(&target)).await;
            ui::scan_report(&verdict);
            if !verdict.succeeded {
                std::process::exit(1);
            }
        }
        CliMode::Generate { task } => {
            let config = load_config(cli)?;
            let pipeline = Pipeline::new(&config).context("initializing pipeline")?;

            let mut request = GenerationRequest::new(task);
            if let Some(lang) = &cli.language {
                request = request.with_language(lang);
            }

            let result = pipeline.run(&request).await.context("pipeline run failed")?;
            ui::scan_report(&result.scan);
            ui::info(format!("done: {}", result.artifact.path.display()));
        }
    }

    Ok(())
}

fn load_config(cli: &CliArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load().context("loading configuration")?;
    if let Some(url) = &cli.backend_url {
        config.backend.url = url.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(config)
}

fn usage_error(err: anyhow::Error) -> ! {
    ui::error(err.to_string());
    eprintln!("\n{}", args::USAGE);
    std::process::exit(2);
}
