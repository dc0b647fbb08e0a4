use std::process::ExitCode;

use caprover_compose::{Config, HttpClient, Pipeline, compose, pipeline};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const DRY_RUN_PROJECT_ID: &str = "<dry-run>";

fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(config.verbose);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}

fn run(config: &Config) -> anyhow::Result<()> {
    if config.dry_run {
        return dry_run(config);
    }

    let password = config.password()?;

    tracing::info!(url = %config.url, "connecting to CapRover");
    let client = HttpClient::new(&config.url, password)?;
    let mut pipeline = Pipeline::new(client, &config.project);
    pipeline.run(&config.compose_file)?;
    Ok(())
}

fn dry_run(config: &Config) -> anyhow::Result<()> {
    let compose = compose::load(&config.compose_file)?;
    pipeline::ensure_services(&compose, &config.compose_file)?;

    eprintln!("=== Dry run: no changes will be made ===");
    let definitions = pipeline::plan(&compose, DRY_RUN_PROJECT_ID);
    println!("{}", serde_json::to_string_pretty(&definitions)?);
    Ok(())
}
