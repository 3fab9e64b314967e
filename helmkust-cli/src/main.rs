mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use config::{CliOverrides, ConfigMerger};
use helmkust_core::PipelineError;
use helmkust_core::adapters::KustomizeCommand;
use std::io;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Helm post-renderer: reads rendered manifests on stdin, applies the
/// kustomize overlay carried by the chart, and writes the result to stdout.
#[derive(Debug, Parser)]
#[command(name = "helmkust", version, about)]
struct Cli {
    /// Config file (default: ./helmkust.toml when present).
    #[arg(long, env = "HELMKUST_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Program that performs the overlay build.
    #[arg(long, env = "HELMKUST_KUSTOMIZE_BIN")]
    kustomize_bin: Option<String>,

    /// Argument passed to the build program before the staging directory.
    /// Repeat for several; replaces the configured list.
    #[arg(long = "kustomize-arg", allow_hyphen_values = true)]
    kustomize_args: Vec<String>,

    /// Directory in which staging areas are created (default: system temp dir).
    #[arg(long)]
    staging_dir: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<PipelineError>()
                .map_or(1, PipelineError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn real_main() -> anyhow::Result<()> {
    // stdout carries the manifest stream; logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("determine current directory")?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("current directory is not UTF-8: {}", p.display()))?;

    let file_config =
        config::load_or_default(cli.config.as_deref(), &cwd).context("load helmkust.toml config")?;
    let settings = ConfigMerger::new(file_config).merge(CliOverrides {
        kustomize_bin: cli.kustomize_bin,
        kustomize_args: cli.kustomize_args,
        staging_dir: cli.staging_dir,
    });
    debug!(
        "merged config: program={}, args={:?}, staging={:?}",
        settings.kustomize.program, settings.kustomize.args, settings.staging
    );

    let builder = KustomizeCommand::from(&settings.kustomize);
    let outcome = helmkust_core::run(
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &settings.staging,
        &builder,
    )?;

    debug!(
        transformed = outcome.transformed,
        manifests_in = outcome.manifests_in,
        manifests_out = outcome.manifests_out,
        "done"
    );
    Ok(())
}
