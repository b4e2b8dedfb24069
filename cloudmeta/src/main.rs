use catalog::config::Credential;
use clap::{Args, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod logging;

#[derive(Parser)]
#[command(name = "cloudmeta", about = "Serves cloud provider catalog metadata")]
enum CliCommand {
    /// Run the catalog HTTP service
    Serve(ServeArgs),
    /// Load and validate a config file, then exit
    CheckConfig(CheckConfigArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckConfigArgs {
    #[arg(long)]
    config: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Invalid(#[from] catalog::config::ConfigError),
    #[error(transparent)]
    Metrics(#[from] shared::metrics::MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Catalog(#[from] catalog::errors::CatalogError),
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    let result = match cli {
        CliCommand::Serve(args) => serve(args),
        CliCommand::CheckConfig(args) => check_config(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cloudmeta: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<config::Config, CliError> {
    let mut config = config::Config::load(path)?;
    let port = std::env::var("PORT").ok();
    config.catalog.apply_port_override(port.as_deref())?;
    config.catalog.validate()?;
    Ok(config)
}

fn check_config(args: CheckConfigArgs) -> Result<(), CliError> {
    let config = load_config(Some(&args.config))?;
    println!(
        "config ok: listening on {}:{}, provider {}",
        config.catalog.listener.host, config.catalog.listener.port, config.catalog.provider.base_url
    );
    Ok(())
}

fn serve(args: ServeArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let credential = Credential::from_env()?;

    let _sentry = logging::init(config.common.logging.as_ref());

    if let Some(metrics) = &config.common.metrics {
        shared::metrics::install_statsd(
            &metrics.statsd_host,
            metrics.statsd_port,
            "cloudmeta",
            catalog::metrics_defs::ALL_METRICS,
        )?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let result = runtime.block_on(catalog::run(config.catalog, credential));
    if let Err(err) = &result {
        tracing::error!(error = %err, "Catalog service stopped");
    }
    Ok(result?)
}
