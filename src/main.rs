mod bootstrap;
mod console;
mod driver;
mod fetch;
mod installer;
mod model;
mod net;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};

use fetch::runner::{CommandRunner, SystemRunner};
use model::config::{ConfigError, NodesConfig};
use net::MirrorResolver;
use settings::Settings;

#[derive(Parser)]
#[command(name = "atelier", version, about = "Bootstrap and asset acquisition for an AI image-generation studio")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full environment bootstrap: conda, studio checkout, nodes, models.
    Bootstrap {
        #[command(flatten)]
        settings: Settings,
    },
    /// Install or update the configured community nodes.
    InstallNodes {
        #[command(flatten)]
        settings: Settings,
    },
    /// Download the configured model assets.
    DownloadModels {
        #[command(flatten)]
        settings: Settings,
    },
}

fn main() -> Result<()> {
    // Log to file (never stdout; the console is reserved for progress lines).
    let _guard = init_logging()?;
    tracing::info!("atelier starting");

    let cli = Cli::parse();
    let runner = SystemRunner;

    match cli.command {
        Command::Bootstrap { settings } => bootstrap::run(&settings, &runner),
        Command::InstallNodes { settings } => install_nodes(&settings, &runner),
        Command::DownloadModels { settings } => download_models(&settings, &runner),
    }
}

fn install_nodes(settings: &Settings, runner: &dyn CommandRunner) -> Result<()> {
    let Some(config) = load_config(settings)? else {
        return Ok(());
    };
    installer::install_all(&config, settings, runner);
    Ok(())
}

fn download_models(settings: &Settings, runner: &dyn CommandRunner) -> Result<()> {
    let Some(config) = load_config(settings)? else {
        return Ok(());
    };

    let mirror = MirrorResolver::new();
    let report = driver::download_models(&config, settings, runner, &mirror);
    tracing::info!(descriptors = report.len(), summary = %report.summary(), "model pipeline finished");
    Ok(())
}

/// A missing configuration file exits non-zero; every other configuration
/// problem is announced and treated as "nothing to do".
fn load_config(settings: &Settings) -> Result<Option<NodesConfig>> {
    match NodesConfig::load(&settings.config) {
        Ok(config) => Ok(Some(config)),
        Err(err @ ConfigError::NotFound(_)) => {
            console::error(&err.to_string());
            Err(err.into())
        }
        Err(err) => {
            console::error(&err.to_string());
            tracing::warn!(error = %err, "configuration unusable, nothing to do");
            Ok(None)
        }
    }
}

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = directories::ProjectDirs::from("", "", "atelier")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("/tmp"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "atelier.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter("atelier=info")
        .init();

    Ok(guard)
}
