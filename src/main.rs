use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use waka_analytics::get_summary_with_cancel;
use waka_core::config::AppConfig;
use waka_core::{RangeSelector, SummaryFetcher, WakaError};

#[derive(Parser)]
#[command(
    name = "waka-proxy",
    about = "Coding-activity summary proxy for a portfolio site",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/waka-proxy/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the upstream API base URL
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the standalone HTTP proxy (default)
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Fetch and aggregate once, printing the JSON summary to stdout
    Summary {
        /// Range selector, e.g. last_7_days, last_30_days, this_month
        #[arg(short, long)]
        range: Option<String>,
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (secrets redacted)
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; `summary` owns stdout.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "waka_proxy=info,waka_server=info,waka_core=info,warn".into()
        }))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config.
    let mut config = match &cli.config {
        Some(path) if path.exists() => AppConfig::load_from(path)?,
        Some(path) => {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            AppConfig::default()
        }
        None => AppConfig::load()?,
    };
    config.apply_env();

    // Apply CLI overrides.
    if let Some(api_base) = &cli.api_base {
        config.wakatime.api_base = api_base.clone();
    }

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            waka_server::serve(config).await?;
        }
        Some(Commands::Summary { range, compact }) => {
            return run_summary(&config, range, compact).await;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config, cli.config.as_deref())?;
        }
        None => {
            waka_server::serve(config).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// One-shot invocation: fetch, aggregate, print. Ctrl-C cancels the fetch.
async fn run_summary(config: &AppConfig, range: Option<String>, compact: bool) -> Result<ExitCode> {
    let range = RangeSelector::from_optional(
        range
            .as_deref()
            .or(Some(config.wakatime.default_range.as_str())),
    );
    let fetcher = SummaryFetcher::new(&config.wakatime)?;

    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available; never cancel.
            std::future::pending::<()>().await;
        }
    };

    match get_summary_with_cancel(&fetcher, &range, ctrl_c).await {
        Ok(output) => {
            let json = if compact {
                serde_json::to_string(&output)?
            } else {
                serde_json::to_string_pretty(&output)?
            };
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        Err(WakaError::Cancelled) => {
            tracing::debug!("Summary cancelled");
            Ok(ExitCode::from(130))
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_config_command(
    action: Option<ConfigAction>,
    config: &AppConfig,
    explicit_path: Option<&std::path::Path>,
) -> Result<()> {
    let path = explicit_path
        .map(PathBuf::from)
        .unwrap_or_else(AppConfig::default_path);

    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(&config.redacted())?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                AppConfig::default().save_to(&path)?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", path.display());
        }
    }
    Ok(())
}
