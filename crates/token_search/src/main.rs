use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use token_search::ui::terminal::TerminalSearchApp;
use token_search::SearchConfig;

/// Interactive search box with token highlighting and suggestions.
#[derive(Parser, Debug)]
#[command(name = "token-search", version, about)]
struct Args {
    /// Search config (JSON). Defaults to <config dir>/token-search/config.json,
    /// falling back to a built-in config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write logs. Defaults to <cache dir>/token-search/token-search.log.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Rows reserved for the search box and its popup. Defaults to enough
    /// rows for the longest suggestion list.
    #[arg(long)]
    height: Option<u16>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("token-search")
        .join("token-search.log")
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = args.log_file.clone().unwrap_or_else(default_log_file);
    init_logging(&log_file)?;

    let config = SearchConfig::load_or_default(args.config.as_deref())
        .context("loading search config")?;
    info!(
        fields = config.fields.len(),
        operators = config.operators.len(),
        "config loaded"
    );

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let app = TerminalSearchApp::new(config, args.height);
    match app.run().await? {
        Some(submitted) => {
            println!("{}", submitted.query);
            for token in submitted
                .tokens
                .iter()
                .filter(|t| !t.kind.is_whitespace())
            {
                println!("  {:?}\t{:?}", token.kind, token.text);
            }
        }
        None => info!("search cancelled"),
    }
    Ok(())
}
