mod api;
mod cli;
mod config;
mod error;
mod models;
mod router;
mod session;
mod token;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;

use api::ApiClient;
use session::Session;
use token::TokenStore;

#[derive(Parser)]
#[command(name = "ambu", about = "Command-line client for the Ambu-Life fleet service")]
pub struct Args {
    #[arg(short, long, help = "One-shot command mode (e.g. 'whoami')")]
    pub command: Option<String>,

    #[arg(long, env = "AMBU_API_URL", help = "API base URL override")]
    pub api_url: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Token file path override")]
    pub token_file: Option<PathBuf>,

    #[arg(long, value_name = "MS", help = "Request timeout in milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(long, help = "Debug output (log HTTP details to stderr)")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_logging(args.debug);

    // Load configuration, then apply CLI/env overrides on top.
    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load().unwrap_or_default()
    };
    if let Some(api_url) = &args.api_url {
        cfg.api.base_url = api_url.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        cfg.api.timeout_ms = timeout_ms;
    }

    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error {}", error);
        }
        return Err(anyhow::anyhow!("invalid configuration"));
    }

    let token_path = args
        .token_file
        .clone()
        .or_else(|| cfg.token_file.clone())
        .unwrap_or_else(TokenStore::default_path);
    let tokens = TokenStore::new(token_path);
    tracing::debug!(token_file = %tokens.path().display(), api = %cfg.api.base_url, "client configured");

    let client = ApiClient::new(&cfg.api.base_url, cfg.api.timeout_ms, tokens.clone());
    let mut session = Session::new(client, tokens);

    // Restore the session from the stored token before handing over; with no
    // token this resolves locally without a network call.
    session.load_user();

    let ctx = cli::Context {
        args,
        session: RefCell::new(session),
    };

    if let Some(command) = ctx.args.command.clone() {
        cli::run_once(&ctx, &command)
    } else {
        cli::run_repl(ctx)
    }
}

fn init_logging(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug))
        .with_writer(std::io::stderr)
        .init();
}

/// Filter sources, in priority order: AMBU_LOG, RUST_LOG, built-in default.
fn log_filter(debug: bool) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    let default_filter = if debug { "ambu=debug" } else { "ambu=warn" };
    EnvFilter::try_from_env("AMBU_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter))
}
