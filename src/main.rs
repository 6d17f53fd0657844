use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod app;
mod backend;
mod config;
mod handler;
mod layout;
mod session;
mod tui;
mod ui;

use app::App;
use backend::ChatClient;
use config::Config;
use tui::EventHandler;

#[derive(Parser, Debug)]
#[command(name = "medappoint")]
#[command(about = "Chat with the MedAppoint appointment assistant from your terminal", version)]
struct Cli {
    /// Base URL of the chat backend (the client posts to <url>/chat)
    #[arg(long, env = "MEDAPPOINT_BACKEND_URL")]
    backend_url: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write logs (the terminal itself is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file.clone() {
        Some(path) => path,
        None => default_log_path()?,
    };
    init_logging(&log_path, cli.verbose)?;
    tracing::debug!(?cli, "parsed arguments");

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let client = ChatClient::new(&config.resolve_backend_url(cli.backend_url.as_deref()));
    tracing::info!(backend_url = client.base_url(), "starting chat session");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, client).await;
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!("chat client failed: {:?}", e);
    }
    result
}

async fn run(terminal: &mut tui::Tui, client: ChatClient) -> Result<()> {
    let mut events = EventHandler::new();
    let mut app = App::new(client, events.sender());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event),
            None => break,
        }
    }

    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?;
    Ok(data_dir.join("medappoint").join("medappoint.log"))
}

fn init_logging(path: &Path, verbose: u8) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
