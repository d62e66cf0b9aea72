use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metalai_core::logging::{self, LogTarget};
use metalai_core::{db, ChatService, ChatbotClient, Config};
use tracing::info;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "metalai")]
#[command(about = "MetalAI LCA assistant", version)]
struct Cli {
    /// Config file (defaults to <config dir>/metalai/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat assistant (default)
    Chat,
    /// Connect to the document store once and report the result
    DbCheck,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(config).await,
        Commands::DbCheck => run_db_check(config).await,
    }
}

async fn run_chat(config: Config) -> Result<()> {
    let log_file = logging::default_log_file();
    logging::init(&config.log_filter, LogTarget::File(log_file.clone()))
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let client = match config.request_timeout {
        Some(timeout) => ChatbotClient::with_timeout(&config.chatbot_url, timeout)?,
        None => ChatbotClient::new(&config.chatbot_url),
    };
    info!(endpoint = %client.endpoint(), "starting chat assistant");

    let service: Arc<dyn ChatService> = Arc::new(client);
    let mut app = App::new(service);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = event_loop(&mut terminal, &mut app).await;
    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}

async fn run_db_check(config: Config) -> Result<()> {
    logging::init(&config.log_filter, LogTarget::Stderr).context("failed to initialise logging")?;

    let db_config = config.database()?;
    let store = db::connect_shared(&db_config)
        .await
        .context("document store bootstrap failed")?;

    println!("Connected to database '{}'", store.database().name());
    Ok(())
}
