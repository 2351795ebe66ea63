use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

use voicetools_bot::application::errors::BotError;
use voicetools_bot::application::messaging::MessageDispatcher;
use voicetools_bot::application::services::{CommandService, ListService, VoiceService};
use voicetools_bot::domain::entities::MemberId;
use voicetools_bot::domain::traits::ConfigStore;
use voicetools_bot::infrastructure::adapters::console::ConsoleAdapter;
use voicetools_bot::infrastructure::adapters::discord::{self, Handler};
use voicetools_bot::infrastructure::config::{AdapterChoice, Config, StorageBackend};
use voicetools_bot::infrastructure::database::Database;
use voicetools_bot::infrastructure::storage::JsonStore;

#[derive(Parser)]
#[command(name = "voicetools-bot")]
#[command(about = "Voice channel limit enforcement and VIP bypass for Discord", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Discord bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.token) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("voicetools-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            if let Err(e) = init_config() {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(config) => config.with_env(),
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            }
        }
    } else {
        Config::load_env()
    }
}

async fn open_store(config: &Config) -> Result<Arc<dyn ConfigStore>, BotError> {
    let path = &config.storage.path;
    match config.storage.backend {
        StorageBackend::Sqlite => {
            let db = Database::new(path).map_err(|e| BotError::Storage(e.into()))?;
            tracing::info!("Database initialized at {}", path.display());
            Ok(Arc::new(db))
        }
        StorageBackend::Json => {
            let store = JsonStore::new(path);
            store.init().await?;
            tracing::info!("JSON store initialized at {}", path.display());
            Ok(Arc::new(store))
        }
    }
}

fn run_bot(config_path: &str, token_override: Option<String>) -> Result<(), BotError> {
    let config = load_config(config_path);
    config.validate()?;
    let adapter = config.select_adapter(token_override)?;
    tracing::info!("Starting {}", config.bot.name);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    rt.block_on(async {
        let store = open_store(&config).await?;
        let lists = Arc::new(
            ListService::new(store.clone()).with_page_length(config.listing.page_length),
        );

        match adapter {
            AdapterChoice::Discord(token) => {
                if config.owners.is_empty() {
                    tracing::warn!("No owners configured, every voicetools command will be refused");
                }
                let handler = Handler::new(
                    store,
                    lists,
                    config.owners.clone(),
                    config.bot.prefix.clone(),
                    config.forcelimit.temporary_channel_name.clone(),
                );
                discord::run(&token, handler).await
            }
            AdapterChoice::Console => run_console_bot(&config, store, lists).await,
        }
    })
}

/// Dev mode: a simulated guild driven from stdin
async fn run_console_bot(config: &Config, store: Arc<dyn ConfigStore>, lists: Arc<ListService>) -> Result<(), BotError> {
    let author = config.owners.first().copied().unwrap_or(MemberId(0));
    let owners = if config.owners.is_empty() {
        tracing::info!("No owners configured, console operator runs as {}", author);
        vec![author]
    } else {
        config.owners.clone()
    };

    let adapter = Arc::new(ConsoleAdapter::new());
    let commands = CommandService::new(lists, adapter.clone());
    let dispatcher = MessageDispatcher::with_defaults(config.bot.prefix.clone(), commands, owners);
    let voice = VoiceService::new(store, adapter.clone())
        .with_temporary_channel_name(config.forcelimit.temporary_channel_name.clone());

    adapter
        .run(&dispatcher, &voice, author)
        .await
        .map_err(|e| BotError::Internal(format!("Console input failed: {}", e)))
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
