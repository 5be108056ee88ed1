use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use herald_bot::application::errors::ConfigError;
use herald_bot::application::loader::DirectorySource;
use herald_bot::domain::entities::{events, EventPayload, User};
use herald_bot::domain::traits::TaskScheduler;
use herald_bot::infrastructure::adapters::{ConsoleAdapter, LocalClient};
use herald_bot::infrastructure::config::Config;
use herald_bot::infrastructure::locales::LocaleStore;
use herald_bot::infrastructure::scheduler::TokioScheduler;
use herald_bot::units::{builtin_loader, BuiltinCommands, ReminderRunner};
use herald_bot::{Bot, BotError, ModuleLoader};

#[derive(Parser)]
#[command(name = "herald-bot")]
#[command(about = "Runtime core of a chat bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// Load every locale and report translation coverage
    CheckLocales,
}

fn main() {
    let cli = Cli::parse();
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    let result = match cli.command {
        Commands::Run => block_on(run_bot(config)),
        Commands::Version => {
            println!("herald-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
        Commands::CheckLocales => block_on(check_locales(config)),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// File values first, then environment overrides; the result is validated
fn load_config(path: &str) -> Result<Config, ConfigError> {
    if !Path::new(path).exists() {
        return Config::load_env();
    }
    let mut config = Config::load(path).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}, using defaults", e);
        Config::default()
    });
    config.apply_env()?;
    Ok(config)
}

/// Everything runs on one cooperative thread
fn block_on<F>(future: F) -> Result<(), BotError>
where
    F: std::future::Future<Output = Result<(), BotError>>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;
    rt.block_on(future)
}

fn loader_for(config: &Config) -> ModuleLoader {
    let mut loader = builtin_loader();
    if let Some(dir) = &config.modules.events_dir {
        loader = loader.with_event_source(DirectorySource::new(dir));
    }
    if let Some(dir) = &config.modules.filters_dir {
        loader = loader.with_filter_source(DirectorySource::new(dir));
    }
    loader
}

async fn run_bot(config: Config) -> Result<(), BotError> {
    tracing::info!("Starting {}", config.bot.name);

    let client = Arc::new(
        LocalClient::new()
            .with_echo()
            .with_identity(User::new("0").with_username(config.bot.name.clone()).as_bot()),
    );
    let scheduler: Arc<dyn TaskScheduler> =
        Arc::new(TokioScheduler::new(Arc::new(ReminderRunner::new(client.clone()))));

    let loader = loader_for(&config);
    let bot = Arc::new(Bot::new(config, client.clone()).with_scheduler(scheduler));
    bot.launch(&loader, &BuiltinCommands).await?;

    client.emit(events::READY, EventPayload::Ready).await;

    let console = ConsoleAdapter::new(client);
    let outcome = console
        .run()
        .await
        .map_err(|e| BotError::Platform(format!("Console closed: {}", e)));
    bot.shutdown();
    outcome
}

async fn check_locales(config: Config) -> Result<(), BotError> {
    let store = LocaleStore::new(config.locales.source.clone());
    store.load_dir(&config.locales.directory).await?;

    for code in store.codes() {
        if let Some(locale) = store.get(&code) {
            let percent = if locale.is_empty() || code == store.source_code() {
                100.0
            } else {
                locale.overridden() as f64 * 100.0 / locale.len() as f64
            };
            println!("{:<6} {:>5} keys  {:>5.1}% translated", code, locale.len(), percent);
        }
    }
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = serde_yaml::to_string(&Config::default())
        .map_err(|e| BotError::Internal(format!("Failed to render config: {}", e)))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
