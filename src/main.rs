use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use promo_radar::{
    config::{
        AppConfig,
        database::{connect, create_tables},
        sources::load_sources_or_default,
    },
    core::{
        ingest::Ingestor,
        query,
        trigger::{self, TriggerOutcome},
    },
    errors::Result,
    notifier::Notifier,
    sources::build_adapters,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "promo-radar", about = "Travel-deal scraper and alerting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(flatten)]
    Store(StoreCommand),
    /// Liveness probe
    Health,
}

/// Commands that need configuration and the database.
#[derive(Debug, Subcommand)]
enum StoreCommand {
    /// Run one ingestion cycle (requires the trigger secret)
    Run {
        /// Must match CRON_SECRET
        #[arg(long, env = "TRIGGER_SECRET", hide_env_values = true)]
        secret: String,

        /// Store new promotions without sending alerts
        #[arg(long)]
        no_notify: bool,
    },
    /// List stored promotions, newest first
    List {
        /// all, flight, miles or bonus_transfer
        #[arg(long, default_value = "all")]
        kind: String,

        /// Page size (at most 50)
        #[arg(long, default_value_t = query::MAX_PAGE_SIZE)]
        limit: u64,
    },
    /// Aggregate counts, lowest price and highest bonus
    Stats,
    /// Dashboard snapshot
    Overview,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // The liveness probe must not depend on configuration or storage.
    let Commands::Store(command) = cli.command else {
        return print_json(&trigger::health());
    };

    // 3. Load the application configuration
    let config = AppConfig::from_env()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the database
    let db = open_database(&config)
        .await
        .inspect(|_| info!("Database ready."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    match command {
        StoreCommand::Run { secret, no_notify } => {
            let ingestor = build_ingestor(db, &config)?;
            let outcome = if no_notify {
                trigger::authorize(&secret, &config)?;
                TriggerOutcome::from_report(ingestor.run_cycle(false).await?)
            } else {
                trigger::run_triggered(&ingestor, &config, &secret).await?
            };
            print_json(&outcome)
        }
        StoreCommand::List { kind, limit } => {
            print_json(&query::list_promotions(&db, &kind, limit).await?)
        }
        StoreCommand::Stats => print_json(&query::get_stats(&db).await?),
        StoreCommand::Overview => print_json(&query::overview(&db, &config).await?),
    }
}

async fn open_database(config: &AppConfig) -> Result<DatabaseConnection> {
    let db = connect(&config.database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

fn build_ingestor(db: DatabaseConnection, config: &AppConfig) -> Result<Ingestor> {
    let profiles = load_sources_or_default(config.sources_path.as_deref())?;
    let sources = build_adapters(profiles, config.http_timeout)?;
    let notifier = Notifier::from_config(config)?;
    info!(
        "Ingestor ready with {} sources (notifications {})",
        sources.len(),
        if notifier.is_configured() { "on" } else { "off" }
    );
    Ok(Ingestor::new(db, sources, notifier))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
