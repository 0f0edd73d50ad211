use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ludoteca::api::state::AppState;
use ludoteca::auth::{AuthContext, SessionStore};
use ludoteca::config::AppConfig;
use ludoteca::covers::{scan_missing_covers, RawgClient};
use ludoteca::import::{parse_tsv, Importer};
use ludoteca::store::GameStore;

#[derive(Parser)]
#[command(name = "ludoteca")]
#[command(about = "Personal video-game collection tracker")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Import games from a TSV export
    Import {
        /// Path to the TSV file
        file: String,

        /// Parse and report without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Look up covers for games that have none
    ScanCovers {
        /// List candidates without calling the cover service
        #[arg(long)]
        dry_run: bool,
    },

    /// Create the database schema and exit
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ludoteca v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let store = GameStore::connect(&config.database_path).await?;
            let covers = Arc::new(RawgClient::new(&config.covers)?);

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = AppState {
                store,
                config: Arc::new(config),
                sessions: Arc::new(SessionStore::new()),
                covers,
            };
            let app = ludoteca::api::build_router(state);

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API: http://{}", addr);
            axum::serve(listener, app).await?;
        }

        Commands::Import { file, dry_run } => {
            let bytes = std::fs::read(&file)?;

            if dry_run {
                let rows = parse_tsv(&bytes);
                let valid = rows.iter().filter(|r| r.result.is_ok()).count();
                let errors: Vec<&String> =
                    rows.iter().filter_map(|r| r.result.as_ref().err()).collect();

                println!("\n=== Import Preview ===");
                println!("Valid rows:  {}", valid);
                println!("Bad rows:    {}", errors.len());
                for err in &errors {
                    println!("  - {}", err);
                }
                println!("\n(dry run - no data written)");
                return Ok(());
            }

            let store = GameStore::connect(&config.database_path).await?;
            let outcome = Importer::new(&store)
                .import(&AuthContext::admin(), &bytes)
                .await?;

            println!("\n=== Import Results ===");
            println!("Imported:    {}", outcome.imported);
            println!("Errors:      {}", outcome.errors.len());
            for err in &outcome.errors {
                println!("  - {}", err);
            }
        }

        Commands::ScanCovers { dry_run } => {
            let store = GameStore::connect(&config.database_path).await?;

            if dry_run {
                let missing = store.games_missing_cover().await?;
                println!("\n=== Cover Scan Preview ===");
                println!("Games without cover: {}", missing.len());
                for (id, title) in &missing {
                    println!("  #{} {}", id, title);
                }
                println!("\n(dry run - no lookups performed)");
                return Ok(());
            }

            let provider = Arc::new(RawgClient::new(&config.covers)?);
            let delay = Duration::from_millis(config.covers.rate_limit_ms);
            let outcome =
                scan_missing_covers(&store, &AuthContext::admin(), provider, delay).await?;

            println!("\n=== Cover Scan Results ===");
            println!("Updated:     {}", outcome.updated.len());
            println!("Failed:      {}", outcome.failed.len());
            for failure in &outcome.failed {
                println!("  - {} ({})", failure.title, failure.error);
            }
        }

        Commands::InitDb => {
            let store = GameStore::connect(&config.database_path).await?;
            store.init_schema().await?;
            println!("Database ready at {:?}", config.database_path);
        }
    }

    Ok(())
}
