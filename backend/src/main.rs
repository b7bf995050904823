use anyhow::Context;
use baby_tracker_backend::config::AppConfig;
use baby_tracker_backend::{create_router, initialize_backend};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Baby tracker backend", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, short, env = "BABY_TRACKER_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Attach entries recorded before families existed to per-user families
    MigrateLegacy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_serve(config).await,
        Command::MigrateLegacy => run_migrate_legacy(config).await,
    }
}

fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

async fn run_serve(config: AppConfig) -> anyhow::Result<()> {
    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Server listening on {}", config.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_migrate_legacy(config: AppConfig) -> anyhow::Result<()> {
    let app_state = initialize_backend(&config).await?;
    let report = app_state.migration_service.migrate_legacy_data().await?;

    info!(
        "Migrated {} feed entries and {} sleep sessions into {} new families",
        report.feed_entries_migrated, report.sleep_sessions_migrated, report.families_created
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
