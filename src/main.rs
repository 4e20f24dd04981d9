use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redsys_api::adapters::{
    InMemoryTransactionRepository, PostgresTransactionRepository, TracingEventDispatcher,
};
use redsys_api::cli::{self, Cli, Commands, DbCommands, TxCommands};
use redsys_api::config::{Config, DatabaseConfig};
use redsys_api::ports::TransactionRepository;
use redsys_api::redsys::SoapTransport;
use redsys_api::services::RedsysApiManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging; stdout is reserved for command output
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    );
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let Cli { command } = Cli::parse();

    match command {
        Commands::Config => cli::handle_config_validate(&Config::from_env()?),
        Commands::Db(DbCommands::Migrate) => {
            cli::handle_db_migrate(&DatabaseConfig::from_env()).await
        }
        Commands::Tx(tx_cmd) => {
            let repository = cli::open_transaction_store(&DatabaseConfig::from_env()).await?;
            match tx_cmd {
                TxCommands::List { from, to } => cli::handle_tx_list(&repository, &from, &to).await,
                TxCommands::Export { from, to, output } => {
                    cli::handle_tx_export(&repository, &from, &to, output).await
                }
                TxCommands::Show { tx_id } => cli::handle_tx_show(&repository, tx_id).await,
            }
        }
        Commands::Pay(args) => {
            let manager = build_manager(&Config::from_env()?).await?;
            cli::handle_pay(&manager, args).await
        }
        Commands::Refund { order_id, amount } => {
            let manager = build_manager(&Config::from_env()?).await?;
            cli::handle_refund(&manager, order_id, amount).await
        }
    }
}

/// Postgres when configured, otherwise a store that lives as long as the command.
async fn build_repository(database: &DatabaseConfig) -> anyhow::Result<Arc<dyn TransactionRepository>> {
    match database.database_url.as_deref() {
        Some(url) => {
            let pool = redsys_api::db::create_pool(url).await?;
            tracing::info!("Using Postgres transaction store");
            Ok(Arc::new(PostgresTransactionRepository::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, transactions are kept in memory only");
            Ok(Arc::new(InMemoryTransactionRepository::new()))
        }
    }
}

async fn build_manager(config: &Config) -> anyhow::Result<RedsysApiManager> {
    let transport = SoapTransport::with_timeout(&config.redsys.endpoint, config.redsys.timeout())?;
    tracing::info!(endpoint = transport.endpoint(), "Redsys transport initialized");

    let repository = build_repository(&config.database).await?;

    Ok(RedsysApiManager::new(
        config.redsys.credentials(),
        Arc::new(transport),
        repository,
        Arc::new(TracingEventDispatcher::new()),
    ))
}
