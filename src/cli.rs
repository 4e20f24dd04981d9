use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::adapters::PostgresTransactionRepository;
use crate::config::{Config, DatabaseConfig};
use crate::domain::{PaymentContext, RedsysApiMethod};
use crate::ports::TransactionRepository;
use crate::services::export::{parse_date, write_transactions_csv};
use crate::services::RedsysApiManager;
use crate::utils::sanitize::{mask_password, mask_secret};

#[derive(Parser)]
#[command(name = "redsys-api")]
#[command(about = "Redsys web service payment client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Charge a card through the gateway
    Pay(PayArgs),

    /// Refund a previous payment
    Refund {
        /// Order the payment was made for
        #[arg(long)]
        order_id: String,

        /// Amount in the smallest currency unit
        #[arg(long)]
        amount: i64,
    },

    /// Stored transaction commands
    #[command(subcommand)]
    Tx(TxCommands),

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(clap::Args, Debug)]
pub struct PayArgs {
    #[arg(long)]
    pub order_id: String,

    /// Amount in the smallest currency unit
    #[arg(long)]
    pub amount: i64,

    #[arg(long)]
    pub card_number: String,

    #[arg(long)]
    pub card_owner: String,

    #[arg(long)]
    pub expiration_year: u32,

    #[arg(long)]
    pub expiration_month: u32,

    #[arg(long)]
    pub cvc: String,
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// List transactions created in a date range
    List {
        /// Start date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: String,

        /// End date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        to: String,
    },

    /// Export transactions in a date range as CSV
    Export {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a single transaction
    Show {
        /// Transaction UUID
        #[arg(value_name = "TX_ID")]
        tx_id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

pub async fn handle_pay(manager: &RedsysApiManager, args: PayArgs) -> anyhow::Result<()> {
    let ctx = PaymentContext::new(args.order_id, args.amount);
    let mut method = RedsysApiMethod::new(
        args.card_number,
        args.card_owner,
        args.expiration_year,
        args.expiration_month,
        args.cvc,
    );

    match manager.process_payment(&ctx, &mut method).await {
        Ok(outcome) => {
            println!("✓ Payment authorized for order {}", ctx.order_id);
            println!("  Gateway order: {}", outcome.gateway_order);
            println!(
                "  Authorization code: {}",
                outcome.authorization_code.as_deref().unwrap_or("-")
            );
            println!("  Transaction: {}", outcome.transaction.id());
            Ok(())
        }
        Err(e) => {
            tracing::warn!(order_id = %ctx.order_id, kind = e.kind(), "payment failed");
            anyhow::bail!("Payment for order {} failed: {}", ctx.order_id, e)
        }
    }
}

pub async fn handle_refund(
    manager: &RedsysApiManager,
    order_id: String,
    amount: i64,
) -> anyhow::Result<()> {
    let ctx = PaymentContext::new(order_id, amount);

    match manager.process_refund(&ctx).await {
        Ok(outcome) => {
            println!("✓ Refund accepted for order {}", ctx.order_id);
            println!("  Gateway order: {}", outcome.gateway_order);
            println!("  Transaction: {}", outcome.transaction.id());
            Ok(())
        }
        Err(e) => {
            tracing::warn!(order_id = %ctx.order_id, kind = e.kind(), "refund failed");
            anyhow::bail!("Refund for order {} failed: {}", ctx.order_id, e)
        }
    }
}

pub async fn handle_tx_list(
    repository: &dyn TransactionRepository,
    from: &str,
    to: &str,
) -> anyhow::Result<()> {
    let start = parse_date(from, false).map_err(anyhow::Error::msg)?;
    let end = parse_date(to, true).map_err(anyhow::Error::msg)?;

    let transactions = repository.list_created_between(start, end).await?;
    for tx in &transactions {
        println!(
            "{}  {}  order={}  amount={}  code={}  auth={}",
            tx.created_at().to_rfc3339(),
            tx.id(),
            tx.order_id(),
            tx.amount(),
            tx.return_code(),
            tx.authorization_code()
        );
    }
    println!("{} transaction(s)", transactions.len());
    Ok(())
}

pub async fn handle_tx_export(
    repository: &dyn TransactionRepository,
    from: &str,
    to: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let start = parse_date(from, false).map_err(anyhow::Error::msg)?;
    let end = parse_date(to, true).map_err(anyhow::Error::msg)?;

    let transactions = repository.list_created_between(start, end).await?;

    match output {
        Some(path) => {
            let file = File::create(&path)?;
            write_transactions_csv(file, &transactions)?;
            tracing::info!(
                count = transactions.len(),
                path = %path.display(),
                "transactions exported"
            );
            println!(
                "✓ Exported {} transaction(s) to {}",
                transactions.len(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            write_transactions_csv(stdout.lock(), &transactions)?;
        }
    }

    Ok(())
}

pub async fn handle_tx_show(repository: &dyn TransactionRepository, tx_id: Uuid) -> anyhow::Result<()> {
    let tx = repository.get_by_id(tx_id).await?;
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &tx)?;
    writeln!(stdout)?;
    Ok(())
}

/// Opens the Postgres store for the `tx` commands. Requires `DATABASE_URL`.
pub async fn open_transaction_store(
    database: &DatabaseConfig,
) -> anyhow::Result<PostgresTransactionRepository> {
    let database_url = database.require_url()?;
    let pool = crate::db::create_pool(database_url).await?;
    Ok(PostgresTransactionRepository::new(pool))
}

pub async fn handle_db_migrate(database: &DatabaseConfig) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(database.require_url()?).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool, &database.migrations_dir).await?;

    println!("✓ Database migrations completed");
    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    crate::redsys::client::normalize_endpoint(&config.redsys.endpoint)?;

    println!("Configuration:");
    println!("  Endpoint: {}", config.redsys.endpoint);
    println!("  Merchant code: {}", config.redsys.merchant_code);
    println!("  Secret key: {}", mask_secret(&config.redsys.secret_key));
    println!("  Terminal: {}", config.redsys.terminal);
    println!("  Currency: {}", config.redsys.currency);
    println!("  Timeout: {}s", config.redsys.timeout_secs);
    match config.database.database_url.as_deref() {
        Some(url) => println!("  Database URL: {}", mask_password(url)),
        None => println!("  Database URL: (not set, transactions kept in memory)"),
    }

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}
