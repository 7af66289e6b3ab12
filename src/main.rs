use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payvault::application::engine::{PaymentEngine, SettlementConfig};
use payvault::domain::order::{AccountId, Amount, OrderId, TokenId};
use payvault::domain::ports::OrderStoreBox;
use payvault::error::PaymentError;
use payvault::infrastructure::in_memory::{InMemoryEventLog, InMemoryLedger, InMemoryOrderStore};
use payvault::interfaces::csv::operation_reader::{OperationReader, OperationRecord, OperationType};
use payvault::interfaces::csv::order_writer::OrderWriter;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent order storage (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Identity allowed to create orders and withdraw fees
    #[arg(long, default_value_t = 1)]
    owner: AccountId,

    /// Identity receiving payouts and fee sweeps; defaults to the owner
    #[arg(long)]
    operator: Option<AccountId>,

    /// Identity holding escrowed fees between settlement and withdrawal
    #[arg(long, default_value_t = 0)]
    custody: AccountId,

    /// Print the event log as JSON lines after the order report
    #[arg(long)]
    events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SettlementConfig {
        owner: cli.owner,
        operator: cli.operator.unwrap_or(cli.owner),
        custody: cli.custody,
    };

    let ledger = InMemoryLedger::new();
    let event_log = InMemoryEventLog::new();
    let orders = build_order_store(cli.db_path.as_deref())?;
    let engine = PaymentEngine::new(
        config,
        orders,
        Box::new(ledger.clone()),
        Box::new(event_log.clone()),
    );

    // Process operations
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for record in reader.operations() {
        match record {
            Ok(record) => {
                if let Err(e) = apply_operation(&engine, &ledger, record).await {
                    eprintln!("Error processing operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    // Output final state
    let orders = engine.into_orders().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(orders).into_diagnostic()?;

    if cli.events {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for event in event_log.snapshot().await {
            let line = serde_json::to_string(&event).into_diagnostic()?;
            writeln!(out, "{line}").into_diagnostic()?;
        }
    }

    Ok(())
}

async fn apply_operation(
    engine: &PaymentEngine,
    ledger: &InMemoryLedger,
    record: OperationRecord,
) -> payvault::error::Result<()> {
    let token = record.token.as_deref().unwrap_or("");
    match record.op {
        OperationType::Fund => {
            let token = TokenId::new(token)?;
            let amount = Amount::new(record.amount.unwrap_or_default())?;
            ledger.mint(&token, record.account, amount.into()).await;
        }
        OperationType::Create => {
            let order = require_order(&record)?;
            engine
                .create_order(record.account, order, token, record.amount.unwrap_or_default())
                .await?;
        }
        OperationType::Pay => {
            let order = require_order(&record)?;
            engine.pay_order(record.account, &order).await?;
        }
        OperationType::Withdraw => {
            let token = TokenId::new(token)?;
            engine.withdraw_fees(record.account, &token).await?;
        }
    }
    Ok(())
}

fn require_order(record: &OperationRecord) -> payvault::error::Result<OrderId> {
    record
        .order
        .ok_or_else(|| PaymentError::InvalidOperation("missing order id column".to_string()))
}

#[cfg(feature = "storage-rocksdb")]
fn build_order_store(db_path: Option<&Path>) -> Result<OrderStoreBox> {
    use payvault::infrastructure::rocksdb::RocksDBStore;

    Ok(match db_path {
        Some(path) => Box::new(RocksDBStore::open(path).into_diagnostic()?),
        None => Box::new(InMemoryOrderStore::new()),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn build_order_store(db_path: Option<&Path>) -> Result<OrderStoreBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryOrderStore::new()))
}
