use clap::Parser;
use miette::{IntoDiagnostic, Result};
use splitter::application::engine::SplitterEngine;
use splitter::config::{DEFAULT_MECHANISM_ACCOUNT, SplitterConfig};
use splitter::domain::account::AccountId;
use splitter::domain::ports::{LedgerBox, MechanismStoreBox};
use splitter::domain::splitter::RemainderPolicy;
use splitter::infrastructure::in_memory::{InMemoryLedger, InMemoryMechanismStore};
use splitter::interfaces::csv::account_writer::AccountWriter;
use splitter::interfaces::csv::call_reader::CallReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input calls CSV file
    input: PathBuf,

    /// Administrator account of the splitter
    #[arg(long)]
    admin: u32,

    /// Ledger account that holds the splitter's value
    #[arg(long, default_value_t = DEFAULT_MECHANISM_ACCOUNT.0)]
    mechanism_account: u32,

    /// Where the odd unit of an administrator contribution goes
    #[arg(long, default_value_t = RemainderPolicy::RefundCaller)]
    remainder_policy: RemainderPolicy,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> SplitterConfig {
        SplitterConfig::new(AccountId(self.admin))
            .with_mechanism_account(AccountId(self.mechanism_account))
            .with_remainder_policy(self.remainder_policy)
            .with_db_path(self.db_path.clone())
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_storage(config: &SplitterConfig) -> Result<(LedgerBox, MechanismStoreBox)> {
    use splitter::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = &config.db_path {
        tracing::info!("Data directory: {:?}", db_path);
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        return Ok((Box::new(store.clone()), Box::new(store)));
    }
    Ok(in_memory_storage())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_storage(config: &SplitterConfig) -> Result<(LedgerBox, MechanismStoreBox)> {
    if config.db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_storage())
}

fn in_memory_storage() -> (LedgerBox, MechanismStoreBox) {
    (
        Box::new(InMemoryLedger::new()),
        Box::new(InMemoryMechanismStore::new()),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = cli.config();
    let (ledger, store) = open_storage(&config)?;
    let engine = SplitterEngine::open(&config, ledger, store)
        .await
        .into_diagnostic()?;

    // Process calls
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CallReader::new(file);
    for call_result in reader.calls() {
        match call_result {
            Ok(call) => {
                if let Err(e) = engine.execute(call).await {
                    tracing::warn!(caller = %call.caller(), "Error processing call: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!("Error reading call: {}", e);
            }
        }
    }

    let status = engine.status().await;
    tracing::info!(
        established = status.participants.is_some(),
        active = status.active,
        pending = %status.pending,
        "Final splitter state"
    );

    // Collect final state from engine
    let accounts = engine.into_results().await.into_diagnostic()?;

    // Output final state
    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}
