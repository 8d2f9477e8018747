use crate::domain::account::{AccountId, Amount, Balance, LedgerAccount};
use crate::domain::ports::{Ledger, MechanismStore};
use crate::domain::splitter::SplitterMechanism;
use crate::domain::transfer::TransferBatch;
use crate::error::{Result, SplitterError, TransferFailure};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing ledger balances.
pub const CF_BALANCES: &str = "balances";
/// Column Family for storing the mechanism snapshot.
pub const CF_MECHANISM: &str = "mechanism";

const MECHANISM_KEY: &[u8] = b"splitter";

/// A persistent store implementation using RocksDB.
///
/// Serves as both the ledger and the mechanism store, using separate Column
/// Families. Transfer batches are committed through a single `WriteBatch`, so a
/// batch is either fully persisted or not at all.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    // Serializes read-modify-write cycles on balances.
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("balances" and "mechanism") exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_balances = ColumnFamilyDescriptor::new(CF_BALANCES, Options::default());
        let cf_mechanism = ColumnFamilyDescriptor::new(CF_MECHANISM, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_balances, cf_mechanism])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            SplitterError::internal(std::io::Error::other(format!(
                "{} column family not found",
                name
            )))
        })
    }

    fn read_balance(&self, cf: &ColumnFamily, account: AccountId) -> Result<Balance> {
        match self.db.get_pinned_cf(cf, account.0.to_be_bytes())? {
            Some(bytes) => decode_balance(&bytes),
            None => Ok(Balance::ZERO),
        }
    }
}

fn decode_balance(bytes: &[u8]) -> Result<Balance> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| {
        SplitterError::internal(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Corrupt balance entry of {} bytes", bytes.len()),
        ))
    })?;
    Ok(Balance::new(u64::from_be_bytes(raw)))
}

fn decode_account(bytes: &[u8]) -> Result<AccountId> {
    let raw: [u8; 4] = bytes.try_into().map_err(|_| {
        SplitterError::internal(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Corrupt account key of {} bytes", bytes.len()),
        ))
    })?;
    Ok(AccountId(u32::from_be_bytes(raw)))
}

#[async_trait]
impl Ledger for RocksDBStore {
    async fn balance_of(&self, account: AccountId) -> Result<Balance> {
        let cf = self.cf(CF_BALANCES)?;
        self.read_balance(cf, account)
    }

    async fn mint(&self, account: AccountId, amount: Amount) -> Result<()> {
        if account.is_null() {
            return Err(TransferFailure::NullDestination.into());
        }
        let _guard = self.write_lock.lock().await;
        let cf = self.cf(CF_BALANCES)?;

        let credited = self
            .read_balance(cf, account)?
            .checked_add(amount)
            .ok_or(TransferFailure::BalanceOverflow(account))?;
        self.db
            .put_cf(cf, account.0.to_be_bytes(), credited.value().to_be_bytes())?;
        Ok(())
    }

    async fn apply(&self, batch: &TransferBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let cf = self.cf(CF_BALANCES)?;

        let mut scratch = BTreeMap::new();
        for account in batch.touched_accounts() {
            scratch.insert(account, self.read_balance(cf, account)?);
        }
        batch.apply_on(&mut scratch)?;

        let mut write = WriteBatch::default();
        for (account, balance) in scratch {
            write.put_cf(cf, account.0.to_be_bytes(), balance.value().to_be_bytes());
        }
        self.db.write(write)?;
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<LedgerAccount>> {
        let cf = self.cf(CF_BALANCES)?;

        let mut accounts = Vec::new();
        // Big-endian keys iterate in account order.
        let iter = self.db.iterator_cf(cf, rocksdb::IteratorMode::Start);
        for item in iter {
            let (key, value) = item?;
            accounts.push(LedgerAccount::new(
                decode_account(&key)?,
                decode_balance(&value)?,
            ));
        }

        Ok(accounts)
    }
}

#[async_trait]
impl MechanismStore for RocksDBStore {
    async fn load(&self) -> Result<Option<SplitterMechanism>> {
        let cf = self.cf(CF_MECHANISM)?;

        match self.db.get_cf(cf, MECHANISM_KEY)? {
            Some(bytes) => {
                let mechanism = serde_json::from_slice(&bytes).map_err(|e| {
                    SplitterError::internal(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Deserialization error: {}", e),
                    ))
                })?;
                Ok(Some(mechanism))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, mechanism: &SplitterMechanism) -> Result<()> {
        let cf = self.cf(CF_MECHANISM)?;

        let value = serde_json::to_vec(mechanism).map_err(|e| {
            SplitterError::internal(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            ))
        })?;
        self.db.put_cf(cf, MECHANISM_KEY, value)?;

        Ok(())
    }
}
