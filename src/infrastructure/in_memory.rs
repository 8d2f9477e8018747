use crate::domain::account::{AccountId, Amount, Balance, LedgerAccount};
use crate::domain::ports::{Ledger, MechanismStore};
use crate::domain::splitter::SplitterMechanism;
use crate::domain::transfer::TransferBatch;
use crate::error::{Result, TransferFailure};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory ledger.
///
/// Uses `Arc<RwLock<HashMap<AccountId, Balance>>>` to allow shared concurrent access.
/// Batches are applied to a scratch copy of the touched balances while the write
/// lock is held, and written back only if every transfer succeeds.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    balances: Arc<RwLock<HashMap<AccountId, Balance>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn balance_of(&self, account: AccountId) -> Result<Balance> {
        let balances = self.balances.read().await;
        Ok(balances.get(&account).copied().unwrap_or_default())
    }

    async fn mint(&self, account: AccountId, amount: Amount) -> Result<()> {
        if account.is_null() {
            return Err(TransferFailure::NullDestination.into());
        }
        let mut balances = self.balances.write().await;
        let current = balances.get(&account).copied().unwrap_or_default();
        let credited = current
            .checked_add(amount)
            .ok_or(TransferFailure::BalanceOverflow(account))?;
        balances.insert(account, credited);
        Ok(())
    }

    async fn apply(&self, batch: &TransferBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut balances = self.balances.write().await;
        let mut scratch: BTreeMap<AccountId, Balance> = batch
            .touched_accounts()
            .into_iter()
            .map(|account| (account, balances.get(&account).copied().unwrap_or_default()))
            .collect();

        batch.apply_on(&mut scratch)?;
        balances.extend(scratch);
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<LedgerAccount>> {
        let balances = self.balances.read().await;
        let mut accounts: Vec<LedgerAccount> = balances
            .iter()
            .map(|(account, balance)| LedgerAccount::new(*account, *balance))
            .collect();
        accounts.sort_by_key(|a| a.account);
        Ok(accounts)
    }
}

/// Keeps the mechanism snapshot in memory for the lifetime of the process.
#[derive(Default, Clone)]
pub struct InMemoryMechanismStore {
    snapshot: Arc<RwLock<Option<SplitterMechanism>>>,
}

impl InMemoryMechanismStore {
    /// Creates a new, empty in-memory mechanism store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MechanismStore for InMemoryMechanismStore {
    async fn load(&self) -> Result<Option<SplitterMechanism>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.clone())
    }

    async fn save(&self, mechanism: &SplitterMechanism) -> Result<()> {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Some(mechanism.clone());
        Ok(())
    }
}
