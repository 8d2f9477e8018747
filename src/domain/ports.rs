use super::account::{AccountId, Amount, Balance, LedgerAccount};
use super::splitter::SplitterMechanism;
use super::transfer::TransferBatch;
use crate::error::Result;
use async_trait::async_trait;

/// The value-transfer and balance-query primitives of the host ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current balance of `account`; unknown accounts hold nothing.
    async fn balance_of(&self, account: AccountId) -> Result<Balance>;

    /// Credits `account` with newly issued value.
    async fn mint(&self, account: AccountId, amount: Amount) -> Result<()>;

    /// Applies every transfer of `batch`, or none of them.
    async fn apply(&self, batch: &TransferBatch) -> Result<()>;

    /// All accounts the ledger knows about, ordered by account.
    async fn accounts(&self) -> Result<Vec<LedgerAccount>>;
}

/// Durable home of the mechanism's state between runs.
#[async_trait]
pub trait MechanismStore: Send + Sync {
    async fn load(&self) -> Result<Option<SplitterMechanism>>;
    async fn save(&self, mechanism: &SplitterMechanism) -> Result<()>;
}

pub type LedgerBox = Box<dyn Ledger>;
pub type MechanismStoreBox = Box<dyn MechanismStore>;
