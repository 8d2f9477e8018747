//! Runtime configuration.

use crate::domain::account::AccountId;
use crate::domain::splitter::RemainderPolicy;
use crate::error::{Result, SplitterError};
use std::path::PathBuf;

/// Ledger identity used for the mechanism when none is configured.
pub const DEFAULT_MECHANISM_ACCOUNT: AccountId = AccountId(u32::MAX);

/// Complete splitter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Administrator bound to the mechanism at creation.
    pub administrator: AccountId,

    /// Ledger account holding the mechanism's value.
    pub mechanism_account: AccountId,

    /// Where the odd unit of an administrator contribution goes.
    pub remainder_policy: RemainderPolicy,

    /// Persistent storage location, if any.
    pub db_path: Option<PathBuf>,
}

impl SplitterConfig {
    pub fn new(administrator: AccountId) -> Self {
        Self {
            administrator,
            mechanism_account: DEFAULT_MECHANISM_ACCOUNT,
            remainder_policy: RemainderPolicy::default(),
            db_path: None,
        }
    }

    pub fn with_mechanism_account(mut self, account: AccountId) -> Self {
        self.mechanism_account = account;
        self
    }

    pub fn with_remainder_policy(mut self, policy: RemainderPolicy) -> Self {
        self.remainder_policy = policy;
        self
    }

    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        self.db_path = path;
        self
    }

    /// Rejects identities the ledger could not serve.
    pub fn validate(&self) -> Result<()> {
        if self.administrator.is_null() {
            return Err(SplitterError::Config(
                "administrator cannot be the null account".to_string(),
            ));
        }
        if self.mechanism_account.is_null() {
            return Err(SplitterError::Config(
                "mechanism account cannot be the null account".to_string(),
            ));
        }
        if self.administrator == self.mechanism_account {
            return Err(SplitterError::Config(format!(
                "administrator and mechanism share account {}",
                self.administrator
            )));
        }
        Ok(())
    }
}
