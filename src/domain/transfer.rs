use super::account::{AccountId, Amount, Balance};
use crate::error::TransferFailure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single movement of value between two ledger accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
}

impl Transfer {
    pub fn new(from: AccountId, to: AccountId, amount: Amount) -> Self {
        Self { from, to, amount }
    }

    /// The transfer that undoes this one.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            amount: self.amount,
        }
    }
}

/// An ordered group of transfers that the ledger applies all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferBatch {
    transfers: Vec<Transfer>,
}

impl TransferBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transfer: Transfer) {
        self.transfers.push(transfer);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Every account the batch reads or writes.
    pub fn touched_accounts(&self) -> Vec<AccountId> {
        let mut accounts: Vec<AccountId> = self
            .transfers
            .iter()
            .flat_map(|t| [t.from, t.to])
            .collect();
        accounts.sort();
        accounts.dedup();
        accounts
    }

    /// The compensating batch: each transfer inverted, in reverse order.
    pub fn reversed(&self) -> Self {
        Self {
            transfers: self.transfers.iter().rev().map(Transfer::reversed).collect(),
        }
    }

    /// Applies the batch to a working copy of the touched balances.
    ///
    /// Transfers are checked in order, so a payout may spend value credited
    /// by an earlier transfer of the same batch. On failure the working copy
    /// is left partially modified; callers must discard it.
    pub fn apply_on(
        &self,
        balances: &mut BTreeMap<AccountId, Balance>,
    ) -> Result<(), TransferFailure> {
        for transfer in &self.transfers {
            if transfer.to.is_null() {
                return Err(TransferFailure::NullDestination);
            }

            let available = balances.get(&transfer.from).copied().unwrap_or_default();
            let debited =
                available
                    .checked_sub(transfer.amount)
                    .ok_or(TransferFailure::InsufficientFunds {
                        account: transfer.from,
                        available,
                        requested: transfer.amount.into(),
                    })?;
            balances.insert(transfer.from, debited);

            let current = balances.get(&transfer.to).copied().unwrap_or_default();
            let credited = current
                .checked_add(transfer.amount)
                .ok_or(TransferFailure::BalanceOverflow(transfer.to))?;
            balances.insert(transfer.to, credited);
        }
        Ok(())
    }
}

impl FromIterator<Transfer> for TransferBatch {
    fn from_iter<I: IntoIterator<Item = Transfer>>(iter: I) -> Self {
        Self {
            transfers: iter.into_iter().collect(),
        }
    }
}
