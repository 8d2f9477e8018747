use super::account::{AccountId, Amount};
use serde::{Deserialize, Serialize};

/// An operation submitted to the splitter by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    /// Genesis credit of an observer account. Not an operation of the
    /// mechanism itself.
    Fund { account: AccountId, amount: Amount },
    RegisterParticipants {
        caller: AccountId,
        first: AccountId,
        second: AccountId,
    },
    /// `value` is unvalidated so that a zero contribution reaches the
    /// mechanism and is rejected there.
    Contribute { caller: AccountId, value: u64 },
    SetActiveState { caller: AccountId, active: bool },
    ReleasePending { caller: AccountId },
}

impl Call {
    pub fn caller(&self) -> AccountId {
        match self {
            Call::Fund { account, .. } => *account,
            Call::RegisterParticipants { caller, .. }
            | Call::Contribute { caller, .. }
            | Call::SetActiveState { caller, .. }
            | Call::ReleasePending { caller } => *caller,
        }
    }
}
