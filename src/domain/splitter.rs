use super::account::{AccountId, Amount, Balance};
use super::transfer::{Transfer, TransferBatch};
use crate::error::{Result, SplitterError, StateViolation, TransferFailure, ValueViolation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two accounts that receive every administrator contribution, in
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    first: AccountId,
    second: AccountId,
}

impl Participants {
    pub fn new(first: AccountId, second: AccountId) -> Result<Self> {
        if first.is_null() || second.is_null() {
            return Err(ValueViolation::NullParticipant.into());
        }
        if first == second {
            return Err(ValueViolation::DuplicateParticipant(first).into());
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> AccountId {
        self.first
    }

    pub fn second(&self) -> AccountId {
        self.second
    }
}

/// Participant registry. Moves from `Unestablished` to `Established` once
/// and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    #[default]
    Unestablished,
    Established(Participants),
}

impl Registry {
    pub fn is_established(&self) -> bool {
        matches!(self, Registry::Established(_))
    }

    pub fn participants(&self) -> Option<&Participants> {
        match self {
            Registry::Established(participants) => Some(participants),
            Registry::Unestablished => None,
        }
    }
}

/// Value contributed by non-administrator accounts, held by the mechanism
/// until the administrator releases it to the participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingPool {
    balance: Balance,
}

impl PendingPool {
    pub fn balance(&self) -> Balance {
        self.balance
    }

    fn credit(&mut self, amount: Amount, account: AccountId) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(TransferFailure::BalanceOverflow(account))?;
        Ok(())
    }

    fn debit(&mut self, amount: Amount, account: AccountId) -> Result<()> {
        self.balance =
            self.balance
                .checked_sub(amount)
                .ok_or(TransferFailure::InsufficientFunds {
                    account,
                    available: self.balance,
                    requested: amount.into(),
                })?;
        Ok(())
    }
}

/// Where the unit left over by halving an odd administrator contribution
/// goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemainderPolicy {
    /// Sent back to the contributing administrator in the same batch.
    #[default]
    RefundCaller,
    /// Kept in the pending pool.
    RetainInPool,
    /// Added to the first participant's share.
    FirstParticipant,
}

impl FromStr for RemainderPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "refund-caller" => Ok(Self::RefundCaller),
            "retain-in-pool" => Ok(Self::RetainInPool),
            "first-participant" => Ok(Self::FirstParticipant),
            other => Err(format!(
                "unknown remainder policy '{other}' \
                 (expected refund-caller, retain-in-pool or first-participant)"
            )),
        }
    }
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RefundCaller => "refund-caller",
            Self::RetainInPool => "retain-in-pool",
            Self::FirstParticipant => "first-participant",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementKind {
    /// External contribution added to the pending pool.
    Hold,
    /// Administrator contribution forwarded to both participants.
    Split,
    /// Pending pool paid out to both participants.
    Release,
}

/// The validated effect of a value-moving operation.
///
/// Produced without touching any state: the ledger applies `transfers`
/// atomically, and only then does [`SplitterMechanism::commit`] record the
/// pool movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    kind: SettlementKind,
    transfers: TransferBatch,
    pool_credit: Option<Amount>,
    pool_debit: Option<Amount>,
}

impl Settlement {
    pub fn kind(&self) -> SettlementKind {
        self.kind
    }

    pub fn transfers(&self) -> &TransferBatch {
        &self.transfers
    }

    pub fn pool_credit(&self) -> Option<Amount> {
        self.pool_credit
    }

    pub fn pool_debit(&self) -> Option<Amount> {
        self.pool_debit
    }
}

/// Read-only snapshot of the mechanism for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterStatus {
    pub administrator: AccountId,
    pub account: AccountId,
    pub participants: Option<Participants>,
    pub pending: Balance,
    pub active: bool,
    pub remainder_policy: RemainderPolicy,
}

/// Two-participant splitter state machine.
///
/// The administrator is bound at creation and never changes. Contributions
/// from the administrator are halved and forwarded to the registered
/// participants; contributions from anyone else accumulate in the pending
/// pool.
///
/// While inactive, contributions, registration and releases are rejected with
/// [`StateViolation::Inactive`]. Toggling the flag and queries always work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterMechanism {
    administrator: AccountId,
    account: AccountId,
    registry: Registry,
    pending: PendingPool,
    active: bool,
    remainder_policy: RemainderPolicy,
}

impl SplitterMechanism {
    /// Creates an active mechanism with an empty registry.
    ///
    /// `account` is the ledger identity that receives the value attached to
    /// contributions.
    pub fn new(administrator: AccountId, account: AccountId) -> Self {
        Self {
            administrator,
            account,
            registry: Registry::Unestablished,
            pending: PendingPool::default(),
            active: true,
            remainder_policy: RemainderPolicy::default(),
        }
    }

    pub fn with_remainder_policy(mut self, policy: RemainderPolicy) -> Self {
        self.remainder_policy = policy;
        self
    }

    pub fn administrator(&self) -> AccountId {
        self.administrator
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn is_established(&self) -> bool {
        self.registry.is_established()
    }

    pub fn participants(&self) -> Option<&Participants> {
        self.registry.participants()
    }

    pub fn pending_balance(&self) -> Balance {
        self.pending.balance()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remainder_policy(&self) -> RemainderPolicy {
        self.remainder_policy
    }

    pub fn status(&self) -> SplitterStatus {
        SplitterStatus {
            administrator: self.administrator,
            account: self.account,
            participants: self.participants().copied(),
            pending: self.pending.balance(),
            active: self.active,
            remainder_policy: self.remainder_policy,
        }
    }

    /// Establishes the registry with `first` and `second`, in that order.
    ///
    /// Registration is one-shot: once established, every further attempt is
    /// a state error whoever the caller is.
    pub fn register_participants(
        &mut self,
        caller: AccountId,
        first: AccountId,
        second: AccountId,
    ) -> Result<()> {
        if self.registry.is_established() {
            return Err(StateViolation::AlreadyEstablished.into());
        }
        self.ensure_administrator(caller)?;
        self.ensure_active()?;

        let participants = Participants::new(first, second)?;
        self.ensure_not_reserved(first)?;
        self.ensure_not_reserved(second)?;
        self.registry = Registry::Established(participants);
        Ok(())
    }

    pub fn set_active_state(&mut self, caller: AccountId, active: bool) -> Result<()> {
        self.ensure_administrator(caller)?;
        self.active = active;
        Ok(())
    }

    /// Plans a contribution of `value` paid by `caller`.
    ///
    /// The mechanism's own account cannot contribute: a self-transfer moves
    /// no value, so nothing would back the pool credit.
    pub fn contribute(&self, caller: AccountId, value: u64) -> Result<Settlement> {
        let amount = Amount::new(value)?;
        self.ensure_not_reserved(caller)?;
        self.ensure_active()?;

        let deposit = Transfer::new(caller, self.account, amount);
        if caller != self.administrator {
            return Ok(Settlement {
                kind: SettlementKind::Hold,
                transfers: [deposit].into_iter().collect(),
                pool_credit: Some(amount),
                pool_debit: None,
            });
        }

        let participants = *self
            .registry
            .participants()
            .ok_or(StateViolation::NotEstablished)?;

        let (share, remainder) = amount.halve();
        let mut first_share = share;
        let mut refund = None;
        let mut pool_credit = None;
        if let Some(remainder) = remainder {
            match self.remainder_policy {
                RemainderPolicy::RefundCaller => refund = Some(remainder),
                RemainderPolicy::RetainInPool => pool_credit = Some(remainder),
                RemainderPolicy::FirstParticipant => {
                    let total = share.map_or(0, |s| s.value()) + remainder.value();
                    first_share = Some(Amount::new(total)?);
                }
            }
        }

        let mut transfers = TransferBatch::new();
        transfers.push(deposit);
        self.push_payout(&mut transfers, participants.first(), first_share);
        self.push_payout(&mut transfers, participants.second(), share);
        self.push_payout(&mut transfers, caller, refund);

        Ok(Settlement {
            kind: SettlementKind::Split,
            transfers,
            pool_credit,
            pool_debit: None,
        })
    }

    /// Plans paying the pending pool out to the participants in equal
    /// shares. An odd unit stays in the pool.
    pub fn release_pending(&self, caller: AccountId) -> Result<Settlement> {
        self.ensure_administrator(caller)?;
        self.ensure_active()?;
        let participants = *self
            .registry
            .participants()
            .ok_or(StateViolation::NotEstablished)?;

        let pool = self.pending.balance();
        let share = Amount::new(pool.value() / 2)
            .map_err(|_| StateViolation::NothingToRelease(pool))?;
        let released = Amount::new(share.value() * 2)?;

        let mut transfers = TransferBatch::new();
        self.push_payout(&mut transfers, participants.first(), Some(share));
        self.push_payout(&mut transfers, participants.second(), Some(share));

        Ok(Settlement {
            kind: SettlementKind::Release,
            transfers,
            pool_credit: None,
            pool_debit: Some(released),
        })
    }

    /// Records the pool movement of a settlement the ledger has applied.
    pub fn commit(&mut self, settlement: &Settlement) -> Result<()> {
        let mut pending = self.pending;
        if let Some(credit) = settlement.pool_credit {
            pending.credit(credit, self.account)?;
        }
        if let Some(debit) = settlement.pool_debit {
            pending.debit(debit, self.account)?;
        }
        self.pending = pending;
        Ok(())
    }

    fn push_payout(&self, transfers: &mut TransferBatch, to: AccountId, amount: Option<Amount>) {
        if let Some(amount) = amount {
            transfers.push(Transfer::new(self.account, to, amount));
        }
    }

    fn ensure_administrator(&self, caller: AccountId) -> Result<()> {
        if caller == self.administrator {
            Ok(())
        } else {
            Err(SplitterError::Authorization { caller })
        }
    }

    /// Rejects the mechanism's own ledger account where an outside account
    /// is expected.
    pub fn ensure_not_reserved(&self, account: AccountId) -> Result<()> {
        if account == self.account {
            Err(ValueViolation::ReservedAccount(account).into())
        } else {
            Ok(())
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(StateViolation::Inactive.into())
        }
    }
}
