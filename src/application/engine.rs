use crate::config::SplitterConfig;
use crate::domain::account::{AccountId, Amount, Balance, LedgerAccount};
use crate::domain::call::Call;
use crate::domain::ports::{LedgerBox, MechanismStoreBox};
use crate::domain::splitter::{Participants, Settlement, SettlementKind, SplitterMechanism, SplitterStatus};
use crate::error::{Result, SplitterError};
use tokio::sync::Mutex;

/// The main entry point for driving the splitter.
///
/// `SplitterEngine` owns the mechanism, the ledger it settles on and the store
/// it is persisted to. Every operation takes the same lock, so calls are
/// applied one at a time and each one either fully commits or leaves the
/// mechanism, the ledger and the store exactly as they were.
pub struct SplitterEngine {
    mechanism: Mutex<SplitterMechanism>,
    ledger: LedgerBox,
    store: MechanismStoreBox,
}

impl SplitterEngine {
    /// Opens the engine, restoring the stored mechanism if one exists.
    ///
    /// # Arguments
    ///
    /// * `config` - Identities and policy used when creating a new mechanism.
    /// * `ledger` - The ledger that settles value transfers.
    /// * `store` - The store holding the mechanism between runs.
    ///
    /// A restored mechanism must belong to the configured administrator and
    /// ledger account.
    pub async fn open(
        config: &SplitterConfig,
        ledger: LedgerBox,
        store: MechanismStoreBox,
    ) -> Result<Self> {
        config.validate()?;

        let mechanism = match store.load().await? {
            Some(existing) => {
                if existing.administrator() != config.administrator
                    || existing.account() != config.mechanism_account
                {
                    return Err(SplitterError::Config(format!(
                        "stored mechanism belongs to administrator {} at account {}",
                        existing.administrator(),
                        existing.account()
                    )));
                }
                if existing.remainder_policy() != config.remainder_policy {
                    tracing::warn!(
                        stored = %existing.remainder_policy(),
                        requested = %config.remainder_policy,
                        "Keeping the remainder policy of the stored mechanism"
                    );
                }
                tracing::info!(
                    administrator = %existing.administrator(),
                    established = existing.is_established(),
                    pending = %existing.pending_balance(),
                    "Restored splitter"
                );
                existing
            }
            None => {
                let created = SplitterMechanism::new(config.administrator, config.mechanism_account)
                    .with_remainder_policy(config.remainder_policy);
                store.save(&created).await?;
                tracing::info!(
                    administrator = %created.administrator(),
                    account = %created.account(),
                    "Created splitter"
                );
                created
            }
        };

        Ok(Self {
            mechanism: Mutex::new(mechanism),
            ledger,
            store,
        })
    }

    /// Dispatches a call to the matching operation.
    pub async fn execute(&self, call: Call) -> Result<()> {
        match call {
            Call::Fund { account, amount } => self.fund(account, amount).await,
            Call::RegisterParticipants {
                caller,
                first,
                second,
            } => self.register_participants(caller, first, second).await,
            Call::Contribute { caller, value } => self.contribute(caller, value).await.map(|_| ()),
            Call::SetActiveState { caller, active } => self.set_active_state(caller, active).await,
            Call::ReleasePending { caller } => self.release_pending(caller).await.map(|_| ()),
        }
    }

    /// Credits an observer account with genesis value on the ledger.
    ///
    /// The mechanism's own account only ever holds the pending pool, so it
    /// cannot be funded.
    pub async fn fund(&self, account: AccountId, amount: Amount) -> Result<()> {
        let mechanism = self.mechanism.lock().await;
        mechanism.ensure_not_reserved(account)?;
        self.ledger.mint(account, amount).await?;
        tracing::debug!(%account, %amount, "Funded account");
        Ok(())
    }

    pub async fn register_participants(
        &self,
        caller: AccountId,
        first: AccountId,
        second: AccountId,
    ) -> Result<()> {
        let mut mechanism = self.mechanism.lock().await;
        let mut next = mechanism.clone();
        next.register_participants(caller, first, second)?;
        self.store.save(&next).await?;
        *mechanism = next;

        tracing::info!(%first, %second, "Participants established");
        Ok(())
    }

    pub async fn set_active_state(&self, caller: AccountId, active: bool) -> Result<()> {
        let mut mechanism = self.mechanism.lock().await;
        let mut next = mechanism.clone();
        next.set_active_state(caller, active)?;
        self.store.save(&next).await?;
        *mechanism = next;

        tracing::info!(active, "Active state changed");
        Ok(())
    }

    /// Contributes `value` from `caller`, settling it on the ledger.
    pub async fn contribute(&self, caller: AccountId, value: u64) -> Result<SettlementKind> {
        let mut mechanism = self.mechanism.lock().await;
        let settlement = mechanism.contribute(caller, value)?;
        self.settle(&mut mechanism, &settlement).await?;

        tracing::info!(
            %caller,
            value,
            kind = ?settlement.kind(),
            pending = %mechanism.pending_balance(),
            "Contribution settled"
        );
        Ok(settlement.kind())
    }

    /// Pays the pending pool out to the participants.
    pub async fn release_pending(&self, caller: AccountId) -> Result<Balance> {
        let mut mechanism = self.mechanism.lock().await;
        let settlement = mechanism.release_pending(caller)?;
        self.settle(&mut mechanism, &settlement).await?;

        let released = settlement.pool_debit().map(Balance::from).unwrap_or_default();
        tracing::info!(
            %released,
            pending = %mechanism.pending_balance(),
            "Pending pool released"
        );
        Ok(released)
    }

    /// Applies a settlement to the ledger and then records it.
    ///
    /// The ledger applies the whole batch or nothing. If the new mechanism
    /// state cannot be persisted afterwards, the reverse batch is applied so
    /// the ledger returns to where it was. Should that fail too, the ledger
    /// is ahead of the stored mechanism and [`SplitterError::Unreconciled`]
    /// is returned.
    async fn settle(&self, mechanism: &mut SplitterMechanism, settlement: &Settlement) -> Result<()> {
        let mut next = mechanism.clone();
        next.commit(settlement)?;

        self.ledger.apply(settlement.transfers()).await?;

        if let Err(persist) = self.store.save(&next).await {
            tracing::warn!(%persist, "Persisting settlement failed, reversing transfers");
            if let Err(reversal) = self.ledger.apply(&settlement.transfers().reversed()).await {
                tracing::error!(%reversal, "Reversing settlement transfers failed");
                return Err(SplitterError::Unreconciled {
                    persist: Box::new(persist),
                    reversal: Box::new(reversal),
                });
            }
            return Err(persist);
        }

        *mechanism = next;
        Ok(())
    }

    pub async fn administrator(&self) -> AccountId {
        self.mechanism.lock().await.administrator()
    }

    pub async fn is_established(&self) -> bool {
        self.mechanism.lock().await.is_established()
    }

    pub async fn is_active(&self) -> bool {
        self.mechanism.lock().await.is_active()
    }

    pub async fn participants(&self) -> Option<Participants> {
        self.mechanism.lock().await.participants().copied()
    }

    pub async fn pending_balance(&self) -> Balance {
        self.mechanism.lock().await.pending_balance()
    }

    pub async fn status(&self) -> SplitterStatus {
        self.mechanism.lock().await.status()
    }

    /// Ledger balance of any account, the mechanism's own included.
    pub async fn balance_of(&self, account: AccountId) -> Result<Balance> {
        self.ledger.balance_of(account).await
    }

    /// Consumes the engine and returns the final state of all ledger accounts.
    pub async fn into_results(self) -> Result<Vec<LedgerAccount>> {
        self.ledger.accounts().await
    }
}
