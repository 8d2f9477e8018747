use splitter::domain::account::{AccountId, Amount, Balance};
use splitter::domain::ports::{LedgerBox, MechanismStoreBox};
use splitter::domain::splitter::SplitterMechanism;
use splitter::domain::transfer::{Transfer, TransferBatch};
use splitter::infrastructure::in_memory::{InMemoryLedger, InMemoryMechanismStore};

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let ledger: LedgerBox = Box::new(InMemoryLedger::new());
    let store: MechanismStoreBox = Box::new(InMemoryMechanismStore::new());

    let mechanism = SplitterMechanism::new(AccountId(1), AccountId(9));

    // Verify Send + Sync by spawning tasks
    let ledger_handle = tokio::spawn(async move {
        ledger
            .mint(AccountId(1), Amount::new(10).unwrap())
            .await
            .unwrap();
        let batch: TransferBatch = [Transfer::new(
            AccountId(1),
            AccountId(2),
            Amount::new(4).unwrap(),
        )]
        .into_iter()
        .collect();
        ledger.apply(&batch).await.unwrap();
        ledger.balance_of(AccountId(2)).await.unwrap()
    });

    let store_handle = tokio::spawn(async move {
        store.save(&mechanism).await.unwrap();
        store.load().await.unwrap().unwrap()
    });

    assert_eq!(ledger_handle.await.unwrap(), Balance::new(4));
    assert_eq!(store_handle.await.unwrap().administrator(), AccountId(1));
}

#[tokio::test]
async fn test_shared_ledger_across_tasks() {
    let ledger = InMemoryLedger::new();

    let handles: Vec<_> = (1..=8u32)
        .map(|i| {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                let boxed: LedgerBox = Box::new(ledger);
                boxed
                    .mint(AccountId(i), Amount::new(u64::from(i)).unwrap())
                    .await
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let accounts = {
        let boxed: LedgerBox = Box::new(ledger);
        boxed.accounts().await.unwrap()
    };
    assert_eq!(accounts.len(), 8);
    assert!(
        accounts
            .iter()
            .all(|a| a.balance == Balance::new(u64::from(a.account.0)))
    );
}
