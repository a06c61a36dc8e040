//! Test data factories and store probes.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use teller::Teller;
use teller::domain::entities::{Bank, Operation, User};
use teller::domain::value_objects::{Money, OperationId};
use teller::infrastructure::{
    IsolationLevel, LedgerStore, MemoryLedgerStore, MemoryOperationLog, OperationLog,
    OperationLogError,
};

/// One in-memory store pair with a facade over it.
pub struct TestBench {
    pub store: MemoryLedgerStore,
    pub log: MemoryOperationLog,
    pub teller: Teller,
}

impl TestBench {
    pub fn new() -> Self {
        teller::telemetry::init();
        let store = MemoryLedgerStore::new();
        let log = MemoryOperationLog::new();
        let teller = Teller::new(Arc::new(store.clone()), Arc::new(log.clone()));
        Self { store, log, teller }
    }
}

pub async fn seed_bank(store: &MemoryLedgerStore, name: &str, reserve: i64) -> Bank {
    let bank = Bank::new(name, Money::new(reserve));
    let mut tx = store.begin(IsolationLevel::ReadCommitted).await.unwrap();
    tx.insert_bank(&bank).await.unwrap();
    tx.commit().await.unwrap();
    bank
}

pub async fn enroll_user(teller: &Teller, bank: &Bank, name: &str, balance: i64) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    let user = User::new(name, email, 30, "argon2id$stub");
    teller
        .enroll(bank.id, user.clone(), Money::new(balance))
        .await
        .unwrap();
    user
}

pub async fn balance_of(store: &MemoryLedgerStore, user: &User) -> Money {
    let card = store.find_card_by_user(user.id).await.unwrap().unwrap();
    store
        .find_bank_account(card.bank_account_id)
        .await
        .unwrap()
        .unwrap()
        .balance
}

pub async fn card_amount_of(store: &MemoryLedgerStore, user: &User) -> Money {
    store
        .find_card_by_user(user.id)
        .await
        .unwrap()
        .unwrap()
        .amount
}

pub async fn reserve_of(store: &MemoryLedgerStore, bank: &Bank) -> Money {
    store.find_bank(bank.id).await.unwrap().unwrap().reserve
}

/// Operation log double whose deletions always fail, for exercising the
/// "committed but cleanup failed" path.
#[derive(Clone, Default)]
pub struct FailingCleanupLog {
    inner: MemoryOperationLog,
}

impl FailingCleanupLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationLog for FailingCleanupLog {
    async fn insert(&self, operation: &Operation) -> Result<(), OperationLogError> {
        self.inner.insert(operation).await
    }

    async fn contains(&self, id: OperationId) -> Result<bool, OperationLogError> {
        self.inner.contains(id).await
    }

    async fn find(&self, id: OperationId) -> Result<Option<Operation>, OperationLogError> {
        self.inner.find(id).await
    }

    async fn remove(&self, _id: OperationId) -> Result<bool, OperationLogError> {
        Err(OperationLogError::Backend(
            "deletions disabled for this test".to_string(),
        ))
    }

    async fn staged(&self) -> Result<Vec<Operation>, OperationLogError> {
        self.inner.staged().await
    }
}
