//! In-memory ledger store.
//!
//! The test and demo vehicle: a process-local implementation of
//! [`LedgerStore`] with real transaction semantics. A transaction takes
//! the store's async mutex for its whole lifetime (serializing writers,
//! which trivially satisfies every isolation level) and works on a
//! scratch copy of the state; commit publishes the scratch, rollback
//! drops it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entities::{Bank, BankAccount, Card, Credit, User};
use crate::domain::value_objects::{BankAccountId, BankId, CardId, CreditId, UserId};
use crate::infrastructure::ledger_store::{IsolationLevel, LedgerStore, LedgerTx, StoreError};

#[derive(Debug, Default, Clone)]
struct LedgerState {
    users: HashMap<UserId, User>,
    cards: HashMap<CardId, Card>,
    accounts: HashMap<BankAccountId, BankAccount>,
    banks: HashMap<BankId, Bank>,
    credits: HashMap<CreditId, Credit>,
}

/// Process-local [`LedgerStore`] implementation.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn begin(&self, _isolation: IsolationLevel) -> Result<Box<dyn LedgerTx>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let scratch = guard.clone();
        Ok(Box::new(MemoryLedgerTx { guard, scratch }))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_card_by_user(&self, user_id: UserId) -> Result<Option<Card>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .cards
            .values()
            .find(|card| card.user_id == user_id)
            .cloned())
    }

    async fn find_bank_account(
        &self,
        id: BankAccountId,
    ) -> Result<Option<BankAccount>, StoreError> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn find_bank(&self, id: BankId) -> Result<Option<Bank>, StoreError> {
        Ok(self.state.lock().await.banks.get(&id).cloned())
    }

    async fn find_credit_by_user(&self, user_id: UserId) -> Result<Option<Credit>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .credits
            .values()
            .find(|credit| credit.user_id == user_id)
            .cloned())
    }

    async fn bank_account_exists(&self, id: BankAccountId) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.accounts.contains_key(&id))
    }
}

struct MemoryLedgerTx {
    guard: OwnedMutexGuard<LedgerState>,
    scratch: LedgerState,
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.scratch.users.get(&id).cloned())
    }

    async fn find_card_by_user(&mut self, user_id: UserId) -> Result<Option<Card>, StoreError> {
        Ok(self
            .scratch
            .cards
            .values()
            .find(|card| card.user_id == user_id)
            .cloned())
    }

    async fn find_bank_account(
        &mut self,
        id: BankAccountId,
    ) -> Result<Option<BankAccount>, StoreError> {
        Ok(self.scratch.accounts.get(&id).cloned())
    }

    async fn find_bank_account_by_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<BankAccount>, StoreError> {
        Ok(self
            .scratch
            .accounts
            .values()
            .find(|account| account.user_id == user_id)
            .cloned())
    }

    async fn find_bank(&mut self, id: BankId) -> Result<Option<Bank>, StoreError> {
        Ok(self.scratch.banks.get(&id).cloned())
    }

    async fn find_credit(&mut self, id: CreditId) -> Result<Option<Credit>, StoreError> {
        Ok(self.scratch.credits.get(&id).cloned())
    }

    async fn find_credit_by_user(&mut self, user_id: UserId) -> Result<Option<Credit>, StoreError> {
        Ok(self
            .scratch
            .credits
            .values()
            .find(|credit| credit.user_id == user_id)
            .cloned())
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        self.scratch.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn insert_card(&mut self, card: &Card) -> Result<(), StoreError> {
        self.scratch.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn insert_bank_account(&mut self, account: &BankAccount) -> Result<(), StoreError> {
        self.scratch.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn insert_bank(&mut self, bank: &Bank) -> Result<(), StoreError> {
        self.scratch.banks.insert(bank.id, bank.clone());
        Ok(())
    }

    async fn insert_credit(&mut self, credit: &Credit) -> Result<(), StoreError> {
        self.scratch.credits.insert(credit.id, credit.clone());
        Ok(())
    }

    async fn update_balances(
        &mut self,
        account: &BankAccount,
        card: &Card,
        bank: Option<&Bank>,
    ) -> Result<(), StoreError> {
        self.scratch.accounts.insert(account.id, account.clone());
        self.scratch.cards.insert(card.id, card.clone());
        if let Some(bank) = bank {
            self.scratch.banks.insert(bank.id, bank.clone());
        }
        Ok(())
    }

    async fn update_credit(&mut self, credit: &Credit) -> Result<(), StoreError> {
        self.scratch.credits.insert(credit.id, credit.clone());
        Ok(())
    }

    async fn remove_user(&mut self, id: UserId) -> Result<(), StoreError> {
        self.scratch.users.remove(&id);
        Ok(())
    }

    async fn remove_card(&mut self, id: CardId) -> Result<(), StoreError> {
        self.scratch.cards.remove(&id);
        Ok(())
    }

    async fn remove_bank_account(&mut self, id: BankAccountId) -> Result<(), StoreError> {
        self.scratch.accounts.remove(&id);
        Ok(())
    }

    async fn remove_credit(&mut self, id: CreditId) -> Result<(), StoreError> {
        self.scratch.credits.remove(&id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { mut guard, scratch } = *self;
        *guard = scratch;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Money;

    #[tokio::test]
    async fn commit_publishes_staged_changes() {
        let store = MemoryLedgerStore::new();
        let bank = Bank::new("First National", Money::new(1_000_000));

        let mut tx = store.begin(IsolationLevel::ReadCommitted).await.unwrap();
        tx.insert_bank(&bank).await.unwrap();
        tx.commit().await.unwrap();

        let found = store.find_bank(bank.id).await.unwrap();
        assert_eq!(found, Some(bank));
    }

    #[tokio::test]
    async fn rollback_discards_staged_changes() {
        let store = MemoryLedgerStore::new();
        let bank = Bank::new("First National", Money::new(1_000_000));

        let mut tx = store.begin(IsolationLevel::ReadCommitted).await.unwrap();
        tx.insert_bank(&bank).await.unwrap();
        tx.rollback().await.unwrap();

        let found = store.find_bank(bank.id).await.unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn transaction_reads_observe_staged_writes() {
        let store = MemoryLedgerStore::new();
        let bank = Bank::new("First National", Money::new(1_000_000));

        let mut tx = store.begin(IsolationLevel::RepeatableRead).await.unwrap();
        tx.insert_bank(&bank).await.unwrap();
        let found = tx.find_bank(bank.id).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(found, Some(bank));
    }

    #[tokio::test]
    async fn dropped_transaction_discards_staged_changes() {
        let store = MemoryLedgerStore::new();
        let bank = Bank::new("First National", Money::new(1_000_000));

        {
            let mut tx = store.begin(IsolationLevel::ReadCommitted).await.unwrap();
            tx.insert_bank(&bank).await.unwrap();
        }

        let found = store.find_bank(bank.id).await.unwrap();
        assert_eq!(found, None);
    }
}
