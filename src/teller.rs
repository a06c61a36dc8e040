//! The `Teller` facade.
//!
//! Bundles the two store handles and exposes the full operation surface
//! of the library. All methods are async; [`crate::blocking::Teller`]
//! mirrors them for synchronous callers.

use std::sync::Arc;

use crate::application::chain::AccountChain;
use crate::application::errors::BankError;
use crate::application::workflows::{Receipt, account, credit, enroll, transfer};
use crate::domain::entities::{Credit, Operation, User};
use crate::domain::value_objects::{BankId, Money};
use crate::infrastructure::ledger_store::LedgerStore;
use crate::infrastructure::operation_log::OperationLog;

/// Entry point for every banking operation.
///
/// Holds shared handles to the relational ledger store and the
/// operation log; cloning is cheap and clones share the stores.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use teller::Teller;
/// use teller::infrastructure::{MemoryLedgerStore, MemoryOperationLog};
///
/// let teller = Teller::new(
///     Arc::new(MemoryLedgerStore::new()),
///     Arc::new(MemoryOperationLog::new()),
/// );
/// ```
#[derive(Clone)]
pub struct Teller {
    store: Arc<dyn LedgerStore>,
    log: Arc<dyn OperationLog>,
}

impl Teller {
    /// Creates a facade over the given stores.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, log: Arc<dyn OperationLog>) -> Self {
        Self { store, log }
    }

    /// Returns a reference to the ledger store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Returns a reference to the operation log.
    #[must_use]
    pub fn operation_log(&self) -> &Arc<dyn OperationLog> {
        &self.log
    }

    /// Transfers `amount` from `from`'s account to `to`'s account.
    pub async fn transfer(
        &self,
        from: &User,
        to: &User,
        amount: Money,
    ) -> Result<Receipt, BankError> {
        transfer::transfer(self.store.as_ref(), self.log.as_ref(), from, to, amount).await
    }

    /// Issues `credit` to `user` from the issuing bank's reserve.
    pub async fn take_credit(&self, user: &User, credit: Credit) -> Result<Receipt, BankError> {
        credit::take_credit(self.store.as_ref(), self.log.as_ref(), user, credit).await
    }

    /// Pays `pay_amount` towards `credit`, clamped to what is owed.
    pub async fn pay_credit(
        &self,
        user: &User,
        credit: &Credit,
        pay_amount: Money,
    ) -> Result<Receipt, BankError> {
        credit::pay_credit(
            self.store.as_ref(),
            self.log.as_ref(),
            user,
            credit,
            pay_amount,
        )
        .await
    }

    /// Credits `operation.amount` into `user`'s account from their
    /// bank's reserve.
    pub async fn bank_account_accrual(
        &self,
        user: &User,
        operation: Operation,
    ) -> Result<Receipt, BankError> {
        account::accrual(self.store.as_ref(), self.log.as_ref(), user, operation).await
    }

    /// Debits `operation.amount` from `user`'s account into their
    /// bank's reserve.
    pub async fn bank_account_withdraw(
        &self,
        user: &User,
        operation: Operation,
    ) -> Result<Receipt, BankError> {
        account::withdraw(self.store.as_ref(), self.log.as_ref(), user, operation).await
    }

    /// Enrolls `user` with the bank, opening an account and a card.
    pub async fn enroll(
        &self,
        bank_id: BankId,
        user: User,
        opening_balance: Money,
    ) -> Result<AccountChain, BankError> {
        enroll::enroll(self.store.as_ref(), bank_id, user, opening_balance).await
    }

    /// Removes `user` together with their card and bank account.
    pub async fn offboard(&self, user: &User) -> Result<(), BankError> {
        enroll::offboard(self.store.as_ref(), user).await
    }
}
