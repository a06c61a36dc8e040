//! Synchronous mirror of the async API.
//!
//! Wraps [`crate::Teller`] with a private current-thread runtime so the
//! operations can be driven from non-async callers. Semantics are
//! identical to the async surface; each call blocks until the
//! underlying workflow has committed or failed.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::application::chain::AccountChain;
use crate::application::errors::BankError;
use crate::application::workflows::Receipt;
use crate::domain::entities::{Credit, Operation, User};
use crate::domain::value_objects::{BankId, Money};
use crate::infrastructure::ledger_store::LedgerStore;
use crate::infrastructure::operation_log::OperationLog;

/// Blocking entry point for every banking operation.
pub struct Teller {
    inner: crate::Teller,
    runtime: Runtime,
}

impl Teller {
    /// Creates a blocking facade over the given stores.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the private runtime cannot be built.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        log: Arc<dyn OperationLog>,
    ) -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            inner: crate::Teller::new(store, log),
            runtime,
        })
    }

    /// Transfers `amount` from `from`'s account to `to`'s account.
    pub fn transfer(&self, from: &User, to: &User, amount: Money) -> Result<Receipt, BankError> {
        self.runtime.block_on(self.inner.transfer(from, to, amount))
    }

    /// Issues `credit` to `user` from the issuing bank's reserve.
    pub fn take_credit(&self, user: &User, credit: Credit) -> Result<Receipt, BankError> {
        self.runtime.block_on(self.inner.take_credit(user, credit))
    }

    /// Pays `pay_amount` towards `credit`, clamped to what is owed.
    pub fn pay_credit(
        &self,
        user: &User,
        credit: &Credit,
        pay_amount: Money,
    ) -> Result<Receipt, BankError> {
        self.runtime
            .block_on(self.inner.pay_credit(user, credit, pay_amount))
    }

    /// Credits `operation.amount` into `user`'s account from their
    /// bank's reserve.
    pub fn bank_account_accrual(
        &self,
        user: &User,
        operation: Operation,
    ) -> Result<Receipt, BankError> {
        self.runtime
            .block_on(self.inner.bank_account_accrual(user, operation))
    }

    /// Debits `operation.amount` from `user`'s account into their
    /// bank's reserve.
    pub fn bank_account_withdraw(
        &self,
        user: &User,
        operation: Operation,
    ) -> Result<Receipt, BankError> {
        self.runtime
            .block_on(self.inner.bank_account_withdraw(user, operation))
    }

    /// Enrolls `user` with the bank, opening an account and a card.
    pub fn enroll(
        &self,
        bank_id: BankId,
        user: User,
        opening_balance: Money,
    ) -> Result<AccountChain, BankError> {
        self.runtime
            .block_on(self.inner.enroll(bank_id, user, opening_balance))
    }

    /// Removes `user` together with their card and bank account.
    pub fn offboard(&self, user: &User) -> Result<(), BankError> {
        self.runtime.block_on(self.inner.offboard(user))
    }
}
