//! Relational ledger store abstraction.
//!
//! The ledger holds the five entity tables (users, cards, bank accounts,
//! banks, credits) with strong referential integrity. All balance
//! mutations happen inside a [`LedgerTx`]: one relational transaction is
//! one unit of mutual exclusion, and concurrency control is delegated
//! entirely to the store's isolation levels.
//!
//! # Design
//!
//! - **Trait-based abstraction**: [`LedgerStore`] allows different
//!   implementations (PostgreSQL for production, in-memory for tests)
//! - **Explicit transactions**: workflows pick the isolation level and
//!   drive commit/rollback themselves
//! - **Per-entity operations**: plain finds/inserts/updates/removes, no
//!   generic repository type threading

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{Bank, BankAccount, Card, Credit, User};
use crate::domain::value_objects::{BankAccountId, BankId, CardId, CreditId, UserId};

/// Errors raised by the relational ledger store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Establishing a connection or pool failed.
    #[error("ledger store connection failed: {0}")]
    Connection(String),
    /// A query, decode or transaction operation failed.
    #[error("ledger store error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(error.to_string())
    }
}

/// Transaction isolation levels supported by the ledger store.
///
/// Transfers run under `RepeatableRead`; credit issuance and repayment
/// run under `Serializable` because they also read aggregate state
/// ("does this user already have a credit") that must not change
/// underneath a concurrent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// The store's default level; used by lifecycle maintenance.
    ReadCommitted,
    /// Row-stable reads for the duration of the transaction.
    RepeatableRead,
    /// Full serializability.
    Serializable,
}

impl IsolationLevel {
    /// The `SET TRANSACTION` statement selecting this level.
    #[must_use]
    pub const fn set_statement(&self) -> &'static str {
        match self {
            Self::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            Self::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            Self::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

/// Handle to the relational ledger store.
///
/// Non-transactional reads serve pre-flight validation; everything that
/// mutates balances goes through [`LedgerStore::begin`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Opens a transaction at the given isolation level.
    async fn begin(&self, isolation: IsolationLevel) -> Result<Box<dyn LedgerTx>, StoreError>;

    /// Looks up a user by id.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Looks up the card owned by a user.
    async fn find_card_by_user(&self, user_id: UserId) -> Result<Option<Card>, StoreError>;

    /// Looks up a bank account by id.
    async fn find_bank_account(&self, id: BankAccountId)
    -> Result<Option<BankAccount>, StoreError>;

    /// Looks up a bank by id.
    async fn find_bank(&self, id: BankId) -> Result<Option<Bank>, StoreError>;

    /// Looks up the credit held by a user, if any.
    async fn find_credit_by_user(&self, user_id: UserId) -> Result<Option<Credit>, StoreError>;

    /// Returns whether a bank account row exists.
    async fn bank_account_exists(&self, id: BankAccountId) -> Result<bool, StoreError>;
}

/// One open relational transaction.
///
/// Reads issued through the transaction observe its isolation level and
/// any updates already staged on it. Dropping the transaction without
/// calling [`LedgerTx::commit`] discards all staged changes.
#[async_trait]
pub trait LedgerTx: Send {
    /// Looks up a user by id.
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Looks up the card owned by a user.
    async fn find_card_by_user(&mut self, user_id: UserId) -> Result<Option<Card>, StoreError>;

    /// Looks up a bank account by id.
    async fn find_bank_account(
        &mut self,
        id: BankAccountId,
    ) -> Result<Option<BankAccount>, StoreError>;

    /// Looks up the bank account owned by a user.
    async fn find_bank_account_by_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<BankAccount>, StoreError>;

    /// Looks up a bank by id.
    async fn find_bank(&mut self, id: BankId) -> Result<Option<Bank>, StoreError>;

    /// Looks up a credit by id.
    async fn find_credit(&mut self, id: CreditId) -> Result<Option<Credit>, StoreError>;

    /// Looks up the credit held by a user, if any.
    async fn find_credit_by_user(&mut self, user_id: UserId) -> Result<Option<Credit>, StoreError>;

    /// Inserts a user row.
    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError>;

    /// Inserts a card row.
    async fn insert_card(&mut self, card: &Card) -> Result<(), StoreError>;

    /// Inserts a bank account row.
    async fn insert_bank_account(&mut self, account: &BankAccount) -> Result<(), StoreError>;

    /// Inserts a bank row.
    async fn insert_bank(&mut self, bank: &Bank) -> Result<(), StoreError>;

    /// Inserts a credit row.
    async fn insert_credit(&mut self, credit: &Credit) -> Result<(), StoreError>;

    /// Stages the balance triple of one funds movement as a single
    /// batched update: the account balance, its card mirror and, when
    /// the bank's own reserve is involved, the bank row.
    async fn update_balances(
        &mut self,
        account: &BankAccount,
        card: &Card,
        bank: Option<&Bank>,
    ) -> Result<(), StoreError>;

    /// Updates a credit row.
    async fn update_credit(&mut self, credit: &Credit) -> Result<(), StoreError>;

    /// Removes a user row.
    async fn remove_user(&mut self, id: UserId) -> Result<(), StoreError>;

    /// Removes a card row.
    async fn remove_card(&mut self, id: CardId) -> Result<(), StoreError>;

    /// Removes a bank account row.
    async fn remove_bank_account(&mut self, id: BankAccountId) -> Result<(), StoreError>;

    /// Removes a credit row.
    async fn remove_credit(&mut self, id: CreditId) -> Result<(), StoreError>;

    /// Commits every staged change atomically.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discards every staged change.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
