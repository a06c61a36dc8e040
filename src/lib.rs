//! Banking ledger core.
//!
//! Account, card, credit and inter-bank transfer operations over a
//! relational ledger store (entities) and a staged operation log
//! (in-flight funds movements). The transactional money-movement core
//! (admission control, ledger mutation, the transfer and credit
//! orchestrators) keeps balances consistent across a user, their card,
//! their bank account and the owning bank despite partial failures.
//!
//! # Architecture
//!
//! - **Domain Layer**: entities, value objects, amortization
//! - **Application Layer**: admission control, ledger mutation, workflows
//! - **Infrastructure Layer**: configuration, PostgreSQL ledger store,
//!   Redis operation log, in-memory implementations for tests
//!
//! # Guarantees
//!
//! - A workflow either commits all of its balance mutations or none:
//!   each one runs inside a single relational transaction (Repeatable
//!   Read for transfers, Serializable for credit flows).
//! - After every commit a card's cached amount equals its account's
//!   balance.
//! - Money is conserved across transfers; only credit issuance and
//!   repayment deliberately move funds between a bank's reserve and a
//!   user's account.
//! - Operation log writes are *not* covered by the relational
//!   transaction: a crash can orphan a staged document, which
//!   [`infrastructure::OperationLog::staged`] exposes for external
//!   recovery.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use teller::Teller;
//! use teller::domain::entities::{Bank, User};
//! use teller::domain::value_objects::Money;
//! use teller::infrastructure::{
//!     IsolationLevel, LedgerStore, MemoryLedgerStore, MemoryOperationLog,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryLedgerStore::new());
//! let teller = Teller::new(store.clone(), Arc::new(MemoryOperationLog::new()));
//!
//! let bank = Bank::new("First National", Money::new(1_000_000));
//! let mut tx = store.begin(IsolationLevel::ReadCommitted).await?;
//! tx.insert_bank(&bank).await?;
//! tx.commit().await?;
//!
//! let alice = User::new("Alice", "alice@example.com", 34, "<hash>");
//! let bob = User::new("Bob", "bob@example.com", 41, "<hash>");
//! teller.enroll(bank.id, alice.clone(), Money::new(10_000)).await?;
//! teller.enroll(bank.id, bob.clone(), Money::new(5_000)).await?;
//!
//! teller.transfer(&alice, &bob, Money::new(3_000)).await?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod blocking;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

mod teller;

pub use application::{AccountChain, BankError, EntityKind, Receipt};
pub use self::teller::Teller;
