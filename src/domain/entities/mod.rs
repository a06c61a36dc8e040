//! Ledger entities.
//!
//! Plain structs, one per relational table, linked by typed ids rather
//! than object references. Cross-bank decisions compare `BankId`s.

mod bank;
mod bank_account;
mod card;
mod credit;
mod operation;
mod user;

pub use bank::Bank;
pub use bank_account::{AccountKind, BankAccount};
pub use card::Card;
pub use credit::Credit;
pub use operation::{Operation, OperationKind, OperationStatus};
pub use user::User;
