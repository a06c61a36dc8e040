//! Bank account entity.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BankAccountId, BankId, Money, UserId};

/// Distinguishes customer accounts from a bank's own reserve accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    /// An account owned by a customer.
    Customer,
    /// An account holding a bank's own funds.
    Reserve,
}

/// A bank account belonging to exactly one bank and one user.
///
/// `balance` is the single source of truth for spendable funds; the
/// owning card's `amount` is a projection of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Unique identifier.
    pub id: BankAccountId,
    /// The owning user.
    pub user_id: UserId,
    /// The bank holding the account.
    pub bank_id: BankId,
    /// The actual spendable balance.
    pub balance: Money,
    /// Whether this is a customer account or a bank reserve account.
    pub kind: AccountKind,
}

impl BankAccount {
    /// Creates a new customer account with a generated identifier.
    #[must_use]
    pub fn new(user_id: UserId, bank_id: BankId, balance: Money) -> Self {
        Self {
            id: BankAccountId::generate(),
            user_id,
            bank_id,
            balance,
            kind: AccountKind::Customer,
        }
    }
}
