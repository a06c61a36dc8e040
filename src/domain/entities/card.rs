//! Card entity.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BankAccountId, CardId, Money, UserId};

/// A payment card tied to exactly one user and one bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier.
    pub id: CardId,
    /// The owning user.
    pub user_id: UserId,
    /// The backing bank account.
    pub bank_account_id: BankAccountId,
    /// Denormalized mirror of the backing account's balance.
    ///
    /// Refreshed transactionally on every committed mutation, never
    /// written independently. After every commit,
    /// `card.amount == account.balance` holds for the affected card.
    pub amount: Money,
}

impl Card {
    /// Creates a new card with a generated identifier, mirroring the
    /// given opening balance.
    #[must_use]
    pub fn new(user_id: UserId, bank_account_id: BankAccountId, amount: Money) -> Self {
        Self {
            id: CardId::generate(),
            user_id,
            bank_account_id,
            amount,
        }
    }
}
