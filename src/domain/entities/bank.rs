//! Bank entity.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BankId, Money};

/// A bank owning a collection of accounts and issued credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Unique identifier.
    pub id: BankId,
    /// Display name.
    pub name: String,
    /// The bank's own reserve.
    ///
    /// Debited and credited only on cross-bank transfers and on credit
    /// issuance/repayment; same-bank transfers move funds between two
    /// customer accounts without touching it.
    pub reserve: Money,
}

impl Bank {
    /// Creates a new bank with a generated identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, reserve: Money) -> Self {
        Self {
            id: BankId::generate(),
            name: name.into(),
            reserve,
        }
    }
}
