//! Staged operation records.
//!
//! An [`Operation`] is an ephemeral document describing one funds
//! movement between a user's account and a bank's reserve. It is written
//! to the operation log by admission control before the ledger is
//! mutated and deleted again once the mutation commits. An operation
//! still present in the log after a call has returned is the footprint
//! of a crash mid-transaction and is left for an external recovery job.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BankId, Money, OperationId, UserId};

/// The direction of a funds movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// Credit funds into a bank account from a bank's reserve.
    Accrual,
    /// Debit funds from a bank account into a bank's reserve.
    Withdraw,
}

/// Admission verdict for a staged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    /// All admission checks passed.
    Ok,
    /// Rejected: insufficient funds.
    Restricted,
    /// Rejected: a referenced entity is missing.
    Error,
}

/// One staged funds movement.
///
/// The sender/receiver pair is fully determined by `kind`: an accrual
/// moves `bank -> user`, a withdrawal moves `user -> bank`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique identifier of this staged record.
    pub id: OperationId,
    /// The user side of the movement.
    pub user_id: UserId,
    /// The bank side of the movement.
    pub bank_id: BankId,
    /// The amount to move.
    pub amount: Money,
    /// The direction of the movement.
    pub kind: OperationKind,
    /// Admission verdict. A freshly built operation carries
    /// [`OperationStatus::Error`] until admission control has evaluated
    /// it; only admitted (`Ok`) operations reach the ledger mutator.
    pub status: OperationStatus,
}

impl Operation {
    /// Builds an accrual operation crediting `user_id` from the reserve
    /// of `bank_id`.
    #[must_use]
    pub fn accrual(user_id: UserId, bank_id: BankId, amount: Money) -> Self {
        Self::new(user_id, bank_id, amount, OperationKind::Accrual)
    }

    /// Builds a withdrawal operation debiting `user_id` into the reserve
    /// of `bank_id`.
    #[must_use]
    pub fn withdraw(user_id: UserId, bank_id: BankId, amount: Money) -> Self {
        Self::new(user_id, bank_id, amount, OperationKind::Withdraw)
    }

    fn new(user_id: UserId, bank_id: BankId, amount: Money, kind: OperationKind) -> Self {
        Self {
            id: OperationId::generate(),
            user_id,
            bank_id,
            amount,
            kind,
            status: OperationStatus::Error,
        }
    }

    /// Returns `true` once admission control has admitted the operation.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        self.status == OperationStatus::Ok
    }
}
