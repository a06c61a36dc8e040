//! Result taxonomy for the money-movement workflows.
//!
//! Expected business conditions are signaled as error variants, never as
//! panics: callers must treat any non-`Ok` result as authoritative. A
//! workflow either commits all of its balance mutations or none of them;
//! the only tolerated exception is operation-log cleanup, reported
//! through [`crate::application::workflows::Receipt`] rather than as an
//! error because the ledger commit already stands.

use std::fmt;

use thiserror::Error;

use crate::domain::value_objects::Money;
use crate::infrastructure::ledger_store::StoreError;
use crate::infrastructure::operation_log::OperationLogError;

/// The entity classes referenced by error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A [`crate::domain::entities::User`].
    User,
    /// A [`crate::domain::entities::Card`].
    Card,
    /// A [`crate::domain::entities::BankAccount`].
    BankAccount,
    /// A [`crate::domain::entities::Bank`].
    Bank,
    /// A [`crate::domain::entities::Credit`].
    Credit,
    /// A staged [`crate::domain::entities::Operation`].
    Operation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Card => "card",
            Self::BankAccount => "bank account",
            Self::Bank => "bank",
            Self::Credit => "credit",
            Self::Operation => "operation",
        };
        write!(formatter, "{name}")
    }
}

/// Errors returned by the money-movement workflows.
#[derive(Debug, Error)]
pub enum BankError {
    /// A required object in the user's association chain (card, bank
    /// account, bank) was not supplied or could not be resolved.
    #[error("{0} is missing from the association chain")]
    EntityIsNull(EntityKind),

    /// A referenced id was not found in the ledger.
    #[error("{0} does not exist in the ledger")]
    EntityNotExist(EntityKind),

    /// Admission control rejected the operation: insufficient funds.
    #[error("operation restricted: requested {requested}, available {available}")]
    OperationRestricted {
        /// The amount the operation asked to move.
        requested: Money,
        /// The balance that was actually available.
        available: Money,
    },

    /// A downstream step aborted the flow (duplicate credit, failed
    /// precondition, invalid amount).
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// Admission control rejected the operation: a referenced entity is
    /// missing from the ledger.
    #[error("operation admission denied: a referenced entity is missing")]
    AdmissionDenied,

    /// The relational ledger store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The operation log failed while staging.
    #[error(transparent)]
    OperationLog(#[from] OperationLogError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntityKind::User, "user")]
    #[case(EntityKind::Card, "card")]
    #[case(EntityKind::BankAccount, "bank account")]
    #[case(EntityKind::Bank, "bank")]
    #[case(EntityKind::Credit, "credit")]
    #[case(EntityKind::Operation, "operation")]
    fn entity_kind_display(#[case] kind: EntityKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }

    #[rstest]
    fn restricted_error_reports_amounts() {
        let error = BankError::OperationRestricted {
            requested: Money::new(500),
            available: Money::new(100),
        };

        assert_eq!(
            error.to_string(),
            "operation restricted: requested 500, available 100"
        );
    }

    #[rstest]
    fn bank_error_is_error_trait() {
        fn assert_error<E: std::error::Error>(_: &E) {}

        assert_error(&BankError::AdmissionDenied);
    }
}
