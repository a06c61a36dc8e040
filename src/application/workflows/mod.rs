//! Money-movement workflows.
//!
//! Each workflow composes admission control and ledger mutation inside
//! one relational transaction and returns early on the first non-`Ok`
//! step, rolling the transaction back before surfacing the result. No
//! step is retried automatically.

pub mod account;
pub mod credit;
pub mod enroll;
pub mod transfer;

use crate::application::errors::BankError;
use crate::application::ledger;
use crate::domain::entities::OperationStatus;
use crate::domain::value_objects::{Money, OperationId};
use crate::infrastructure::ledger_store::LedgerTx;
use crate::infrastructure::operation_log::OperationLog;

/// Proof of a committed workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The operations that were staged and applied, in order.
    pub operations: Vec<OperationId>,
    /// Whether every staged operation document was retired from the
    /// operation log after the commit.
    ///
    /// `false` means the balance mutations are committed but cleanup
    /// failed; the surviving documents show up in the log's orphan
    /// inspection until an external job removes them.
    pub log_retired: bool,
}

/// Maps a non-`Ok` admission verdict to its result code.
pub(crate) fn verdict_error(
    verdict: OperationStatus,
    requested: Money,
    available: Money,
) -> BankError {
    match verdict {
        OperationStatus::Restricted => BankError::OperationRestricted {
            requested,
            available,
        },
        OperationStatus::Ok | OperationStatus::Error => BankError::AdmissionDenied,
    }
}

/// Aborts a workflow: rolls the transaction back, retires any operation
/// documents staged so far and hands the causing error back.
pub(crate) async fn fail(
    tx: Box<dyn LedgerTx>,
    log: &dyn OperationLog,
    staged: &[OperationId],
    error: BankError,
) -> BankError {
    if let Err(rollback_error) = tx.rollback().await {
        tracing::warn!(error = %rollback_error, "transaction rollback failed");
    }
    ledger::retire(log, staged).await;
    error
}
