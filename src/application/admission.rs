//! Operation admission control.
//!
//! Decides whether a proposed [`Operation`] may proceed and stages it in
//! the operation log only if admitted. Checks run in a fixed order
//! against reads issued through the caller's open transaction, so the
//! verdict observes the transaction's isolation level:
//!
//! 1. the referenced bank must exist;
//! 2. for an accrual, the receiving user must exist and the sending
//!    bank's reserve must cover the amount;
//! 3. for a withdrawal, the sending user must exist and their bank
//!    account balance must cover the amount.
//!
//! Staging the admitted document happens outside the relational
//! transaction; this is a deliberate boundary crossing between the two
//! stores.

use crate::application::errors::BankError;
use crate::domain::entities::{Operation, OperationKind, OperationStatus};
use crate::infrastructure::ledger_store::LedgerTx;
use crate::infrastructure::operation_log::OperationLog;

/// Validates `operation` and stages it in `log` when admitted.
///
/// The verdict is written into `operation.status` and returned. Only an
/// [`OperationStatus::Ok`] operation is inserted into the log; rejected
/// operations leave no trace there.
///
/// # Errors
///
/// Returns [`BankError::OperationFailed`] when an operation with the
/// same id is already staged (no duplicate staging), and propagates
/// store and log failures.
pub async fn admit(
    tx: &mut dyn LedgerTx,
    log: &dyn OperationLog,
    operation: &mut Operation,
) -> Result<OperationStatus, BankError> {
    if log.contains(operation.id).await? {
        return Err(BankError::OperationFailed(format!(
            "operation {} is already staged",
            operation.id
        )));
    }

    let verdict = evaluate(tx, operation).await?;
    operation.status = verdict;

    if verdict == OperationStatus::Ok {
        log.insert(operation).await?;
    }

    Ok(verdict)
}

async fn evaluate(
    tx: &mut dyn LedgerTx,
    operation: &Operation,
) -> Result<OperationStatus, BankError> {
    let Some(bank) = tx.find_bank(operation.bank_id).await? else {
        return Ok(OperationStatus::Error);
    };
    if tx.find_user(operation.user_id).await?.is_none() {
        return Ok(OperationStatus::Error);
    }

    match operation.kind {
        // The sender is the bank: its reserve must cover the amount.
        OperationKind::Accrual => {
            if bank.reserve < operation.amount {
                return Ok(OperationStatus::Restricted);
            }
        }
        // The sender is the user: their account must cover the amount.
        OperationKind::Withdraw => {
            let Some(card) = tx.find_card_by_user(operation.user_id).await? else {
                return Ok(OperationStatus::Error);
            };
            let Some(account) = tx.find_bank_account(card.bank_account_id).await? else {
                return Ok(OperationStatus::Error);
            };
            if account.balance < operation.amount {
                return Ok(OperationStatus::Restricted);
            }
        }
    }

    Ok(OperationStatus::Ok)
}
