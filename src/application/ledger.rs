//! Ledger mutation.
//!
//! Applies the monetary delta of an admitted [`Operation`] to the three
//! denormalized balance copies (the bank account balance, its card
//! mirror and, when the movement involves a bank's own funds, the bank
//! reserve) as one batched update on the caller's open transaction.
//! The transaction commit is the single atomic write; the card mirror
//! may disagree with the account balance *during* a transaction but
//! never after a commit.

use crate::application::errors::{BankError, EntityKind};
use crate::domain::entities::{Operation, OperationKind};
use crate::domain::value_objects::OperationId;
use crate::infrastructure::ledger_store::LedgerTx;
use crate::infrastructure::operation_log::OperationLog;

/// Applies the balance deltas of an admitted operation.
///
/// Rows are re-read through the transaction so the arithmetic always
/// starts from the isolation-protected current state, including updates
/// staged earlier in the same transaction.
///
/// `touch_reserve` gates the bank-reserve side: it is `true` for
/// cross-bank transfer legs and for every movement against the bank
/// itself (standalone accruals/withdrawals, credit issue and repayment),
/// `false` for same-bank transfer legs, which move funds between two
/// customer accounts only.
///
/// # Errors
///
/// Fails fast with an `EntityIsNull`-class error when any link of the
/// card chain cannot be re-read, and with
/// [`BankError::OperationFailed`] when the operation was never admitted.
pub async fn apply(
    tx: &mut dyn LedgerTx,
    operation: &Operation,
    touch_reserve: bool,
) -> Result<(), BankError> {
    if !operation.is_admitted() {
        return Err(BankError::OperationFailed(format!(
            "operation {} has not been admitted",
            operation.id
        )));
    }

    let mut card = tx
        .find_card_by_user(operation.user_id)
        .await?
        .ok_or(BankError::EntityIsNull(EntityKind::Card))?;
    let mut account = tx
        .find_bank_account(card.bank_account_id)
        .await?
        .ok_or(BankError::EntityIsNull(EntityKind::BankAccount))?;
    let mut bank = tx
        .find_bank(operation.bank_id)
        .await?
        .ok_or(BankError::EntityIsNull(EntityKind::Bank))?;

    let amount = operation.amount;
    let (balance, reserve) = match operation.kind {
        OperationKind::Accrual => (
            account.balance.checked_add(amount),
            bank.reserve.checked_sub(amount),
        ),
        OperationKind::Withdraw => (
            account.balance.checked_sub(amount),
            bank.reserve.checked_add(amount),
        ),
    };
    account.balance = balance.ok_or_else(overflow)?;
    card.amount = account.balance;
    bank.reserve = reserve.ok_or_else(overflow)?;

    tx.update_balances(&account, &card, touch_reserve.then_some(&bank))
        .await?;

    Ok(())
}

/// Retires staged operation documents after the ledger commit.
///
/// Returns `false` when any deletion failed. The ledger mutation is
/// already committed at this point, so a failure is logged and surfaced
/// to the caller but never rolled back; the surviving documents remain
/// visible through the log's orphan inspection.
pub async fn retire(log: &dyn OperationLog, operations: &[OperationId]) -> bool {
    let mut retired = true;
    for id in operations {
        if let Err(error) = log.remove(*id).await {
            tracing::warn!(
                operation = %id,
                error = %error,
                "operation cleanup failed; ledger mutation is already committed"
            );
            retired = false;
        }
    }
    retired
}

fn overflow() -> BankError {
    BankError::OperationFailed("balance arithmetic overflowed".to_string())
}
