//! Standalone account accrual and withdrawal.
//!
//! The single-leg counterparts of the transfer workflow: one
//! caller-built [`Operation`] moving funds between a user's account and
//! their bank's reserve, in its own Repeatable Read transaction. The
//! reserve is always touched here: the bank itself is the counterparty.

use crate::application::admission;
use crate::application::chain::AccountChain;
use crate::application::errors::BankError;
use crate::application::ledger;
use crate::application::workflows::{Receipt, fail, verdict_error};
use crate::domain::entities::{Operation, OperationKind, OperationStatus, User};
use crate::infrastructure::ledger_store::{IsolationLevel, LedgerStore};
use crate::infrastructure::operation_log::OperationLog;

/// Credits `operation.amount` into `user`'s account from their bank's
/// reserve.
pub async fn accrual(
    store: &dyn LedgerStore,
    log: &dyn OperationLog,
    user: &User,
    operation: Operation,
) -> Result<Receipt, BankError> {
    execute(store, log, user, operation, OperationKind::Accrual).await
}

/// Debits `operation.amount` from `user`'s account into their bank's
/// reserve.
pub async fn withdraw(
    store: &dyn LedgerStore,
    log: &dyn OperationLog,
    user: &User,
    operation: Operation,
) -> Result<Receipt, BankError> {
    execute(store, log, user, operation, OperationKind::Withdraw).await
}

/// Runs one admission + mutation round for `operation`.
///
/// The endpoint determines the direction: whatever kind the operation
/// was built with is overwritten by `kind` before admission.
async fn execute(
    store: &dyn LedgerStore,
    log: &dyn OperationLog,
    user: &User,
    mut operation: Operation,
    kind: OperationKind,
) -> Result<Receipt, BankError> {
    if !operation.amount.is_positive() {
        return Err(BankError::OperationFailed(
            "operation amount must be positive".to_string(),
        ));
    }
    if operation.user_id != user.id {
        return Err(BankError::OperationFailed(
            "operation does not reference the calling user".to_string(),
        ));
    }

    let chain = AccountChain::resolve(store, user).await?;
    if operation.bank_id != chain.account.bank_id {
        return Err(BankError::OperationFailed(
            "operation does not reference the user's bank".to_string(),
        ));
    }
    operation.kind = kind;

    let mut tx = store.begin(IsolationLevel::RepeatableRead).await?;

    let verdict = match admission::admit(tx.as_mut(), log, &mut operation).await {
        Ok(verdict) => verdict,
        Err(error) => return Err(fail(tx, log, &[], error).await),
    };
    if verdict != OperationStatus::Ok {
        let available = match kind {
            OperationKind::Accrual => chain.bank.reserve,
            OperationKind::Withdraw => chain.account.balance,
        };
        let error = verdict_error(verdict, operation.amount, available);
        return Err(fail(tx, log, &[], error).await);
    }
    if let Err(error) = ledger::apply(tx.as_mut(), &operation, true).await {
        return Err(fail(tx, log, &[operation.id], error).await);
    }

    let staged = vec![operation.id];
    if let Err(error) = tx.commit().await {
        ledger::retire(log, &staged).await;
        return Err(error.into());
    }

    let log_retired = ledger::retire(log, &staged).await;
    tracing::info!(
        user = %user.id,
        operation = %staged[0],
        kind = ?kind,
        amount = %operation.amount,
        "account operation committed"
    );

    Ok(Receipt {
        operations: staged,
        log_retired,
    })
}
