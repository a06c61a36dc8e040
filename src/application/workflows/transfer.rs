//! Inter-account transfer workflow.
//!
//! Moves funds from one user's account to another's inside a single
//! Repeatable Read transaction:
//!
//! 1. resolve both account chains and validate the amount; no
//!    transaction is opened when either fails;
//! 2. confirm both bank accounts are persisted rows, defending against
//!    transfers for not-yet-stored accounts;
//! 3. decide whether the transfer crosses banks by comparing the two
//!    accounts' bank ids;
//! 4. withdraw from the sender (admission + mutation);
//! 5. accrue to the receiver (admission + mutation);
//! 6. commit and retire the staged operation documents.
//!
//! Only a cross-bank transfer touches the banks' own reserves: the
//! sender's bank takes the amount in, the receiver's bank pays it out,
//! so both customer accounts and both reserves balance to net zero. A
//! same-bank transfer moves funds between two customer accounts and the
//! reserve stays untouched.
//!
//! A transfer from an account to itself executes both legs and nets to
//! zero; the pass-through is deliberate and is not short-circuited.

use crate::application::admission;
use crate::application::chain::AccountChain;
use crate::application::errors::{BankError, EntityKind};
use crate::application::ledger;
use crate::application::workflows::{Receipt, fail, verdict_error};
use crate::domain::entities::{Operation, OperationStatus, User};
use crate::domain::value_objects::Money;
use crate::infrastructure::ledger_store::{IsolationLevel, LedgerStore};
use crate::infrastructure::operation_log::OperationLog;

/// Transfers `amount` from `from`'s account to `to`'s account.
///
/// # Errors
///
/// - [`BankError::OperationFailed`] when `amount` is not positive
/// - `EntityIsNull`/`EntityNotExist` when either chain is unresolved
/// - [`BankError::OperationRestricted`] when the sender cannot cover
///   the amount
/// - [`BankError::AdmissionDenied`] when a referenced entity vanished
///   between resolution and admission
pub async fn transfer(
    store: &dyn LedgerStore,
    log: &dyn OperationLog,
    from: &User,
    to: &User,
    amount: Money,
) -> Result<Receipt, BankError> {
    if !amount.is_positive() {
        return Err(BankError::OperationFailed(
            "transfer amount must be positive".to_string(),
        ));
    }

    let sender = AccountChain::resolve(store, from).await?;
    let receiver = AccountChain::resolve(store, to).await?;
    for account_id in [sender.account.id, receiver.account.id] {
        if !store.bank_account_exists(account_id).await? {
            return Err(BankError::EntityNotExist(EntityKind::BankAccount));
        }
    }
    let cross_bank = sender.account.bank_id != receiver.account.bank_id;

    let mut tx = store.begin(IsolationLevel::RepeatableRead).await?;

    // Withdraw leg: sender account -> (sender bank reserve, cross-bank only).
    let mut withdrawal = Operation::withdraw(sender.user.id, sender.bank.id, amount);
    let verdict = match admission::admit(tx.as_mut(), log, &mut withdrawal).await {
        Ok(verdict) => verdict,
        Err(error) => return Err(fail(tx, log, &[], error).await),
    };
    if verdict != OperationStatus::Ok {
        let error = verdict_error(verdict, amount, sender.account.balance);
        return Err(fail(tx, log, &[], error).await);
    }
    if let Err(error) = ledger::apply(tx.as_mut(), &withdrawal, cross_bank).await {
        return Err(fail(tx, log, &[withdrawal.id], error).await);
    }

    // Accrual leg: (receiver bank reserve, cross-bank only) -> receiver account.
    let mut accrual = Operation::accrual(receiver.user.id, receiver.bank.id, amount);
    let verdict = match admission::admit(tx.as_mut(), log, &mut accrual).await {
        Ok(verdict) => verdict,
        Err(error) => return Err(fail(tx, log, &[withdrawal.id], error).await),
    };
    if verdict != OperationStatus::Ok {
        let error = verdict_error(verdict, amount, receiver.bank.reserve);
        return Err(fail(tx, log, &[withdrawal.id], error).await);
    }
    if let Err(error) = ledger::apply(tx.as_mut(), &accrual, cross_bank).await {
        return Err(fail(tx, log, &[withdrawal.id, accrual.id], error).await);
    }

    let staged = vec![withdrawal.id, accrual.id];
    if let Err(error) = tx.commit().await {
        ledger::retire(log, &staged).await;
        return Err(error.into());
    }

    let log_retired = ledger::retire(log, &staged).await;
    tracing::info!(
        from = %from.id,
        to = %to.id,
        %amount,
        cross_bank,
        "transfer committed"
    );

    Ok(Receipt {
        operations: staged,
        log_retired,
    })
}
