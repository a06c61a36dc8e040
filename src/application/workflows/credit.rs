//! Credit issuance and repayment workflows.
//!
//! Both run under Serializable isolation, stricter than transfers,
//! because they read aggregate state ("does this user already hold a
//! credit") that must not change underneath a concurrent request, and
//! they mutate a credit row alongside the balance triple.

use crate::application::admission;
use crate::application::chain::AccountChain;
use crate::application::errors::{BankError, EntityKind};
use crate::application::ledger;
use crate::application::workflows::{Receipt, fail, verdict_error};
use crate::domain::amortization;
use crate::domain::entities::{Credit, Operation, OperationStatus, User};
use crate::domain::value_objects::Money;
use crate::infrastructure::ledger_store::{IsolationLevel, LedgerStore};
use crate::infrastructure::operation_log::OperationLog;

/// Issues `credit` to `user`, crediting the user's account from the
/// issuing bank's reserve.
///
/// The total owed is recomputed here by annuity amortization over the
/// credit's dates, so the stored ceiling never depends on what the
/// caller put into `credit.outstanding`. One active credit per user is
/// enforced by lookup inside the transaction, by credit id and by user
/// id alike.
///
/// # Errors
///
/// - `EntityIsNull`/`EntityNotExist` when the user's chain is unresolved
/// - [`BankError::OperationFailed`] when the principal is not positive,
///   the credit is not issued by the user's bank, the amortization term
///   is invalid, or the user already holds a credit
/// - [`BankError::OperationRestricted`] when the bank's reserve cannot
///   cover the principal
pub async fn take_credit(
    store: &dyn LedgerStore,
    log: &dyn OperationLog,
    user: &User,
    credit: Credit,
) -> Result<Receipt, BankError> {
    if !credit.principal.is_positive() {
        return Err(BankError::OperationFailed(
            "credit principal must be positive".to_string(),
        ));
    }

    let chain = AccountChain::resolve(store, user).await?;
    if credit.bank_id != chain.account.bank_id {
        return Err(BankError::OperationFailed(
            "credit must be issued by the bank holding the user's account".to_string(),
        ));
    }

    let mut credit = credit;
    credit.outstanding = amortization::repayment_amount(
        credit.principal,
        credit.interest_rate,
        credit.issued_on,
        credit.due_on,
    )
    .map_err(|error| BankError::OperationFailed(error.to_string()))?;

    let mut tx = store.begin(IsolationLevel::Serializable).await?;

    let duplicate = match tx.find_credit(credit.id).await {
        Ok(found) => found.is_some(),
        Err(error) => return Err(fail(tx, log, &[], error.into()).await),
    };
    let user_has_credit = match tx.find_credit_by_user(user.id).await {
        Ok(found) => found.is_some(),
        Err(error) => return Err(fail(tx, log, &[], error.into()).await),
    };
    if duplicate || user_has_credit {
        let error = BankError::OperationFailed("user already holds an active credit".to_string());
        return Err(fail(tx, log, &[], error).await);
    }

    let mut operation = Operation::accrual(user.id, credit.bank_id, credit.principal);
    let verdict = match admission::admit(tx.as_mut(), log, &mut operation).await {
        Ok(verdict) => verdict,
        Err(error) => return Err(fail(tx, log, &[], error).await),
    };
    if verdict != OperationStatus::Ok {
        let error = verdict_error(verdict, credit.principal, chain.bank.reserve);
        return Err(fail(tx, log, &[], error).await);
    }
    if let Err(error) = ledger::apply(tx.as_mut(), &operation, true).await {
        return Err(fail(tx, log, &[operation.id], error).await);
    }

    // A failed insert rolls the whole transaction back, undoing the
    // accrual that was staged above.
    if let Err(error) = tx.insert_credit(&credit).await {
        return Err(fail(tx, log, &[operation.id], error.into()).await);
    }

    let staged = vec![operation.id];
    if let Err(error) = tx.commit().await {
        ledger::retire(log, &staged).await;
        return Err(error.into());
    }

    let log_retired = ledger::retire(log, &staged).await;
    tracing::info!(
        user = %user.id,
        credit = %credit.id,
        principal = %credit.principal,
        outstanding = %credit.outstanding,
        "credit issued"
    );

    Ok(Receipt {
        operations: staged,
        log_retired,
    })
}

/// Pays `pay_amount` towards `credit`, withdrawing from the user's
/// account into the issuing bank's reserve.
///
/// The payment is clamped to the outstanding amount: the caller cannot
/// overpay past what is owed. A payment that settles the outstanding
/// amount exactly deletes the credit record; anything less decrements
/// it.
///
/// # Errors
///
/// - `EntityIsNull`/`EntityNotExist` when the user's chain is unresolved
///   or no credit matches the id/user pair
/// - [`BankError::OperationFailed`] when `pay_amount` is not positive
/// - [`BankError::OperationRestricted`] when the user's balance cannot
///   cover the (clamped) payment
pub async fn pay_credit(
    store: &dyn LedgerStore,
    log: &dyn OperationLog,
    user: &User,
    credit: &Credit,
    pay_amount: Money,
) -> Result<Receipt, BankError> {
    if !pay_amount.is_positive() {
        return Err(BankError::OperationFailed(
            "payment amount must be positive".to_string(),
        ));
    }

    let chain = AccountChain::resolve(store, user).await?;

    let mut tx = store.begin(IsolationLevel::Serializable).await?;

    let stored = match tx.find_credit(credit.id).await {
        Ok(found) => found.filter(|stored| stored.user_id == user.id),
        Err(error) => return Err(fail(tx, log, &[], error.into()).await),
    };
    let Some(mut stored) = stored else {
        let error = BankError::EntityNotExist(EntityKind::Credit);
        return Err(fail(tx, log, &[], error).await);
    };

    let amount = pay_amount.min(stored.outstanding);

    let mut operation = Operation::withdraw(user.id, stored.bank_id, amount);
    let verdict = match admission::admit(tx.as_mut(), log, &mut operation).await {
        Ok(verdict) => verdict,
        Err(error) => return Err(fail(tx, log, &[], error).await),
    };
    if verdict != OperationStatus::Ok {
        let error = verdict_error(verdict, amount, chain.account.balance);
        return Err(fail(tx, log, &[], error).await);
    }
    if let Err(error) = ledger::apply(tx.as_mut(), &operation, true).await {
        return Err(fail(tx, log, &[operation.id], error).await);
    }

    let settled = amount == stored.outstanding;
    let credit_update = if settled {
        tx.remove_credit(stored.id).await
    } else {
        match stored.outstanding.checked_sub(amount) {
            Some(remaining) => {
                stored.outstanding = remaining;
                tx.update_credit(&stored).await
            }
            None => {
                let error =
                    BankError::OperationFailed("credit arithmetic overflowed".to_string());
                return Err(fail(tx, log, &[operation.id], error).await);
            }
        }
    };
    if let Err(error) = credit_update {
        return Err(fail(tx, log, &[operation.id], error.into()).await);
    }

    let staged = vec![operation.id];
    if let Err(error) = tx.commit().await {
        ledger::retire(log, &staged).await;
        return Err(error.into());
    }

    let log_retired = ledger::retire(log, &staged).await;
    tracing::info!(
        user = %user.id,
        credit = %stored.id,
        %amount,
        settled,
        "credit payment committed"
    );

    Ok(Receipt {
        operations: staged,
        log_retired,
    })
}
