//! Account lifecycle: enrollment and offboarding.
//!
//! Enrollment creates the full User + BankAccount + Card chain in one
//! transaction, with the card mirror initialized to the opening balance.
//! Offboarding removes the chain in dependency order (card and account
//! before the user) and refuses while a credit is outstanding.

use crate::application::chain::AccountChain;
use crate::application::errors::{BankError, EntityKind};
use crate::domain::entities::{BankAccount, Card, User};
use crate::domain::value_objects::{BankId, Money};
use crate::infrastructure::ledger_store::{IsolationLevel, LedgerStore};

/// Enrolls `user` with `bank`, opening a bank account and a card.
///
/// # Errors
///
/// - [`BankError::EntityNotExist`] when the bank is unknown
/// - [`BankError::OperationFailed`] when the opening balance is
///   negative or the user is already enrolled
pub async fn enroll(
    store: &dyn LedgerStore,
    bank_id: BankId,
    user: User,
    opening_balance: Money,
) -> Result<AccountChain, BankError> {
    if opening_balance < Money::zero() {
        return Err(BankError::OperationFailed(
            "opening balance must not be negative".to_string(),
        ));
    }

    let mut tx = store.begin(IsolationLevel::ReadCommitted).await?;

    let Some(bank) = tx.find_bank(bank_id).await? else {
        tx.rollback().await?;
        return Err(BankError::EntityNotExist(EntityKind::Bank));
    };
    if tx.find_user(user.id).await?.is_some() {
        tx.rollback().await?;
        return Err(BankError::OperationFailed(
            "user is already enrolled".to_string(),
        ));
    }

    let account = BankAccount::new(user.id, bank_id, opening_balance);
    let card = Card::new(user.id, account.id, opening_balance);

    tx.insert_user(&user).await?;
    tx.insert_bank_account(&account).await?;
    tx.insert_card(&card).await?;
    tx.commit().await?;

    tracing::info!(user = %user.id, bank = %bank_id, %opening_balance, "user enrolled");

    Ok(AccountChain {
        user,
        card,
        account,
        bank,
    })
}

/// Removes `user` and their card and bank account.
///
/// The card and account rows are deleted before the user row; the user
/// is never removed while either still exists, and never while a credit
/// is outstanding.
///
/// # Errors
///
/// - [`BankError::EntityNotExist`] when the user is unknown
/// - [`BankError::OperationFailed`] while a credit is outstanding
pub async fn offboard(store: &dyn LedgerStore, user: &User) -> Result<(), BankError> {
    let mut tx = store.begin(IsolationLevel::ReadCommitted).await?;

    if tx.find_user(user.id).await?.is_none() {
        tx.rollback().await?;
        return Err(BankError::EntityNotExist(EntityKind::User));
    }
    if tx.find_credit_by_user(user.id).await?.is_some() {
        tx.rollback().await?;
        return Err(BankError::OperationFailed(
            "user still holds an outstanding credit".to_string(),
        ));
    }

    if let Some(card) = tx.find_card_by_user(user.id).await? {
        tx.remove_card(card.id).await?;
    }
    if let Some(account) = tx.find_bank_account_by_user(user.id).await? {
        tx.remove_bank_account(account.id).await?;
    }
    tx.remove_user(user.id).await?;
    tx.commit().await?;

    tracing::info!(user = %user.id, "user offboarded");

    Ok(())
}
