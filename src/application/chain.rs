//! Account chain resolution.
//!
//! Every money-movement workflow requires the full
//! User → Card → BankAccount → Bank association chain of a party to be
//! resolved before any transaction is opened. A link that cannot be
//! resolved fails the call with an `EntityIsNull`-class error; an
//! unknown user fails with `EntityNotExist`.

use crate::application::errors::{BankError, EntityKind};
use crate::domain::entities::{Bank, BankAccount, Card, User};
use crate::infrastructure::ledger_store::LedgerStore;

/// A fully resolved User → Card → BankAccount → Bank chain.
#[derive(Debug, Clone)]
pub struct AccountChain {
    /// The user, as currently stored in the ledger.
    pub user: User,
    /// The user's card.
    pub card: Card,
    /// The account backing the card.
    pub account: BankAccount,
    /// The bank holding the account.
    pub bank: Bank,
}

impl AccountChain {
    /// Eagerly resolves the chain for `user` from the ledger.
    ///
    /// Resolution doubles as the existence check for the party's bank
    /// account: a chain can only be returned for rows actually present
    /// in the store.
    pub async fn resolve(store: &dyn LedgerStore, user: &User) -> Result<Self, BankError> {
        let stored_user = store
            .find_user(user.id)
            .await?
            .ok_or(BankError::EntityNotExist(EntityKind::User))?;
        let card = store
            .find_card_by_user(stored_user.id)
            .await?
            .ok_or(BankError::EntityIsNull(EntityKind::Card))?;
        let account = store
            .find_bank_account(card.bank_account_id)
            .await?
            .ok_or(BankError::EntityIsNull(EntityKind::BankAccount))?;
        let bank = store
            .find_bank(account.bank_id)
            .await?
            .ok_or(BankError::EntityIsNull(EntityKind::Bank))?;

        Ok(Self {
            user: stored_user,
            card,
            account,
            bank,
        })
    }
}
