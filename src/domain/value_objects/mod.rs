//! Value objects shared by the whole domain model.

mod ids;
mod money;

pub use ids::{BankAccountId, BankId, CardId, CreditId, OperationId, UserId};
pub use money::Money;
