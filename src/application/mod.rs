//! Application services: admission control, ledger mutation and the
//! workflow orchestrators built on top of them.

pub mod admission;
pub mod chain;
pub mod errors;
pub mod ledger;
pub mod workflows;

pub use chain::AccountChain;
pub use errors::{BankError, EntityKind};
pub use workflows::Receipt;
