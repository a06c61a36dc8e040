//! Infrastructure: configuration and store implementations.

pub mod config;
pub mod ledger_store;
pub mod memory;
pub mod operation_log;
pub mod postgres;

pub use config::{AppConfig, ConfigError, ConnectionSettings, DbmsKind};
pub use ledger_store::{IsolationLevel, LedgerStore, LedgerTx, StoreError};
pub use memory::MemoryLedgerStore;
pub use operation_log::{MemoryOperationLog, OperationLog, OperationLogError, RedisOperationLog};
pub use postgres::PgLedgerStore;
