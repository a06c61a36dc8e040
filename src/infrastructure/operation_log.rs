//! Staged-operation log.
//!
//! A small document store holding [`Operation`] records between
//! admission and ledger commit. Writes here are deliberately outside the
//! relational transaction: a crash between "operation staged" and
//! "ledger mutated" leaves an orphan document behind, which [`staged`]
//! inspection exposes to an external recovery job. No reconciliation is
//! attempted in-process.
//!
//! [`staged`]: OperationLog::staged

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::entities::Operation;
use crate::domain::value_objects::OperationId;

/// Errors raised by the operation log.
#[derive(Debug, Clone, Error)]
pub enum OperationLogError {
    /// The backing store failed (connection, timeout, command error).
    #[error("operation log error: {0}")]
    Backend(String),
    /// An operation with the same id is already staged.
    #[error("operation {0} is already staged")]
    Duplicate(OperationId),
    /// Serializing or deserializing an operation document failed.
    #[error("operation serialization failed: {0}")]
    Serialization(String),
}

impl From<redis::RedisError> for OperationLogError {
    fn from(error: redis::RedisError) -> Self {
        Self::Backend(error.to_string())
    }
}

/// Append/delete document store for staged operations.
#[async_trait]
pub trait OperationLog: Send + Sync {
    /// Stages an operation document.
    ///
    /// # Errors
    ///
    /// Returns [`OperationLogError::Duplicate`] when a document with the
    /// same id is already staged.
    async fn insert(&self, operation: &Operation) -> Result<(), OperationLogError>;

    /// Returns whether an operation document is staged.
    async fn contains(&self, id: OperationId) -> Result<bool, OperationLogError>;

    /// Fetches a staged operation document.
    async fn find(&self, id: OperationId) -> Result<Option<Operation>, OperationLogError>;

    /// Deletes a staged operation document.
    ///
    /// Returns `false` when no document with that id was staged.
    async fn remove(&self, id: OperationId) -> Result<bool, OperationLogError>;

    /// Lists every staged operation document.
    ///
    /// After all in-flight calls have returned, anything still listed
    /// here is an orphan left by a crash mid-transaction.
    async fn staged(&self) -> Result<Vec<Operation>, OperationLogError>;
}

/// Redis-backed [`OperationLog`].
///
/// Documents are stored as JSON strings under `operation:{id}` keys;
/// duplicate staging is rejected atomically with `SET NX`.
#[derive(Clone)]
pub struct RedisOperationLog {
    connection: redis::aio::MultiplexedConnection,
}

impl RedisOperationLog {
    const KEY_PREFIX: &'static str = "operation:";

    /// Connects to the Redis instance at `url`.
    pub async fn connect(url: &str) -> Result<Self, OperationLogError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self { connection })
    }

    fn key(id: OperationId) -> String {
        format!("{}{id}", Self::KEY_PREFIX)
    }
}

#[async_trait]
impl OperationLog for RedisOperationLog {
    async fn insert(&self, operation: &Operation) -> Result<(), OperationLogError> {
        let document = serde_json::to_string(operation)
            .map_err(|error| OperationLogError::Serialization(error.to_string()))?;

        let mut connection = self.connection.clone();
        let created: bool = connection.set_nx(Self::key(operation.id), document).await?;
        if created {
            Ok(())
        } else {
            Err(OperationLogError::Duplicate(operation.id))
        }
    }

    async fn contains(&self, id: OperationId) -> Result<bool, OperationLogError> {
        let mut connection = self.connection.clone();
        Ok(connection.exists(Self::key(id)).await?)
    }

    async fn find(&self, id: OperationId) -> Result<Option<Operation>, OperationLogError> {
        let mut connection = self.connection.clone();
        let document: Option<String> = connection.get(Self::key(id)).await?;
        document
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|error| OperationLogError::Serialization(error.to_string()))
            })
            .transpose()
    }

    async fn remove(&self, id: OperationId) -> Result<bool, OperationLogError> {
        let mut connection = self.connection.clone();
        let removed: i64 = connection.del(Self::key(id)).await?;
        Ok(removed > 0)
    }

    async fn staged(&self) -> Result<Vec<Operation>, OperationLogError> {
        let keys: Vec<String> = {
            let mut connection = self.connection.clone();
            let mut iter = connection
                .scan_match(format!("{}*", Self::KEY_PREFIX))
                .await?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        let mut connection = self.connection.clone();
        let mut operations = Vec::with_capacity(keys.len());
        for key in keys {
            let document: Option<String> = connection.get(&key).await?;
            if let Some(json) = document {
                let operation = serde_json::from_str(&json)
                    .map_err(|error| OperationLogError::Serialization(error.to_string()))?;
                operations.push(operation);
            }
        }
        Ok(operations)
    }
}

/// Process-local [`OperationLog`] implementation for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct MemoryOperationLog {
    documents: Arc<Mutex<HashMap<OperationId, Operation>>>,
}

impl MemoryOperationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationLog for MemoryOperationLog {
    async fn insert(&self, operation: &Operation) -> Result<(), OperationLogError> {
        let mut documents = self.documents.lock().await;
        if documents.contains_key(&operation.id) {
            return Err(OperationLogError::Duplicate(operation.id));
        }
        documents.insert(operation.id, operation.clone());
        Ok(())
    }

    async fn contains(&self, id: OperationId) -> Result<bool, OperationLogError> {
        Ok(self.documents.lock().await.contains_key(&id))
    }

    async fn find(&self, id: OperationId) -> Result<Option<Operation>, OperationLogError> {
        Ok(self.documents.lock().await.get(&id).cloned())
    }

    async fn remove(&self, id: OperationId) -> Result<bool, OperationLogError> {
        Ok(self.documents.lock().await.remove(&id).is_some())
    }

    async fn staged(&self) -> Result<Vec<Operation>, OperationLogError> {
        Ok(self.documents.lock().await.values().cloned().collect())
    }
}
