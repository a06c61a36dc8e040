//! User entity.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::UserId;

/// A bank customer.
///
/// A user owns at most one card and at most one credit. The password
/// arrives pre-hashed; hashing is outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact e-mail address.
    pub email: String,
    /// Age in years.
    pub age: u8,
    /// Pre-hashed password.
    pub password_hash: String,
}

impl User {
    /// Creates a new user with a generated identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: u8, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            age,
            password_hash: password_hash.into(),
        }
    }
}
