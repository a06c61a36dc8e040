//! Typed identifiers for ledger entities.
//!
//! Every entity gets its own UUID-backed newtype so that, for example, a
//! `UserId` can never be passed where a `BankId` is expected. All ids share
//! the same surface: `generate`, `from_uuid`, `as_uuid` and `Display`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

entity_id! {
    /// Identifier of a [`crate::domain::entities::User`].
    UserId
}

entity_id! {
    /// Identifier of a [`crate::domain::entities::Card`].
    CardId
}

entity_id! {
    /// Identifier of a [`crate::domain::entities::BankAccount`].
    BankAccountId
}

entity_id! {
    /// Identifier of a [`crate::domain::entities::Bank`].
    BankId
}

entity_id! {
    /// Identifier of a [`crate::domain::entities::Credit`].
    CreditId
}

entity_id! {
    /// Identifier of a staged [`crate::domain::entities::Operation`].
    OperationId
}
