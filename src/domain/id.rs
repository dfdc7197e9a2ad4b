//! Newtype identifiers for every aggregate.
//!
//! Handlers, services, and repositories pass these wrappers instead of bare
//! strings so the compiler rejects a reservation id where a property id
//! belongs. Values are UUID v4 strings persisted as TEXT columns.

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Decode, Encode, Sqlite, Type};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Declares a string-backed id type together with the serde, sqlx, and
/// conversion impls every aggregate id needs.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mint a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap a value read from the database or a request path.
            pub fn from_raw(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap into the underlying string.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        // Stored as TEXT; delegate everything to the String impls.
        impl Type<Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as Type<Sqlite>>::type_info()
            }
        }

        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <String as Encode<'q, Sqlite>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                Ok(Self(<String as Decode<'r, Sqlite>>::decode(value)?))
            }
        }
    };
}

entity_id!(
    /// Identifies a user account.
    UserId
);

entity_id!(
    /// Identifies an organization.
    OrgId
);

entity_id!(
    /// Identifies a membership row linking a user to an organization.
    MembershipId
);

entity_id!(
    /// Identifies a pending invitation.
    InvitationId
);

entity_id!(
    /// Identifies a property.
    PropertyId
);

entity_id!(
    /// Identifies a reservation.
    ReservationId
);
