// fraud-core/src/core/identifiers.rs
// ============================================================================
// Module: Identifiers
// Description: Canonical opaque identifiers used across the decisioning pipeline.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Identifiers are opaque newtypes over `String` (or, where the id has a
//! fixed shape, a constructor that enforces it). They serialize transparently
//! as plain strings on the wire so `events.txns.v1` payloads and audit rows
//! stay readable. Validation beyond shape is a boundary concern (ingest,
//! policy load), not something these wrappers enforce.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Declares a `#[serde(transparent)]` string-backed identifier with the
/// standard `new`/`as_str`/`Display`/`From` surface shared by every id in
/// this module.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Generates a fresh identifier from a version-4 UUID.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Globally unique event identifier (§3: "event identifier is globally unique").
    EventId
);

string_id!(
    /// Identifier of the entity under risk assessment (account, policy, customer).
    EntityId
);

string_id!(
    /// Decision identifier for a logged `DecisionOutput`.
    DecisionId
);

string_id!(
    /// Evidence bundle identifier; always a version-4 UUID per §3.
    BundleId
);

string_id!(
    /// Policy version tag, e.g. `"2024-08-01"` or a semantic tag.
    PolicyVersion
);

string_id!(
    /// Model version tag for the ensemble scorer, e.g. `"v3"` or `"degraded"`.
    ModelVersion
);

string_id!(
    /// Merchant identifier referenced by a transaction event.
    MerchantId
);

string_id!(
    /// Device fingerprint, used as the graph-anomaly detector's partition key.
    DeviceFingerprint
);

string_id!(
    /// Session identifier attached to an event, if supplied by the channel.
    SessionId
);

/// Case identifier allocated by the decision engine, format `CASE-<8 hex uppercase>`.
///
/// # Invariants
/// - Always exactly `"CASE-"` followed by 8 uppercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    /// Generates a fresh case identifier from a random 32-bit value.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 4] = uuid::Uuid::new_v4().as_bytes()[0..4]
            .try_into()
            .unwrap_or([0u8; 4]);
        let value = u32::from_be_bytes(bytes);
        Self(format!("CASE-{value:08X}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
