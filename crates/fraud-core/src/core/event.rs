// fraud-core/src/core/event.rs
// ============================================================================
// Module: Event
// Description: Inbound transaction/claim event schema.
// Purpose: Tagged-union event payload the ingest stage validates and publishes.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Events are the unit ingest validates and publishes (§4.1) and the unit the
//! feature engine consumes (§4.2). §9's design note calls for a tagged union
//! over the two event variants plus a narrow free-form `metadata` blob the
//! core never interprets — that's `EventPayload` and `Event::metadata` below.

use serde::Deserialize;
use serde::Serialize;

use super::identifiers::DeviceFingerprint;
use super::identifiers::EntityId;
use super::identifiers::EventId;
use super::identifiers::MerchantId;
use super::identifiers::SessionId;
use super::time::Timestamp;

/// Channel a transaction was submitted through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Browser-based web checkout.
    Web,
    /// Native mobile application.
    Mobile,
    /// Automated teller machine.
    Atm,
    /// Point-of-sale terminal.
    Pos,
    /// Phone-assisted transaction.
    Phone,
    /// Server-to-server API integration.
    Api,
}

impl Channel {
    /// Returns the channel's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Atm => "atm",
            Self::Pos => "pos",
            Self::Phone => "phone",
            Self::Api => "api",
        }
    }
}

/// Claim category for a claim event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Automobile claim.
    Auto,
    /// Homeowner's or renter's claim.
    Home,
    /// Health or medical claim.
    Health,
    /// Life insurance claim.
    Life,
    /// Travel insurance claim.
    Travel,
    /// Any claim type not otherwise enumerated.
    Other,
}

/// Transaction-specific fields (§3 "Event" for variant `transaction`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// Transaction amount; must be non-negative and finite.
    pub amount: f64,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Submission channel.
    pub channel: Channel,
    /// Merchant identifier, when known.
    pub merchant_id: Option<MerchantId>,
    /// Merchant category code or label.
    pub merchant_category: Option<String>,
}

/// Claim-specific fields (§3 "Event" for variant `claim`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimPayload {
    /// Claimed amount; must be non-negative and finite.
    pub amount: f64,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Claim category.
    pub claim_type: ClaimType,
}

/// Tagged union over the two event variants this pipeline ingests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_variant", rename_all = "snake_case")]
pub enum EventPayload {
    /// A transaction event.
    Transaction(TransactionPayload),
    /// A claim event.
    Claim(ClaimPayload),
}

impl EventPayload {
    /// Returns the amount common to both variants.
    #[must_use]
    pub const fn amount(&self) -> f64 {
        match self {
            Self::Transaction(payload) => payload.amount,
            Self::Claim(payload) => payload.amount,
        }
    }

    /// Returns the currency common to both variants.
    #[must_use]
    pub fn currency(&self) -> &str {
        match self {
            Self::Transaction(payload) => &payload.currency,
            Self::Claim(payload) => &payload.currency,
        }
    }

    /// Returns the topic this payload variant publishes to (§6).
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "events.txns.v1",
            Self::Claim(_) => "events.claims.v1",
        }
    }
}

/// A validated, identified event ready for (or already published to) the
/// event log.
///
/// # Invariants
/// - `event_id` is globally unique (caller/ingest responsibility).
/// - `payload.amount()` is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Globally unique event identifier.
    pub event_id: EventId,
    /// Identifier of the entity this event concerns.
    pub entity_id: EntityId,
    /// Event-reported timestamp (monotonic per-entity within a partition).
    pub timestamp: Timestamp,
    /// Timestamp ingest stamped at receipt, if the caller omitted one.
    pub received_at: Timestamp,
    /// Transaction- or claim-specific fields.
    pub payload: EventPayload,
    /// Optional IP address the event was observed from.
    pub ip_address: Option<String>,
    /// Optional device fingerprint.
    pub device_fingerprint: Option<DeviceFingerprint>,
    /// Optional session identifier.
    pub session_id: Option<SessionId>,
    /// Optional raw user-agent string.
    pub user_agent: Option<String>,
    /// Free-form metadata the core never interprets (§9 design note).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Event {
    /// Validates the invariants this type advertises.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the amount is not finite and
    /// non-negative, or the currency code is not a plausible ISO-4217 code.
    pub fn validate(&self) -> Result<(), String> {
        let amount = self.payload.amount();
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("amount must be finite and non-negative, got {amount}"));
        }
        let currency = self.payload.currency();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(format!("currency must be a 3-letter ISO-4217 code, got {currency:?}"));
        }
        Ok(())
    }
}
