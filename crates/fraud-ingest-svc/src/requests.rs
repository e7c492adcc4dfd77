// fraud-ingest-svc/src/requests.rs
// ============================================================================
// Module: Ingest Request Bodies
// Description: Loosely-typed request payloads ingest completes into `Event`.
// Purpose: Let callers omit `event_id`/`timestamp`; ingest stamps them (§4.1).
// Dependencies: fraud-core, serde, serde_json
// ============================================================================

//! ## Overview
//! `Event` itself requires an `event_id` and `timestamp`. The HTTP request
//! bodies below are the pre-`Event` shape a caller actually sends: both
//! identifying fields are optional, and [`TransactionRequest::into_event`] /
//! [`ClaimRequest::into_event`] fill them in before the record is validated
//! and published.

use fraud_core::Channel;
use fraud_core::ClaimType;
use fraud_core::DeviceFingerprint;
use fraud_core::EntityId;
use fraud_core::Event;
use fraud_core::EventId;
use fraud_core::EventPayload;
use fraud_core::MerchantId;
use fraud_core::SessionId;
use fraud_core::Timestamp;
use fraud_core::TransactionPayload;
use serde::Deserialize;

/// Inbound transaction request body for `POST /txn`.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    /// Caller-supplied event identifier; ingest generates one if absent.
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Entity the transaction concerns; also the publish partition key.
    pub entity_id: EntityId,
    /// Caller-reported event timestamp; ingest stamps `Timestamp::now()` if absent.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    /// Transaction amount.
    pub amount: f64,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Submission channel.
    pub channel: Channel,
    /// Merchant identifier, when known.
    #[serde(default)]
    pub merchant_id: Option<MerchantId>,
    /// Merchant category code or label.
    #[serde(default)]
    pub merchant_category: Option<String>,
    /// IP address the event was observed from.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Device fingerprint, when available.
    #[serde(default)]
    pub device_fingerprint: Option<DeviceFingerprint>,
    /// Session identifier, when available.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Raw user-agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Free-form metadata, passed through uninterpreted.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl TransactionRequest {
    /// Completes this request into a full [`Event`], assigning an event id
    /// and receive timestamp when the caller omitted them.
    #[must_use]
    pub fn into_event(self) -> Event {
        Event {
            event_id: self.event_id.unwrap_or_else(EventId::generate),
            entity_id: self.entity_id,
            timestamp: self.timestamp.unwrap_or_default(),
            received_at: Timestamp::now(),
            payload: EventPayload::Transaction(TransactionPayload {
                amount: self.amount,
                currency: self.currency,
                channel: self.channel,
                merchant_id: self.merchant_id,
                merchant_category: self.merchant_category,
            }),
            ip_address: self.ip_address,
            device_fingerprint: self.device_fingerprint,
            session_id: self.session_id,
            user_agent: self.user_agent,
            metadata: self.metadata,
        }
    }
}

/// Inbound claim request body for `POST /claim`.
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    /// Caller-supplied event identifier; ingest generates one if absent.
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Entity the claim concerns; also the publish partition key.
    pub entity_id: EntityId,
    /// Caller-reported event timestamp; ingest stamps `Timestamp::now()` if absent.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    /// Claimed amount.
    pub amount: f64,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Claim category.
    pub claim_type: ClaimType,
    /// IP address the event was observed from.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Device fingerprint, when available.
    #[serde(default)]
    pub device_fingerprint: Option<DeviceFingerprint>,
    /// Session identifier, when available.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Raw user-agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Free-form metadata, passed through uninterpreted.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ClaimRequest {
    /// Completes this request into a full [`Event`], assigning an event id
    /// and receive timestamp when the caller omitted them.
    #[must_use]
    pub fn into_event(self) -> Event {
        Event {
            event_id: self.event_id.unwrap_or_else(EventId::generate),
            entity_id: self.entity_id,
            timestamp: self.timestamp.unwrap_or_default(),
            received_at: Timestamp::now(),
            payload: EventPayload::Claim(fraud_core::ClaimPayload {
                amount: self.amount,
                currency: self.currency,
                claim_type: self.claim_type,
            }),
            ip_address: self.ip_address,
            device_fingerprint: self.device_fingerprint,
            session_id: self.session_id,
            user_agent: self.user_agent,
            metadata: self.metadata,
        }
    }
}
