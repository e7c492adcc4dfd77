// fraud-decision-svc/src/requests.rs
// ============================================================================
// Module: Decision Request DTOs
// Description: Loosely typed request bodies completed into a DecisionContext.
// Purpose: Let POST /decide (§6 sync test path) supply everything the
//          consumer loop would otherwise join from the feature/score topics.
// Dependencies: fraud-core, serde
// ============================================================================

use fraud_core::Channel;
use fraud_core::DeviceFingerprint;
use fraud_core::EntityId;
use fraud_core::EventId;
use serde::Deserialize;

use crate::engine::DecisionContext;

/// Request body for `POST /decide`: a feature vector's decision-relevant
/// fields plus the calibrated score, since the caller of the synchronous
/// test path has no feature/score topics to join (§6).
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// Event this decision concerns.
    pub event_id: EventId,
    /// Entity under assessment.
    pub entity_id: EntityId,
    /// Final calibrated risk score.
    pub calibrated: f64,
    /// Submission channel, when known.
    #[serde(default)]
    pub channel: Option<Channel>,
    /// Current 1-hour velocity count.
    #[serde(default)]
    pub velocity_1h: u64,
    /// Current 24-hour velocity count.
    #[serde(default)]
    pub velocity_24h: u64,
    /// Cached IP reputation risk in `[0, 1]`.
    #[serde(default)]
    pub ip_risk: f64,
    /// Raw source IP, when known.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Device fingerprint, when known.
    #[serde(default)]
    pub device_fingerprint: Option<DeviceFingerprint>,
}

impl DecisionRequest {
    /// Converts this request into a [`DecisionContext`] for the engine.
    #[must_use]
    pub fn into_context(self) -> DecisionContext {
        DecisionContext {
            event_id: self.event_id,
            entity_id: self.entity_id,
            calibrated: self.calibrated,
            channel: self.channel,
            velocity_1h: self.velocity_1h,
            velocity_24h: self.velocity_24h,
            ip_risk: self.ip_risk,
            ip_address: self.ip_address,
            device_fingerprint: self.device_fingerprint,
        }
    }
}
