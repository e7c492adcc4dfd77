// fraud-core/src/core/features.rs
// ============================================================================
// Module: Feature Vector
// Description: Per-event derived feature representation.
// Purpose: Canonical output of the feature engine, input to the scorer.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! One `FeatureVector` is derived per event (§3). Every numeric field must be
//! finite, and risk scores are bounded to `[0, 1]`; `FeatureVector::validate`
//! checks both for the property tests in §8.

use serde::Deserialize;
use serde::Serialize;

use super::event::Channel;
use super::identifiers::DeviceFingerprint;
use super::identifiers::EntityId;
use super::identifiers::EventId;
use super::identifiers::SessionId;
use super::time::Timestamp;

/// Resolved geolocation for an event's IP address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    /// ISO country code.
    pub country: [char; 2],
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// Named region/city augmentation of [`Geolocation`], kept optional because
/// many IP geolocation providers resolve lat/lon without a labeled place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPlace {
    /// Resolved coordinates.
    pub location: Geolocation,
    /// Region or state label, when resolvable.
    pub region: Option<String>,
    /// City label, when resolvable.
    pub city: Option<String>,
}

/// Velocity counters over the three tracked rolling windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VelocityCounts {
    /// Count of events for this entity in the trailing 1 hour.
    pub window_1h: u64,
    /// Count of events for this entity in the trailing 24 hours.
    pub window_24h: u64,
    /// Count of events for this entity in the trailing 7 days.
    pub window_7d: u64,
}

/// Bookkeeping about how a feature vector was computed, surfaced so
/// degraded-feature failures (§7 type 3) are visible downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputationMeta {
    /// Wall-clock milliseconds spent computing this vector.
    pub compute_time_ms: u64,
    /// Whether the per-entity state read was served from a live cache hit.
    pub cache_hit: bool,
    /// Minutes since the underlying evidence was refreshed; `0` when fresh.
    pub data_freshness_minutes: u32,
}

/// Feature vector derived from one event plus per-entity state (§3).
///
/// # Invariants
/// - Every numeric field is finite.
/// - `ip_risk`, `merchant_risk` are within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Event this vector was derived from.
    pub event_id: EventId,
    /// Entity this vector concerns.
    pub entity_id: EntityId,
    /// When this vector was computed.
    pub computed_at: Timestamp,
    /// Event amount, carried through for the rules score.
    pub amount: f64,
    /// Event currency, carried through unchanged.
    pub currency: String,
    /// Submission channel, when the source event carried one.
    pub channel: Option<Channel>,
    /// Velocity counters, excluding this event (§4.2, Open Question resolved).
    pub velocity: VelocityCounts,
    /// Cached IP reputation risk in `[0, 1]`.
    pub ip_risk: f64,
    /// Cached merchant reputation risk in `[0, 1]`.
    pub merchant_risk: f64,
    /// Resolved geolocation for the event's IP, when available.
    pub geolocation: Option<GeoPlace>,
    /// Great-circle distance in km from the entity's usual location.
    pub geo_distance_km: f64,
    /// Entity account age in days.
    pub account_age_days: u32,
    /// Device fingerprint, carried through unchanged.
    pub device_fingerprint: Option<DeviceFingerprint>,
    /// Session identifier, carried through unchanged.
    pub session_id: Option<SessionId>,
    /// Stable hash of the raw user-agent string, when one was supplied.
    pub user_agent_hash: Option<String>,
    /// Feature schema version, bumped when this struct's shape changes.
    pub schema_version: u16,
    /// Computation bookkeeping.
    pub computation: ComputationMeta,
}

/// Current feature schema version.
pub const FEATURE_SCHEMA_VERSION: u16 = 1;

impl FeatureVector {
    /// Validates the numeric invariants this type advertises.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason for the first invariant violated.
    pub fn validate(&self) -> Result<(), String> {
        let numeric_fields = [
            ("amount", self.amount),
            ("ip_risk", self.ip_risk),
            ("merchant_risk", self.merchant_risk),
            ("geo_distance_km", self.geo_distance_km),
        ];
        for (name, value) in numeric_fields {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        for (name, value) in [("ip_risk", self.ip_risk), ("merchant_risk", self.merchant_risk)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        Ok(())
    }
}
