// fraud-core/src/core/evidence.rs
// ============================================================================
// Module: Evidence Bundle
// Description: Immutable, content-addressed audit payload.
// Purpose: Canonical unit the auditor persists to object storage.
// Dependencies: serde, serde_json, crate::core::hashing
// ============================================================================

//! ## Overview
//! Evidence bundles are write-once and content-addressed (§3): the stored
//! hash always equals `SHA-256(canonical(payload))`. `EvidenceBundle::seal`
//! is the only way to produce one, so that invariant cannot be violated by
//! construction.

use serde::Deserialize;
use serde::Serialize;

use super::hashing::DEFAULT_HASH_ALGORITHM;
use super::hashing::HashDigest;
use super::hashing::HashError;
use super::hashing::hash_canonical_json;
use super::identifiers::BundleId;
use super::identifiers::EventId;
use super::time::Timestamp;

/// What kind of record an evidence bundle's payload represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// A generic audit event (feature computation, score, or similar).
    AuditEvent,
    /// A decision engine verdict.
    Decision,
    /// A case-management lifecycle event.
    CaseEvent,
}

/// Immutable, content-addressed audit payload (§3, §4.5).
///
/// # Invariants
/// - `content_hash == SHA-256(canonical(payload))`, enforced by [`Self::seal`].
/// - Once constructed, a bundle's fields never change (no setters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceBundle {
    /// Version-4 UUID bundle identifier.
    pub bundle_id: BundleId,
    /// Event this bundle concerns.
    pub event_id: EventId,
    /// What kind of record `payload` represents.
    pub evidence_type: EvidenceType,
    /// The canonicalized, hashed payload.
    pub payload: serde_json::Value,
    /// When this bundle was sealed.
    pub created_at: Timestamp,
    /// Content hash over `canonical(payload)`.
    pub content_hash: HashDigest,
    /// Size in bytes of the canonical JSON encoding.
    pub size_bytes: usize,
}

impl EvidenceBundle {
    /// Canonicalizes and hashes `payload`, sealing it into an immutable
    /// bundle. This is the only constructor — there is no way to build an
    /// `EvidenceBundle` whose `content_hash` does not match its `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when `payload` cannot be canonicalized.
    pub fn seal(
        bundle_id: BundleId,
        event_id: EventId,
        evidence_type: EvidenceType,
        payload: serde_json::Value,
        created_at: Timestamp,
    ) -> Result<Self, HashError> {
        let canonical = super::hashing::canonical_json_bytes(&payload)?;
        let content_hash = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &payload)?;
        Ok(Self {
            bundle_id,
            event_id,
            evidence_type,
            payload,
            created_at,
            content_hash,
            size_bytes: canonical.len(),
        })
    }

    /// Recomputes the hash over `self.payload` and compares it to
    /// `self.content_hash`, the check the auditor's verify endpoint performs
    /// against freshly re-read bytes (§4.5, §8 "Audit round-trip").
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when `payload` cannot be canonicalized.
    pub fn recompute_matches(&self) -> Result<bool, HashError> {
        let recomputed = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &self.payload)?;
        Ok(recomputed == self.content_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sealed_bundle_hash_matches_payload() {
        let bundle = EvidenceBundle::seal(
            BundleId::generate(),
            EventId::new("evt-1"),
            EvidenceType::Decision,
            json!({"action": "hold"}),
            Timestamp::now(),
        )
        .expect("seal");
        assert!(bundle.recompute_matches().expect("recompute"));
    }

    #[test]
    fn identical_payloads_hash_identically_regardless_of_key_order() {
        let first = EvidenceBundle::seal(
            BundleId::generate(),
            EventId::new("evt-1"),
            EvidenceType::AuditEvent,
            json!({"a": 1, "b": 2}),
            Timestamp::now(),
        )
        .expect("seal");
        let second = EvidenceBundle::seal(
            BundleId::generate(),
            EventId::new("evt-1"),
            EvidenceType::AuditEvent,
            json!({"b": 2, "a": 1}),
            Timestamp::now(),
        )
        .expect("seal");
        assert_eq!(first.content_hash, second.content_hash);
    }
}
