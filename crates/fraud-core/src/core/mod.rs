// fraud-core/src/core/mod.rs
// ============================================================================
// Module: Core Types
// Description: Canonical data model for the decisioning pipeline.
// Purpose: Provide stable, serializable types shared by every service.
// Dependencies: serde, serde_json, sha2
// ============================================================================

//! ## Overview
//! Core types define the event, feature, score, decision, evidence, and
//! audit schemas (§3). These types are the canonical source of truth for
//! every derived surface (HTTP bodies, broker payloads, SQLite rows).

pub mod audit;
pub mod decision;
pub mod event;
pub mod evidence;
pub mod features;
pub mod hashing;
pub mod identifiers;
pub mod scores;
pub mod time;

pub use audit::AuditIndexRow;
pub use decision::Action;
pub use decision::DecisionOutput;
pub use event::Channel;
pub use event::ClaimPayload;
pub use event::ClaimType;
pub use event::Event;
pub use event::EventPayload;
pub use event::TransactionPayload;
pub use evidence::EvidenceBundle;
pub use evidence::EvidenceType;
pub use features::ComputationMeta;
pub use features::FEATURE_SCHEMA_VERSION;
pub use features::FeatureVector;
pub use features::GeoPlace;
pub use features::Geolocation;
pub use features::VelocityCounts;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::BundleId;
pub use identifiers::CaseId;
pub use identifiers::DecisionId;
pub use identifiers::DeviceFingerprint;
pub use identifiers::EntityId;
pub use identifiers::EventId;
pub use identifiers::MerchantId;
pub use identifiers::ModelVersion;
pub use identifiers::PolicyVersion;
pub use identifiers::SessionId;
pub use scores::Attribution;
pub use scores::Explanation;
pub use scores::ModelScores;
pub use scores::ScoreOutput;
pub use time::Timestamp;
