// fraud-core/src/interfaces/store.rs
// ============================================================================
// Module: Entity State Store
// Description: Backend-agnostic per-entity key/value state interface.
// Purpose: Let the feature engine and decision engine share entity state
//          without holding it in process memory (§9 design note).
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Per-entity state (§3 "Entity State") lives in a shared key/value store,
//! never in a worker's process memory, so worker count scales independently
//! of correctness (§5, §9). This trait exposes the store-native atomics
//! needed: `INCR` with TTL for velocity counters, `SETEX` for cached
//! lookups, `SADD`/`SCARD` for the device→entity graph.

use thiserror::Error;

use crate::core::identifiers::DeviceFingerprint;
use crate::core::identifiers::EntityId;
use crate::core::identifiers::MerchantId;

/// Rolling velocity windows tracked per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VelocityWindow {
    /// One-hour trailing window (TTL 3600s).
    OneHour,
    /// 24-hour trailing window (TTL 86400s).
    TwentyFourHours,
    /// Seven-day trailing window (TTL 604800s).
    SevenDays,
}

impl VelocityWindow {
    /// Returns the window's key suffix, used in the
    /// `velocity:<entity>:<window>` key shape.
    #[must_use]
    pub const fn key_suffix(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::TwentyFourHours => "24h",
            Self::SevenDays => "7d",
        }
    }

    /// Returns the TTL in seconds for this window.
    #[must_use]
    pub const fn ttl_seconds(self) -> u64 {
        match self {
            Self::OneHour => 3600,
            Self::TwentyFourHours => 86_400,
            Self::SevenDays => 604_800,
        }
    }
}

/// Velocity-anomaly EMA windows (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmaWindow {
    /// One-hour EMA, compared against a 3x threshold.
    OneHour,
    /// 24-hour EMA, compared against a 2x threshold.
    TwentyFourHours,
}

/// Entity state store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error (network, lock contention, disk).
    #[error("entity state store io error: {0}")]
    Io(String),
    /// Store reported a backend-specific error.
    #[error("entity state store error: {0}")]
    Store(String),
}

/// Backend-agnostic per-entity state store.
///
/// Implementations must be `Send + Sync` so a single store can back many
/// concurrent stateless workers (§5).
pub trait EntityStateStore {
    /// Atomically increments the velocity counter for `(entity, window)` and
    /// returns the value **before** this increment (§4.2, §9): the feature
    /// reflects prior activity, not this event's own contribution.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn incr_velocity(&self, entity: &EntityId, window: VelocityWindow) -> Result<u64, StoreError>;

    /// Returns the entity's usual location, if one has been initialized.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn usual_location(&self, entity: &EntityId) -> Result<Option<(f64, f64)>, StoreError>;

    /// Lazily initializes the entity's usual location to `point` if absent.
    /// Never overwrites an existing value — the usual point is only updated
    /// by an explicit lifecycle signal (§4.2), via [`Self::set_usual_location`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn init_usual_location(&self, entity: &EntityId, point: (f64, f64)) -> Result<(), StoreError>;

    /// Explicitly overwrites the entity's usual location (lifecycle signal).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn set_usual_location(&self, entity: &EntityId, point: (f64, f64)) -> Result<(), StoreError>;

    /// Returns the cached IP risk score (TTL 1h), if still fresh.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn cached_ip_risk(&self, ip: &str) -> Result<Option<f64>, StoreError>;

    /// Caches an IP risk score with the store's configured 1h TTL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn set_cached_ip_risk(&self, ip: &str, value: f64) -> Result<(), StoreError>;

    /// Returns the cached merchant risk score (TTL 24h), if still fresh.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn cached_merchant_risk(&self, merchant: &MerchantId) -> Result<Option<f64>, StoreError>;

    /// Caches a merchant risk score with the store's configured 24h TTL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn set_cached_merchant_risk(&self, merchant: &MerchantId, value: f64) -> Result<(), StoreError>;

    /// Returns the cached account age in days (TTL 24h), if still fresh.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn cached_account_age_days(&self, entity: &EntityId) -> Result<Option<u32>, StoreError>;

    /// Caches an account age with the store's configured 24h TTL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn set_cached_account_age_days(&self, entity: &EntityId, value: u32) -> Result<(), StoreError>;

    /// Returns the entity's velocity EMA for `window`, if one has been recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn velocity_ema(&self, entity: &EntityId, window: EmaWindow) -> Result<Option<f64>, StoreError>;

    /// Updates the entity's velocity EMA for `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn set_velocity_ema(&self, entity: &EntityId, window: EmaWindow, value: f64) -> Result<(), StoreError>;

    /// Records that `entity` was seen behind `device` within the graph
    /// anomaly detector's 30-day window, returning the device's distinct
    /// entity-set cardinality **after** this insert (§4.4).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store is unreachable.
    fn record_device_entity(
        &self,
        device: &DeviceFingerprint,
        entity: &EntityId,
    ) -> Result<usize, StoreError>;
}
