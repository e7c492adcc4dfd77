// fraud-core/src/interfaces/providers.rs
// ============================================================================
// Module: Feature Providers
// Description: Backend-agnostic interfaces for the feature engine's external
//              evidence sources and the decision engine's watchlists.
// Purpose: Let cache-miss lookups and side-signal checks vary by deployment.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Every source here is consulted only on a cache miss inside the
//! `EntityStateStore` TTL cache (§4.2); a source failure degrades to the
//! feature engine's documented default rather than failing the event (§7
//! type 3). Watchlists (§4.4) are a side-signal source consulted per event.

use thiserror::Error;

use crate::core::features::GeoPlace;
use crate::core::identifiers::DeviceFingerprint;
use crate::core::identifiers::EntityId;
use crate::core::identifiers::MerchantId;

/// Provider errors. A single variant suffices: every caller treats any
/// failure identically — substitute the documented default and continue.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider's backing source is unreachable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// IP reputation source, consulted on a cache miss (TTL 1h, default 0.1).
pub trait IpRiskSource {
    /// Looks up the risk score for `ip`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the source is unreachable.
    fn lookup(&self, ip: &str) -> Result<f64, ProviderError>;
}

/// Merchant reputation source, consulted on a cache miss (TTL 24h, default 0.05).
pub trait MerchantRiskSource {
    /// Looks up the risk score for `merchant`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the source is unreachable.
    fn lookup(&self, merchant: &MerchantId) -> Result<f64, ProviderError>;
}

/// Account age source, consulted on a cache miss (TTL 24h, default 365 days).
pub trait AccountAgeSource {
    /// Looks up the account age in days for `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the source is unreachable.
    fn lookup(&self, entity: &EntityId) -> Result<u32, ProviderError>;
}

/// IP geolocation resolver.
pub trait GeoResolver {
    /// Resolves `ip` to a place, or `None` when the address cannot be
    /// resolved (not the same as a provider failure).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the source is unreachable.
    fn resolve(&self, ip: &str) -> Result<Option<GeoPlace>, ProviderError>;
}

/// Watchlist membership checks (§4.4 side-signal detectors).
pub trait WatchlistProvider {
    /// Returns whether `entity` is on the entity watchlist.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the source is unreachable.
    fn is_entity_listed(&self, entity: &EntityId) -> Result<bool, ProviderError>;

    /// Returns whether `ip` is on the IP watchlist.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the source is unreachable.
    fn is_ip_listed(&self, ip: &str) -> Result<bool, ProviderError>;

    /// Returns whether `device` is on the device watchlist.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the source is unreachable.
    fn is_device_listed(&self, device: &DeviceFingerprint) -> Result<bool, ProviderError>;
}
