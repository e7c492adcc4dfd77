// fraud-providers/src/sources.rs
// ============================================================================
// Module: Static Evidence Sources
// Description: Table-backed stand-ins for the feature engine's external
//              reputation, geolocation, and watchlist lookups.
// Purpose: Give the feature engine and decision engine deterministic,
//          config-loadable sources without a real reputation vendor.
// Dependencies: fraud-core
// ============================================================================

//! ## Overview
//! Every source here is consulted only on an `EntityStateStore` cache miss
//! (§4.2) or, for [`StaticWatchlistProvider`], once per event (§4.4). Each
//! is a plain lookup table with a documented default, the same
//! explicit-membership-set shape `fraud-config` already uses for trusted
//! channels — a real deployment swaps the table for a vendor client behind
//! the same trait.

use std::collections::HashMap;
use std::collections::HashSet;

use fraud_core::AccountAgeSource;
use fraud_core::DeviceFingerprint;
use fraud_core::EntityId;
use fraud_core::GeoPlace;
use fraud_core::GeoResolver;
use fraud_core::IpRiskSource;
use fraud_core::MerchantId;
use fraud_core::MerchantRiskSource;
use fraud_core::ProviderError;
use fraud_core::WatchlistProvider;

/// Documented default IP risk on an unlisted address (§4.2).
pub const DEFAULT_IP_RISK: f64 = 0.1;
/// Documented default merchant risk on an unlisted merchant (§4.2).
pub const DEFAULT_MERCHANT_RISK: f64 = 0.05;
/// Documented default account age, in days, on an unlisted entity (§4.2).
pub const DEFAULT_ACCOUNT_AGE_DAYS: u32 = 365;

/// Table-backed IP reputation source (§4.2).
#[derive(Debug, Clone, Default)]
pub struct TableIpRiskSource {
    scores: HashMap<String, f64>,
    default_score: f64,
}

impl TableIpRiskSource {
    /// Creates a source with an empty table and the documented default.
    #[must_use]
    pub fn new() -> Self {
        Self { scores: HashMap::new(), default_score: DEFAULT_IP_RISK }
    }

    /// Registers an explicit risk score for `ip`.
    #[must_use]
    pub fn with_score(mut self, ip: impl Into<String>, score: f64) -> Self {
        self.scores.insert(ip.into(), score);
        self
    }
}

impl IpRiskSource for TableIpRiskSource {
    fn lookup(&self, ip: &str) -> Result<f64, ProviderError> {
        Ok(self.scores.get(ip).copied().unwrap_or(self.default_score))
    }
}

/// Table-backed merchant reputation source (§4.2).
#[derive(Debug, Clone, Default)]
pub struct TableMerchantRiskSource {
    scores: HashMap<MerchantId, f64>,
    default_score: f64,
}

impl TableMerchantRiskSource {
    /// Creates a source with an empty table and the documented default.
    #[must_use]
    pub fn new() -> Self {
        Self { scores: HashMap::new(), default_score: DEFAULT_MERCHANT_RISK }
    }

    /// Registers an explicit risk score for `merchant`.
    #[must_use]
    pub fn with_score(mut self, merchant: MerchantId, score: f64) -> Self {
        self.scores.insert(merchant, score);
        self
    }
}

impl MerchantRiskSource for TableMerchantRiskSource {
    fn lookup(&self, merchant: &MerchantId) -> Result<f64, ProviderError> {
        Ok(self.scores.get(merchant).copied().unwrap_or(self.default_score))
    }
}

/// Table-backed account age source (§4.2).
#[derive(Debug, Clone, Default)]
pub struct TableAccountAgeSource {
    ages_days: HashMap<EntityId, u32>,
    default_age_days: u32,
}

impl TableAccountAgeSource {
    /// Creates a source with an empty table and the documented default.
    #[must_use]
    pub fn new() -> Self {
        Self { ages_days: HashMap::new(), default_age_days: DEFAULT_ACCOUNT_AGE_DAYS }
    }

    /// Registers an explicit account age, in days, for `entity`.
    #[must_use]
    pub fn with_age(mut self, entity: EntityId, age_days: u32) -> Self {
        self.ages_days.insert(entity, age_days);
        self
    }
}

impl AccountAgeSource for TableAccountAgeSource {
    fn lookup(&self, entity: &EntityId) -> Result<u32, ProviderError> {
        Ok(self.ages_days.get(entity).copied().unwrap_or(self.default_age_days))
    }
}

/// Table-backed IP geolocation resolver.
///
/// Unlike the risk sources, an unresolvable address is not defaulted — it
/// returns `Ok(None)` per [`GeoResolver::resolve`]'s contract, since "no
/// usable location" is a legitimate outcome the feature engine already
/// handles (geo-distance simply stays at its prior value).
#[derive(Debug, Clone, Default)]
pub struct TableGeoResolver {
    places: HashMap<String, GeoPlace>,
}

impl TableGeoResolver {
    /// Creates a resolver with an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self { places: HashMap::new() }
    }

    /// Registers a resolved place for `ip`.
    #[must_use]
    pub fn with_place(mut self, ip: impl Into<String>, place: GeoPlace) -> Self {
        self.places.insert(ip.into(), place);
        self
    }
}

impl GeoResolver for TableGeoResolver {
    fn resolve(&self, ip: &str) -> Result<Option<GeoPlace>, ProviderError> {
        Ok(self.places.get(ip).cloned())
    }
}

/// Table-backed watchlist provider (§4.4 side-signal detectors).
#[derive(Debug, Clone, Default)]
pub struct StaticWatchlistProvider {
    entities: HashSet<EntityId>,
    ips: HashSet<String>,
    devices: HashSet<DeviceFingerprint>,
}

impl StaticWatchlistProvider {
    /// Creates a provider with all three lists empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entity` to the entity watchlist.
    #[must_use]
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entities.insert(entity);
        self
    }

    /// Adds `ip` to the IP watchlist.
    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ips.insert(ip.into());
        self
    }

    /// Adds `device` to the device watchlist.
    #[must_use]
    pub fn with_device(mut self, device: DeviceFingerprint) -> Self {
        self.devices.insert(device);
        self
    }
}

impl WatchlistProvider for StaticWatchlistProvider {
    fn is_entity_listed(&self, entity: &EntityId) -> Result<bool, ProviderError> {
        Ok(self.entities.contains(entity))
    }

    fn is_ip_listed(&self, ip: &str) -> Result<bool, ProviderError> {
        Ok(self.ips.contains(ip))
    }

    fn is_device_listed(&self, device: &DeviceFingerprint) -> Result<bool, ProviderError> {
        Ok(self.devices.contains(device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_ip_returns_documented_default() {
        let source = TableIpRiskSource::new();
        assert!((source.lookup("203.0.113.7").expect("lookup") - DEFAULT_IP_RISK).abs() < 1e-9);
    }

    #[test]
    fn listed_ip_returns_explicit_score() {
        let source = TableIpRiskSource::new().with_score("203.0.113.7", 0.9);
        assert!((source.lookup("203.0.113.7").expect("lookup") - 0.9).abs() < 1e-9);
    }

    #[test]
    fn unlisted_merchant_returns_documented_default() {
        let source = TableMerchantRiskSource::new();
        let score = source.lookup(&MerchantId::new("merch-1")).expect("lookup");
        assert!((score - DEFAULT_MERCHANT_RISK).abs() < 1e-9);
    }

    #[test]
    fn unlisted_entity_returns_documented_default_age() {
        let source = TableAccountAgeSource::new();
        let age = source.lookup(&EntityId::new("ent-1")).expect("lookup");
        assert_eq!(age, DEFAULT_ACCOUNT_AGE_DAYS);
    }

    #[test]
    fn unresolvable_ip_returns_none_not_default() {
        let resolver = TableGeoResolver::new();
        assert_eq!(resolver.resolve("203.0.113.7").expect("resolve"), None);
    }

    #[test]
    fn watchlist_hits_are_reported_per_list() {
        let provider = StaticWatchlistProvider::new()
            .with_entity(EntityId::new("ent-1"))
            .with_ip("203.0.113.7")
            .with_device(DeviceFingerprint::new("device-1"));
        assert!(provider.is_entity_listed(&EntityId::new("ent-1")).expect("check"));
        assert!(!provider.is_entity_listed(&EntityId::new("ent-2")).expect("check"));
        assert!(provider.is_ip_listed("203.0.113.7").expect("check"));
        assert!(provider.is_device_listed(&DeviceFingerprint::new("device-1")).expect("check"));
    }
}
