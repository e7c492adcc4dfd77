// fraud-feature-svc/src/engine.rs
// ============================================================================
// Module: Feature Engine
// Description: Derives a FeatureVector from one event plus per-entity state.
// Purpose: Pure-ish composition root for §4.2's per-entity state operations.
// Dependencies: fraud-core, fraud-providers
// ============================================================================

//! ## Overview
//! [`FeatureEngine::compute`] is the whole of §4.2 in one place: velocity
//! counters (read-before-increment, per the resolved Open Question), lazy
//! usual-location initialization and Haversine distance, and the three TTL
//! caches (IP risk, merchant risk, account age), each falling back to its
//! documented default on a store or provider failure rather than dropping
//! the event (§7 type 3).

use std::sync::Arc;
use std::time::Instant;

use fraud_core::AccountAgeSource;
use fraud_core::ComputationMeta;
use fraud_core::Event;
use fraud_core::EventPayload;
use fraud_core::FEATURE_SCHEMA_VERSION;
use fraud_core::FeatureVector;
use fraud_core::GeoResolver;
use fraud_core::HashAlgorithm;
use fraud_core::IpRiskSource;
use fraud_core::MerchantRiskSource;
use fraud_core::SharedEntityStateStore;
use fraud_core::VelocityCounts;
use fraud_core::VelocityWindow;
use fraud_core::core::hashing::hash_bytes;
use fraud_core::haversine_km;
use fraud_providers::DEFAULT_ACCOUNT_AGE_DAYS;
use fraud_providers::DEFAULT_IP_RISK;
use fraud_providers::DEFAULT_MERCHANT_RISK;

/// Minutes-since-refresh sentinel stamped when a feature could not be
/// refreshed at all this event (neither a cache hit nor a live lookup
/// succeeded) — there is no last-refresh time to report.
const UNKNOWN_FRESHNESS_MINUTES: u32 = u32::MAX;

/// Computes a [`FeatureVector`] per event, reading and updating per-entity
/// state through [`SharedEntityStateStore`] and falling back to
/// [`fraud_providers`]'s evidence sources on a cache miss.
pub struct FeatureEngine {
    /// Per-entity key/value state (§9: never held in process memory).
    store: SharedEntityStateStore,
    /// IP reputation source, consulted on a cache miss.
    ip_source: Arc<dyn IpRiskSource + Send + Sync>,
    /// Merchant reputation source, consulted on a cache miss.
    merchant_source: Arc<dyn MerchantRiskSource + Send + Sync>,
    /// Account age source, consulted on a cache miss.
    account_age_source: Arc<dyn AccountAgeSource + Send + Sync>,
    /// IP geolocation resolver.
    geo_resolver: Arc<dyn GeoResolver + Send + Sync>,
}

impl FeatureEngine {
    /// Builds a feature engine over the given store and evidence sources.
    #[must_use]
    pub fn new(
        store: SharedEntityStateStore,
        ip_source: Arc<dyn IpRiskSource + Send + Sync>,
        merchant_source: Arc<dyn MerchantRiskSource + Send + Sync>,
        account_age_source: Arc<dyn AccountAgeSource + Send + Sync>,
        geo_resolver: Arc<dyn GeoResolver + Send + Sync>,
    ) -> Self {
        Self { store, ip_source, merchant_source, account_age_source, geo_resolver }
    }

    /// Derives a feature vector for `event`, updating this entity's velocity
    /// counters, usual-location baseline, and TTL caches along the way.
    #[must_use]
    pub fn compute(&self, event: &Event) -> FeatureVector {
        let start = Instant::now();
        let mut cache_hit = true;
        let mut freshness_minutes = 0u32;

        let velocity = VelocityCounts {
            window_1h: self.incr_velocity_or_zero(event, VelocityWindow::OneHour, &mut cache_hit),
            window_24h: self.incr_velocity_or_zero(event, VelocityWindow::TwentyFourHours, &mut cache_hit),
            window_7d: self.incr_velocity_or_zero(event, VelocityWindow::SevenDays, &mut cache_hit),
        };

        let ip_risk = self.resolve_ip_risk(event, &mut cache_hit, &mut freshness_minutes);
        let merchant_risk = self.resolve_merchant_risk(event, &mut cache_hit, &mut freshness_minutes);
        let account_age_days = self.resolve_account_age(event, &mut cache_hit, &mut freshness_minutes);
        let (geolocation, geo_distance_km) =
            self.resolve_geo(event, &mut cache_hit, &mut freshness_minutes);

        let channel = match &event.payload {
            EventPayload::Transaction(payload) => Some(payload.channel),
            EventPayload::Claim(_) => None,
        };

        let user_agent_hash = event
            .user_agent
            .as_deref()
            .map(|ua| hash_bytes(HashAlgorithm::Sha256, ua.as_bytes()).value);

        #[expect(clippy::cast_possible_truncation, reason = "compute time is bounded by request timeouts, never near u64::MAX ms")]
        let compute_time_ms = start.elapsed().as_millis() as u64;

        FeatureVector {
            event_id: event.event_id.clone(),
            entity_id: event.entity_id.clone(),
            computed_at: fraud_core::Timestamp::now(),
            amount: event.payload.amount(),
            currency: event.payload.currency().to_string(),
            channel,
            velocity,
            ip_risk,
            merchant_risk,
            geolocation,
            geo_distance_km,
            account_age_days,
            device_fingerprint: event.device_fingerprint.clone(),
            session_id: event.session_id.clone(),
            user_agent_hash,
            schema_version: FEATURE_SCHEMA_VERSION,
            computation: ComputationMeta { compute_time_ms, cache_hit, data_freshness_minutes: freshness_minutes },
        }
    }

    /// Increments the velocity counter for `window`, returning the
    /// pre-increment value or `0` on a store failure.
    fn incr_velocity_or_zero(&self, event: &Event, window: VelocityWindow, cache_hit: &mut bool) -> u64 {
        self.store.incr_velocity(&event.entity_id, window).unwrap_or_else(|_| {
            *cache_hit = false;
            0
        })
    }

    /// Resolves IP risk via the TTL cache, falling back to a live lookup and
    /// finally the documented default.
    fn resolve_ip_risk(&self, event: &Event, cache_hit: &mut bool, freshness_minutes: &mut u32) -> f64 {
        let Some(ip) = event.ip_address.as_deref() else {
            *cache_hit = false;
            return DEFAULT_IP_RISK;
        };
        if let Ok(Some(cached)) = self.store.cached_ip_risk(ip) {
            return cached;
        }
        *cache_hit = false;
        match self.ip_source.lookup(ip) {
            Ok(value) => {
                let _ = self.store.set_cached_ip_risk(ip, value);
                value
            }
            Err(_) => {
                *freshness_minutes = UNKNOWN_FRESHNESS_MINUTES;
                DEFAULT_IP_RISK
            }
        }
    }

    /// Resolves merchant risk the same way as [`Self::resolve_ip_risk`], for
    /// transaction events carrying a merchant identifier. Claims, and
    /// transactions with no merchant on file, use the documented default
    /// directly — there is no identifier to cache against.
    fn resolve_merchant_risk(&self, event: &Event, cache_hit: &mut bool, freshness_minutes: &mut u32) -> f64 {
        let EventPayload::Transaction(payload) = &event.payload else {
            return DEFAULT_MERCHANT_RISK;
        };
        let Some(merchant) = payload.merchant_id.as_ref() else {
            return DEFAULT_MERCHANT_RISK;
        };
        if let Ok(Some(cached)) = self.store.cached_merchant_risk(merchant) {
            return cached;
        }
        *cache_hit = false;
        match self.merchant_source.lookup(merchant) {
            Ok(value) => {
                let _ = self.store.set_cached_merchant_risk(merchant, value);
                value
            }
            Err(_) => {
                *freshness_minutes = UNKNOWN_FRESHNESS_MINUTES;
                DEFAULT_MERCHANT_RISK
            }
        }
    }

    /// Resolves account age the same way as [`Self::resolve_ip_risk`].
    fn resolve_account_age(&self, event: &Event, cache_hit: &mut bool, freshness_minutes: &mut u32) -> u32 {
        if let Ok(Some(cached)) = self.store.cached_account_age_days(&event.entity_id) {
            return cached;
        }
        *cache_hit = false;
        match self.account_age_source.lookup(&event.entity_id) {
            Ok(value) => {
                let _ = self.store.set_cached_account_age_days(&event.entity_id, value);
                value
            }
            Err(_) => {
                *freshness_minutes = UNKNOWN_FRESHNESS_MINUTES;
                DEFAULT_ACCOUNT_AGE_DAYS
            }
        }
    }

    /// Resolves the event's geolocation and, lazily initializing the
    /// entity's usual location on first observation, the Haversine distance
    /// from it (§4.2).
    fn resolve_geo(
        &self,
        event: &Event,
        cache_hit: &mut bool,
        freshness_minutes: &mut u32,
    ) -> (Option<fraud_core::GeoPlace>, f64) {
        let Some(ip) = event.ip_address.as_deref() else {
            return (None, 0.0);
        };
        let place = match self.geo_resolver.resolve(ip) {
            Ok(place) => place,
            Err(_) => {
                *cache_hit = false;
                *freshness_minutes = UNKNOWN_FRESHNESS_MINUTES;
                return (None, 0.0);
            }
        };
        let Some(place) = place else {
            return (None, 0.0);
        };
        let current = (place.location.lat, place.location.lon);
        let distance = match self.store.usual_location(&event.entity_id) {
            Ok(Some(usual)) => haversine_km(usual, current),
            Ok(None) => {
                let _ = self.store.init_usual_location(&event.entity_id, current);
                0.0
            }
            Err(_) => {
                *cache_hit = false;
                0.0
            }
        };
        (Some(place), distance)
    }
}

#[cfg(test)]
mod tests {
    use fraud_core::Channel;
    use fraud_core::EntityId;
    use fraud_core::EventId;
    use fraud_core::EventPayload;
    use fraud_core::InMemoryEntityStateStore;
    use fraud_core::TransactionPayload;
    use fraud_providers::StaticWatchlistProvider;
    use fraud_providers::TableAccountAgeSource;
    use fraud_providers::TableGeoResolver;
    use fraud_providers::TableIpRiskSource;
    use fraud_providers::TableMerchantRiskSource;

    use super::*;

    fn engine() -> FeatureEngine {
        let _ = StaticWatchlistProvider::default();
        FeatureEngine::new(
            SharedEntityStateStore::from_store(InMemoryEntityStateStore::new()),
            Arc::new(TableIpRiskSource::default()),
            Arc::new(TableMerchantRiskSource::default()),
            Arc::new(TableAccountAgeSource::default()),
            Arc::new(TableGeoResolver::default()),
        )
    }

    fn sample_event() -> Event {
        Event {
            event_id: EventId::generate(),
            entity_id: EntityId::new("ent-1"),
            timestamp: fraud_core::Timestamp::now(),
            received_at: fraud_core::Timestamp::now(),
            payload: EventPayload::Transaction(TransactionPayload {
                amount: 120.0,
                currency: "USD".to_string(),
                channel: Channel::Mobile,
                merchant_id: None,
                merchant_category: None,
            }),
            ip_address: Some("203.0.113.5".to_string()),
            device_fingerprint: None,
            session_id: None,
            user_agent: Some("test-agent/1.0".to_string()),
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn velocity_excludes_the_current_event() {
        let engine = engine();
        let event = sample_event();
        let first = engine.compute(&event);
        assert_eq!(first.velocity.window_1h, 0);
        let second = engine.compute(&event);
        assert_eq!(second.velocity.window_1h, 1);
    }

    #[test]
    fn first_observation_establishes_usual_location_with_zero_distance() {
        let engine = engine();
        let event = sample_event();
        let vector = engine.compute(&event);
        assert!((vector.geo_distance_km).abs() < 1e-9);
    }

    #[test]
    fn missing_ip_falls_back_to_documented_default_risk() {
        let engine = engine();
        let mut event = sample_event();
        event.ip_address = None;
        let vector = engine.compute(&event);
        assert!((vector.ip_risk - DEFAULT_IP_RISK).abs() < 1e-9);
        assert!(!vector.computation.cache_hit);
    }

    #[test]
    fn computed_vector_passes_its_own_invariants() {
        let engine = engine();
        let vector = engine.compute(&sample_event());
        assert!(vector.validate().is_ok());
    }

    #[test]
    fn claim_events_carry_no_channel() {
        let engine = engine();
        let mut event = sample_event();
        event.payload = EventPayload::Claim(fraud_core::ClaimPayload {
            amount: 500.0,
            currency: "USD".to_string(),
            claim_type: fraud_core::ClaimType::Auto,
        });
        let vector = engine.compute(&event);
        assert!(vector.channel.is_none());
    }
}
