// fraud-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Entity State Store
// Description: Simple in-memory entity state store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::interfaces::store
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`EntityStateStore`] for tests and local demos. It is not intended for
//! production use — production deployments back this trait with a real
//! shared key/value store (§5, §9) so correctness does not depend on which
//! process a worker happens to run in.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::core::identifiers::DeviceFingerprint;
use crate::core::identifiers::EntityId;
use crate::core::identifiers::MerchantId;
use crate::interfaces::store::EmaWindow;
use crate::interfaces::store::EntityStateStore;
use crate::interfaces::store::StoreError;
use crate::interfaces::store::VelocityWindow;

/// A cached value with an absolute expiry instant.
#[derive(Debug, Clone, Copy)]
struct Cached<T> {
    value: T,
    expires_at: Instant,
}

impl<T: Copy> Cached<T> {
    fn fresh(self, now: Instant) -> Option<T> {
        (now < self.expires_at).then_some(self.value)
    }
}

/// A device's distinct-entity set, each member tracked with its own expiry
/// so the 30-day graph-anomaly window ages members out individually.
#[derive(Debug, Default)]
struct DeviceEntitySet {
    members: HashMap<String, Instant>,
}

/// 30-day graph-anomaly membership window (§4.4).
const GRAPH_WINDOW: Duration = Duration::from_secs(30 * 24 * 3600);

#[derive(Debug, Default)]
struct Tables {
    velocity: HashMap<(String, &'static str), Cached<u64>>,
    usual_location: HashMap<String, (f64, f64)>,
    ip_risk: HashMap<String, Cached<f64>>,
    merchant_risk: HashMap<String, Cached<f64>>,
    account_age: HashMap<String, Cached<u32>>,
    velocity_ema: HashMap<(String, &'static str), f64>,
    device_entities: HashMap<String, DeviceEntitySet>,
}

/// In-memory entity state store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEntityStateStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryEntityStateStore {
    /// Creates a new, empty in-memory entity state store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Store("entity state store mutex poisoned".to_string()))
    }

    fn ema_key(window: EmaWindow) -> &'static str {
        match window {
            EmaWindow::OneHour => "1h",
            EmaWindow::TwentyFourHours => "24h",
        }
    }
}

impl EntityStateStore for InMemoryEntityStateStore {
    fn incr_velocity(&self, entity: &EntityId, window: VelocityWindow) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut tables = self.lock()?;
        let key = (entity.as_str().to_string(), window.key_suffix());
        let previous = tables.velocity.get(&key).and_then(|cached| cached.fresh(now)).unwrap_or(0);
        let ttl = Duration::from_secs(window.ttl_seconds());
        tables.velocity.insert(key, Cached { value: previous + 1, expires_at: now + ttl });
        Ok(previous)
    }

    fn usual_location(&self, entity: &EntityId) -> Result<Option<(f64, f64)>, StoreError> {
        Ok(self.lock()?.usual_location.get(entity.as_str()).copied())
    }

    fn init_usual_location(&self, entity: &EntityId, point: (f64, f64)) -> Result<(), StoreError> {
        self.lock()?.usual_location.entry(entity.as_str().to_string()).or_insert(point);
        Ok(())
    }

    fn set_usual_location(&self, entity: &EntityId, point: (f64, f64)) -> Result<(), StoreError> {
        self.lock()?.usual_location.insert(entity.as_str().to_string(), point);
        Ok(())
    }

    fn cached_ip_risk(&self, ip: &str) -> Result<Option<f64>, StoreError> {
        let now = Instant::now();
        Ok(self.lock()?.ip_risk.get(ip).and_then(|cached| cached.fresh(now)))
    }

    fn set_cached_ip_risk(&self, ip: &str, value: f64) -> Result<(), StoreError> {
        let expires_at = Instant::now() + Duration::from_secs(3600);
        self.lock()?.ip_risk.insert(ip.to_string(), Cached { value, expires_at });
        Ok(())
    }

    fn cached_merchant_risk(&self, merchant: &MerchantId) -> Result<Option<f64>, StoreError> {
        let now = Instant::now();
        Ok(self.lock()?.merchant_risk.get(merchant.as_str()).and_then(|cached| cached.fresh(now)))
    }

    fn set_cached_merchant_risk(&self, merchant: &MerchantId, value: f64) -> Result<(), StoreError> {
        let expires_at = Instant::now() + Duration::from_secs(86_400);
        self.lock()?.merchant_risk.insert(merchant.as_str().to_string(), Cached { value, expires_at });
        Ok(())
    }

    fn cached_account_age_days(&self, entity: &EntityId) -> Result<Option<u32>, StoreError> {
        let now = Instant::now();
        Ok(self.lock()?.account_age.get(entity.as_str()).and_then(|cached| cached.fresh(now)))
    }

    fn set_cached_account_age_days(&self, entity: &EntityId, value: u32) -> Result<(), StoreError> {
        let expires_at = Instant::now() + Duration::from_secs(86_400);
        self.lock()?.account_age.insert(entity.as_str().to_string(), Cached { value, expires_at });
        Ok(())
    }

    fn velocity_ema(&self, entity: &EntityId, window: EmaWindow) -> Result<Option<f64>, StoreError> {
        let key = (entity.as_str().to_string(), Self::ema_key(window));
        Ok(self.lock()?.velocity_ema.get(&key).copied())
    }

    fn set_velocity_ema(&self, entity: &EntityId, window: EmaWindow, value: f64) -> Result<(), StoreError> {
        let key = (entity.as_str().to_string(), Self::ema_key(window));
        self.lock()?.velocity_ema.insert(key, value);
        Ok(())
    }

    fn record_device_entity(
        &self,
        device: &DeviceFingerprint,
        entity: &EntityId,
    ) -> Result<usize, StoreError> {
        let now = Instant::now();
        let mut tables = self.lock()?;
        let set = tables.device_entities.entry(device.as_str().to_string()).or_default();
        set.members.retain(|_, &mut expires_at| expires_at > now);
        set.members.insert(entity.as_str().to_string(), now + GRAPH_WINDOW);
        Ok(set.members.len())
    }
}

/// Shared entity state store backed by an `Arc` trait object, so worker
/// count scales independently of state (§5, §9).
#[derive(Clone)]
pub struct SharedEntityStateStore {
    inner: Arc<dyn EntityStateStore + Send + Sync>,
}

impl SharedEntityStateStore {
    /// Wraps a store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl EntityStateStore + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(store) }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn EntityStateStore + Send + Sync>) -> Self {
        Self { inner: store }
    }
}

impl EntityStateStore for SharedEntityStateStore {
    fn incr_velocity(&self, entity: &EntityId, window: VelocityWindow) -> Result<u64, StoreError> {
        self.inner.incr_velocity(entity, window)
    }

    fn usual_location(&self, entity: &EntityId) -> Result<Option<(f64, f64)>, StoreError> {
        self.inner.usual_location(entity)
    }

    fn init_usual_location(&self, entity: &EntityId, point: (f64, f64)) -> Result<(), StoreError> {
        self.inner.init_usual_location(entity, point)
    }

    fn set_usual_location(&self, entity: &EntityId, point: (f64, f64)) -> Result<(), StoreError> {
        self.inner.set_usual_location(entity, point)
    }

    fn cached_ip_risk(&self, ip: &str) -> Result<Option<f64>, StoreError> {
        self.inner.cached_ip_risk(ip)
    }

    fn set_cached_ip_risk(&self, ip: &str, value: f64) -> Result<(), StoreError> {
        self.inner.set_cached_ip_risk(ip, value)
    }

    fn cached_merchant_risk(&self, merchant: &MerchantId) -> Result<Option<f64>, StoreError> {
        self.inner.cached_merchant_risk(merchant)
    }

    fn set_cached_merchant_risk(&self, merchant: &MerchantId, value: f64) -> Result<(), StoreError> {
        self.inner.set_cached_merchant_risk(merchant, value)
    }

    fn cached_account_age_days(&self, entity: &EntityId) -> Result<Option<u32>, StoreError> {
        self.inner.cached_account_age_days(entity)
    }

    fn set_cached_account_age_days(&self, entity: &EntityId, value: u32) -> Result<(), StoreError> {
        self.inner.set_cached_account_age_days(entity, value)
    }

    fn velocity_ema(&self, entity: &EntityId, window: EmaWindow) -> Result<Option<f64>, StoreError> {
        self.inner.velocity_ema(entity, window)
    }

    fn set_velocity_ema(&self, entity: &EntityId, window: EmaWindow, value: f64) -> Result<(), StoreError> {
        self.inner.set_velocity_ema(entity, window, value)
    }

    fn record_device_entity(
        &self,
        device: &DeviceFingerprint,
        entity: &EntityId,
    ) -> Result<usize, StoreError> {
        self.inner.record_device_entity(device, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_read_excludes_current_event() {
        let store = InMemoryEntityStateStore::new();
        let entity = EntityId::new("ent-1");
        assert_eq!(store.incr_velocity(&entity, VelocityWindow::OneHour).expect("incr"), 0);
        assert_eq!(store.incr_velocity(&entity, VelocityWindow::OneHour).expect("incr"), 1);
        assert_eq!(store.incr_velocity(&entity, VelocityWindow::OneHour).expect("incr"), 2);
    }

    #[test]
    fn usual_location_lazy_inits_once() {
        let store = InMemoryEntityStateStore::new();
        let entity = EntityId::new("ent-1");
        store.init_usual_location(&entity, (1.0, 2.0)).expect("init");
        store.init_usual_location(&entity, (9.0, 9.0)).expect("init again");
        assert_eq!(store.usual_location(&entity).expect("read"), Some((1.0, 2.0)));
    }

    #[test]
    fn device_entity_set_cardinality_grows_with_distinct_entities() {
        let store = InMemoryEntityStateStore::new();
        let device = DeviceFingerprint::new("dev-1");
        for i in 0..6 {
            let entity = EntityId::new(format!("ent-{i}"));
            let count = store.record_device_entity(&device, &entity).expect("record");
            assert_eq!(count, i + 1);
        }
    }
}
