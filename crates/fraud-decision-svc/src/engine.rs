// fraud-decision-svc/src/engine.rs
// ============================================================================
// Module: Decision Engine
// Description: Evaluates policy and side-signal detectors against one
//              scored event, producing a DecisionOutput.
// Purpose: Pure composition root for §4.4's override/baseline rule pipeline.
// Dependencies: fraud-core, fraud-config
// ============================================================================

//! ## Overview
//! [`DecisionEngine::decide`] is §4.4 end to end: derive pre-rule reason
//! codes, evaluate the active [`fraud_config::Policy`]'s baseline rule
//! groups, then apply the three override rules (watchlist, velocity
//! anomaly, graph anomaly) in that order. Watchlist and
//! velocity/graph state reads that fail are treated as "not flagged" rather
//! than aborting the decision — a side-signal detector going dark degrades
//! gracefully, unlike the policy evaluation itself, which fails closed.

use std::sync::Arc;
use std::time::Instant;

use fraud_config::Policy;
use fraud_config::PolicyError;
use fraud_config::PolicyFacts;
use fraud_config::PolicyStore;
use fraud_core::Action;
use fraud_core::CaseId;
use fraud_core::Channel;
use fraud_core::DecisionOutput;
use fraud_core::DeviceFingerprint;
use fraud_core::EmaWindow;
use fraud_core::EntityId;
use fraud_core::EntityStateStore as _;
use fraud_core::EventId;
use fraud_core::SharedEntityStateStore;
use fraud_core::StoreError;
use fraud_core::VELOCITY_EMA_ALPHA;
use fraud_core::WatchlistProvider;
use fraud_core::update_ema;

/// `velocity_1h` at or above this count derives the `velocity_high` reason
/// code (§4.4 "Reason derivation").
const VELOCITY_HIGH_THRESHOLD: u64 = 8;
/// `ip_risk` at or above this value derives the `ip_proxy_match` reason code.
const IP_PROXY_MATCH_THRESHOLD: f64 = 0.8;
/// Current 1h velocity above this multiple of its EMA is a velocity anomaly.
const VELOCITY_ANOMALY_1H_MULTIPLE: f64 = 3.0;
/// Current 24h velocity above this multiple of its EMA is a velocity anomaly.
const VELOCITY_ANOMALY_24H_MULTIPLE: f64 = 2.0;
/// A device fingerprint linked to more than this many distinct entities
/// within the tracked window is a graph anomaly.
const GRAPH_ANOMALY_ENTITY_LIMIT: usize = 5;
/// Calibrated-score floor above which a watchlist hit escalates to `block`
/// rather than `hold` (§4.4 override rule 1).
const WATCHLIST_BLOCK_FLOOR: f64 = 0.8;

/// Everything the decision engine needs about one scored event, gathered
/// by the caller by joining the event, feature, and score streams on
/// `event_id`.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    /// Event this decision concerns.
    pub event_id: EventId,
    /// Entity under assessment.
    pub entity_id: EntityId,
    /// Final calibrated risk score.
    pub calibrated: f64,
    /// Submission channel, when the source event carried one.
    pub channel: Option<Channel>,
    /// Current 1-hour velocity count (excludes this event).
    pub velocity_1h: u64,
    /// Current 24-hour velocity count (excludes this event).
    pub velocity_24h: u64,
    /// Cached IP reputation risk in `[0, 1]`.
    pub ip_risk: f64,
    /// Raw source IP, when the event carried one.
    pub ip_address: Option<String>,
    /// Device fingerprint, when the event carried one.
    pub device_fingerprint: Option<DeviceFingerprint>,
}

/// Errors raised while producing a decision.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// The active policy failed to evaluate (§4.4: fails closed).
    #[error("policy evaluation failed: {0}")]
    Policy(#[from] PolicyError),
    /// Per-entity state could not be read or updated.
    #[error("entity state store error: {0}")]
    Store(#[from] StoreError),
}

/// Evaluates the active policy and side-signal detectors for one event.
pub struct DecisionEngine {
    policy_store: PolicyStore,
    entity_store: SharedEntityStateStore,
    watchlist: Arc<dyn WatchlistProvider + Send + Sync>,
}

impl DecisionEngine {
    /// Builds a decision engine over the given policy store, entity state
    /// store, and watchlist provider.
    #[must_use]
    pub fn new(
        policy_store: PolicyStore,
        entity_store: SharedEntityStateStore,
        watchlist: Arc<dyn WatchlistProvider + Send + Sync>,
    ) -> Self {
        Self { policy_store, entity_store, watchlist }
    }

    /// Returns the currently active policy, for `GET /policy`.
    #[must_use]
    pub fn current_policy(&self) -> Arc<Policy> {
        self.policy_store.current()
    }

    /// Atomically swaps in a new policy, for `POST /policy/reload`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the replacement policy is invalid; the
    /// previously active policy remains in effect.
    pub fn reload_policy(&self, policy: Policy) -> Result<(), PolicyError> {
        self.policy_store.reload(policy)
    }

    /// Produces a decision for one scored event (§4.4).
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError`] if policy evaluation fails closed or an
    /// entity-state read/write fails.
    pub fn decide(&self, ctx: &DecisionContext) -> Result<DecisionOutput, DecisionError> {
        let start = Instant::now();
        let policy = self.policy_store.current();

        let mut reasons = self.pre_rule_reasons(ctx, &policy);
        let facts = PolicyFacts { calibrated: ctx.calibrated, reasons: &reasons };
        let (mut action, mut rule_reasons) = policy.evaluate_baseline(&facts)?;
        reasons.append(&mut rule_reasons);

        let watchlist_hit = self.apply_watchlist_override(ctx, &mut action, &mut reasons);
        let velocity_anomaly = self.apply_velocity_override(ctx, &mut action, &mut reasons)?;
        let graph_anomaly = self.apply_graph_override(ctx, &mut action, &mut reasons)?;

        let case_id = action.requires_case().then(CaseId::generate);

        Ok(DecisionOutput {
            event_id: ctx.event_id.clone(),
            risk: ctx.calibrated,
            action,
            policy_version: policy.version.clone(),
            reasons,
            case_id,
            watchlist_hit,
            velocity_anomaly,
            graph_anomaly,
            decision_latency: start.elapsed(),
        })
    }

    /// Derives the pre-rule reason codes (§4.4 "Reason derivation").
    fn pre_rule_reasons(&self, ctx: &DecisionContext, policy: &Policy) -> Vec<String> {
        let mut reasons = Vec::new();
        if ctx.velocity_1h >= VELOCITY_HIGH_THRESHOLD {
            reasons.push("velocity_high".to_string());
        }
        if ctx.ip_risk >= IP_PROXY_MATCH_THRESHOLD {
            reasons.push("ip_proxy_match".to_string());
        }
        let trusted = ctx.channel.is_some_and(|channel| policy.trusted_channels.contains(&channel));
        if !trusted {
            reasons.push("untrusted_channel".to_string());
        }
        reasons
    }

    /// Applies override rule 1 (watchlist escalation). A lookup failure is
    /// treated as "not listed" rather than aborting the decision.
    fn apply_watchlist_override(&self, ctx: &DecisionContext, action: &mut Action, reasons: &mut Vec<String>) -> bool {
        let entity_hit = self.watchlist.is_entity_listed(&ctx.entity_id).unwrap_or(false);
        let ip_hit =
            ctx.ip_address.as_deref().is_some_and(|ip| self.watchlist.is_ip_listed(ip).unwrap_or(false));
        let device_hit = ctx
            .device_fingerprint
            .as_ref()
            .is_some_and(|device| self.watchlist.is_device_listed(device).unwrap_or(false));

        if !(entity_hit || ip_hit || device_hit) {
            return false;
        }
        if entity_hit {
            reasons.push("entity_watchlist".to_string());
        }
        if ip_hit {
            reasons.push("ip_watchlist".to_string());
        }
        if device_hit {
            reasons.push("device_watchlist".to_string());
        }
        *action = if ctx.calibrated >= WATCHLIST_BLOCK_FLOOR { Action::Block } else { Action::Hold };
        true
    }

    /// Applies override rule 2 (velocity anomaly), updating the per-entity
    /// EMAs regardless of whether the override fires (§4.4: "EMA is updated
    /// after the check").
    fn apply_velocity_override(
        &self,
        ctx: &DecisionContext,
        action: &mut Action,
        reasons: &mut Vec<String>,
    ) -> Result<bool, DecisionError> {
        let ema_1h = self.entity_store.velocity_ema(&ctx.entity_id, EmaWindow::OneHour)?;
        let ema_24h = self.entity_store.velocity_ema(&ctx.entity_id, EmaWindow::TwentyFourHours)?;

        #[expect(clippy::cast_precision_loss, reason = "velocity counts never approach f64's 52-bit mantissa limit")]
        let (current_1h, current_24h) = (ctx.velocity_1h as f64, ctx.velocity_24h as f64);

        let anomaly_1h = ema_1h.is_some_and(|ema| current_1h > VELOCITY_ANOMALY_1H_MULTIPLE * ema);
        let anomaly_24h = ema_24h.is_some_and(|ema| current_24h > VELOCITY_ANOMALY_24H_MULTIPLE * ema);
        let anomaly = anomaly_1h || anomaly_24h;

        self.entity_store.set_velocity_ema(
            &ctx.entity_id,
            EmaWindow::OneHour,
            update_ema(ema_1h, current_1h, VELOCITY_EMA_ALPHA),
        )?;
        self.entity_store.set_velocity_ema(
            &ctx.entity_id,
            EmaWindow::TwentyFourHours,
            update_ema(ema_24h, current_24h, VELOCITY_EMA_ALPHA),
        )?;

        if anomaly && *action == Action::Allow {
            *action = Action::Hold;
            reasons.push("velocity_anomaly".to_string());
        }
        Ok(anomaly)
    }

    /// Applies override rule 3 (graph anomaly): a device fingerprint linked
    /// to more than [`GRAPH_ANOMALY_ENTITY_LIMIT`] distinct entities.
    fn apply_graph_override(
        &self,
        ctx: &DecisionContext,
        action: &mut Action,
        reasons: &mut Vec<String>,
    ) -> Result<bool, DecisionError> {
        let Some(device) = ctx.device_fingerprint.as_ref() else {
            return Ok(false);
        };
        let distinct_entities = self.entity_store.record_device_entity(device, &ctx.entity_id)?;
        let anomaly = distinct_entities > GRAPH_ANOMALY_ENTITY_LIMIT;
        if anomaly && *action == Action::Allow {
            *action = Action::Hold;
            reasons.push("graph_anomaly".to_string());
        }
        Ok(anomaly)
    }
}

#[cfg(test)]
mod tests {
    use fraud_config::Policy;
    use fraud_core::InMemoryEntityStateStore;
    use fraud_core::PolicyVersion;
    use fraud_core::Timestamp;
    use fraud_providers::StaticWatchlistProvider;

    use super::*;

    fn engine(watchlist: StaticWatchlistProvider) -> DecisionEngine {
        let policy = Policy::baseline(PolicyVersion::new("v1"), Timestamp::now());
        DecisionEngine::new(
            PolicyStore::new(policy),
            SharedEntityStateStore::from_store(InMemoryEntityStateStore::new()),
            Arc::new(watchlist),
        )
    }

    fn base_ctx() -> DecisionContext {
        DecisionContext {
            event_id: EventId::new("evt-1"),
            entity_id: EntityId::new("ent-1"),
            calibrated: 0.1,
            channel: Some(Channel::Mobile),
            velocity_1h: 1,
            velocity_24h: 1,
            ip_risk: 0.05,
            ip_address: Some("203.0.113.9".to_string()),
            device_fingerprint: None,
        }
    }

    #[test]
    fn low_risk_trusted_channel_is_allowed_with_no_case() {
        let engine = engine(StaticWatchlistProvider::default());
        let decision = engine.decide(&base_ctx()).expect("decide");
        assert_eq!(decision.action, Action::Allow);
        assert!(decision.case_id.is_none());
        assert!(decision.validate().is_ok());
    }

    #[test]
    fn high_calibrated_score_blocks_and_allocates_a_case() {
        let engine = engine(StaticWatchlistProvider::default());
        let mut ctx = base_ctx();
        ctx.calibrated = 0.95;
        let decision = engine.decide(&ctx).expect("decide");
        assert_eq!(decision.action, Action::Block);
        assert!(decision.case_id.is_some());
    }

    #[test]
    fn untrusted_channel_reason_is_derived_for_non_mobile_channels() {
        let engine = engine(StaticWatchlistProvider::default());
        let mut ctx = base_ctx();
        ctx.channel = Some(Channel::Web);
        let decision = engine.decide(&ctx).expect("decide");
        assert!(decision.reasons.contains(&"untrusted_channel".to_string()));
    }

    #[test]
    fn watchlist_hit_escalates_to_block_above_the_floor() {
        let watchlist = StaticWatchlistProvider::default().with_entity(EntityId::new("ent-1"));
        let engine = engine(watchlist);
        let mut ctx = base_ctx();
        ctx.calibrated = 0.85;
        let decision = engine.decide(&ctx).expect("decide");
        assert_eq!(decision.action, Action::Block);
        assert!(decision.watchlist_hit);
        assert!(decision.reasons.contains(&"entity_watchlist".to_string()));
    }

    #[test]
    fn watchlist_hit_below_floor_holds_instead_of_allowing() {
        let watchlist = StaticWatchlistProvider::default().with_entity(EntityId::new("ent-1"));
        let engine = engine(watchlist);
        let decision = engine.decide(&base_ctx()).expect("decide");
        assert_eq!(decision.action, Action::Hold);
    }

    #[test]
    fn velocity_anomaly_upgrades_an_allow_to_hold() {
        let engine = engine(StaticWatchlistProvider::default());
        let mut ctx = base_ctx();
        ctx.velocity_1h = 1;
        engine.decide(&ctx).expect("seed ema");
        ctx.velocity_1h = 20;
        let decision = engine.decide(&ctx).expect("decide");
        assert_eq!(decision.action, Action::Hold);
        assert!(decision.velocity_anomaly);
        assert!(decision.reasons.contains(&"velocity_anomaly".to_string()));
    }

    #[test]
    fn graph_anomaly_upgrades_an_allow_to_hold_past_the_entity_limit() {
        let engine = engine(StaticWatchlistProvider::default());
        let device = DeviceFingerprint::new("device-1");
        for index in 0..6 {
            let mut ctx = base_ctx();
            ctx.entity_id = EntityId::new(format!("ent-{index}"));
            ctx.device_fingerprint = Some(device.clone());
            let decision = engine.decide(&ctx).expect("decide");
            if index == 5 {
                assert_eq!(decision.action, Action::Hold);
                assert!(decision.graph_anomaly);
            }
        }
    }
}
