// fraud-monitor-svc/src/engine.rs
// ============================================================================
// Module: Monitor Engine
// Description: Rolling-buffer drift, calibration, throughput, and latency
//              computation over the score/decision/feature streams.
// Purpose: Turn raw observations into the gauges and JSON snapshots §6
//          exposes, reusing fraud-core's pure PSI/Brier functions.
// Dependencies: fraud-core, metrics
// ============================================================================

//! ## Overview
//! [`MonitorEngine`] owns one bounded rolling buffer per tracked feature
//! (for PSI), one bounded rolling buffer per model version (for Brier), a
//! 60-timestamp throughput window, and two latency buffers (scoring,
//! decision). Every `observe_*` method both updates these buffers and
//! records the corresponding `metrics` gauge/counter/histogram, so the
//! Prometheus exposition and the JSON snapshot endpoints are always
//! computed from the same rolling state.
//!
//! Neither `ScoreOutput` nor `DecisionOutput` carries a ground-truth label
//! passthrough in this pipeline, so the Brier gauge always falls back to
//! the degenerate self-label `y = (score > 0.5)` and is tagged
//! `proxy_label = true` (§9 Open Question resolution).

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use fraud_core::Action;
use fraud_core::BRIER_WINDOW;
use fraud_core::BrierObservation;
use fraud_core::DecisionOutput;
use fraud_core::FeatureVector;
use fraud_core::PSI_MIN_OBSERVATIONS;
use fraud_core::ScoreOutput;
use fraud_core::Timestamp;
use fraud_core::brier_score;
use fraud_core::population_stability_index;
use fraud_core::proxy_label;
use serde::Serialize;

/// Upper bound on every rolling buffer except the Brier and throughput
/// windows, which have their own, smaller, explicitly fixed sizes
/// (§4.6 "All rolling buffers are bounded (default 10 000)").
const MAX_BUFFER: usize = 10_000;
/// Width of the throughput sliding window (§4.6).
const THROUGHPUT_WINDOW: usize = 60;
/// PSI alert threshold (§4.6).
const PSI_ALERT_THRESHOLD: f64 = 0.2;
/// Brier alert threshold (§4.6).
const BRIER_ALERT_THRESHOLD: f64 = 0.25;

/// Appends `value` to `buffer`, dropping the oldest entry once `cap` is
/// exceeded.
fn push_bounded<T>(buffer: &mut VecDeque<T>, value: T, cap: usize) {
    buffer.push_back(value);
    while buffer.len() > cap {
        buffer.pop_front();
    }
}

/// Per-feature drift reading.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReading {
    /// Population Stability Index between the buffer's two halves.
    pub psi: f64,
    /// Whether `psi` exceeds [`PSI_ALERT_THRESHOLD`].
    pub alert: bool,
    /// Number of observations the reading was computed over.
    pub observation_count: usize,
}

/// `GET /metrics/drift` response body.
#[derive(Debug, Clone, Serialize, Default)]
pub struct DriftSnapshot {
    /// Drift reading per tracked feature name, present once a feature has
    /// accumulated at least [`PSI_MIN_OBSERVATIONS`] observations.
    pub features: HashMap<String, DriftReading>,
}

/// Per-model calibration reading.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReading {
    /// Brier score over the model's trailing observation window.
    pub brier: f64,
    /// Whether `brier` exceeds [`BRIER_ALERT_THRESHOLD`].
    pub alert: bool,
    /// Whether the ground-truth labels are the degenerate self-label.
    pub proxy_label: bool,
    /// Number of observations the reading was computed over.
    pub observation_count: usize,
}

/// `GET /metrics/calibration` response body.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CalibrationSnapshot {
    /// Calibration reading per model version.
    pub models: HashMap<String, CalibrationReading>,
}

/// Summary statistics over a bounded latency buffer.
#[derive(Debug, Clone, Serialize, Default)]
pub struct LatencyStats {
    /// Number of observations in the buffer.
    pub count: usize,
    /// Arithmetic mean latency, in milliseconds.
    pub mean_ms: f64,
    /// 50th percentile latency, in milliseconds.
    pub p50_ms: f64,
    /// 95th percentile latency, in milliseconds.
    pub p95_ms: f64,
    /// 99th percentile latency, in milliseconds.
    pub p99_ms: f64,
}

/// `GET /metrics/latency` response body.
#[derive(Debug, Clone, Serialize, Default)]
pub struct LatencySnapshot {
    /// Latency statistics for the scoring stage.
    pub scoring: LatencyStats,
    /// Latency statistics for the decision stage.
    pub decision: LatencyStats,
}

/// Computes [`LatencyStats`] over `samples`, which need not be sorted.
fn latency_stats(samples: &VecDeque<f64>) -> LatencyStats {
    if samples.is_empty() {
        return LatencyStats::default();
    }
    let mut sorted: Vec<f64> = samples.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let count = sorted.len();
    let mean_ms = sorted.iter().sum::<f64>() / count as f64;
    LatencyStats {
        count,
        mean_ms,
        p50_ms: percentile(&sorted, 0.50),
        p95_ms: percentile(&sorted, 0.95),
        p99_ms: percentile(&sorted, 0.99),
    }
}

/// Nearest-rank percentile over an already-sorted, non-empty slice.
fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    let rank = ((sorted.len() - 1) as f64 * fraction).round();
    #[expect(clippy::cast_possible_truncation, reason = "rank is clamped within sorted's length above")]
    #[expect(clippy::cast_sign_loss, reason = "rank is non-negative: fraction is in [0, 1]")]
    let index = (rank as usize).min(sorted.len() - 1);
    sorted[index]
}

/// Returns the label `metrics` should carry for one decision action.
const fn action_label(action: Action) -> &'static str {
    match action {
        Action::Allow => "allow",
        Action::Hold => "hold",
        Action::Block => "block",
        Action::Escalate => "escalate",
    }
}

/// Rolling-buffer state backing the drift, calibration, throughput, and
/// latency gauges (§4.6).
pub struct MonitorEngine {
    feature_buffers: Mutex<HashMap<String, VecDeque<f64>>>,
    brier_buffers: Mutex<HashMap<String, VecDeque<BrierObservation>>>,
    decision_timestamps: Mutex<VecDeque<Timestamp>>,
    scoring_latency_ms: Mutex<VecDeque<f64>>,
    decision_latency_ms: Mutex<VecDeque<f64>>,
}

impl Default for MonitorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorEngine {
    /// Builds an empty monitor engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            feature_buffers: Mutex::new(HashMap::new()),
            brier_buffers: Mutex::new(HashMap::new()),
            decision_timestamps: Mutex::new(VecDeque::with_capacity(THROUGHPUT_WINDOW)),
            scoring_latency_ms: Mutex::new(VecDeque::new()),
            decision_latency_ms: Mutex::new(VecDeque::new()),
        }
    }

    /// Records one computed feature vector's tracked numeric fields into
    /// their rolling buffers and gauges (§4.6 "PSI drift").
    pub fn observe_feature_vector(&self, features: &FeatureVector) {
        self.push_feature("amount", features.amount);
        self.push_feature("ip_risk", features.ip_risk);
        self.push_feature("merchant_risk", features.merchant_risk);
        self.push_feature("geo_distance_km", features.geo_distance_km);
        #[expect(clippy::cast_precision_loss, reason = "velocity counts are small enough for exact f64 PSI bucketing")]
        self.push_feature("velocity_1h", features.velocity.window_1h as f64);
    }

    /// Pushes one value onto a named feature's rolling buffer and mirrors
    /// it as a `metrics` gauge.
    fn push_feature(&self, name: &'static str, value: f64) {
        let mut buffers = self.feature_buffers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        push_bounded(buffers.entry(name.to_string()).or_default(), value, MAX_BUFFER);
        metrics::gauge!("fraud_feature_value", "feature" => name).set(value);
    }

    /// Records one score output's calibrated probability against the
    /// proxy label and the scoring-stage latency (§4.6 "Calibration").
    pub fn observe_score(&self, score: &ScoreOutput) {
        let predicted = score.scores.calibrated;
        let observation = BrierObservation { predicted, label: proxy_label(predicted) };
        {
            let mut buffers = self.brier_buffers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            push_bounded(
                buffers.entry(score.model_version.as_str().to_string()).or_default(),
                observation,
                BRIER_WINDOW,
            );
        }
        #[expect(clippy::cast_precision_loss, reason = "millisecond latencies stay well within f64's exact range")]
        let latency_ms = score.computation_time_ms as f64;
        {
            let mut buffer = self.scoring_latency_ms.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            push_bounded(&mut buffer, latency_ms, MAX_BUFFER);
        }
        metrics::histogram!("fraud_scoring_latency_ms").record(latency_ms);
    }

    /// Records one decision's throughput timestamp, action counter, and
    /// decision-stage latency (§4.6 "Throughput", "Latency histograms").
    pub fn observe_decision(&self, decision: &DecisionOutput) {
        {
            let mut timestamps =
                self.decision_timestamps.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            push_bounded(&mut timestamps, Timestamp::now(), THROUGHPUT_WINDOW);
        }
        let latency_ms = decision.decision_latency.as_secs_f64() * 1000.0;
        {
            let mut buffer = self.decision_latency_ms.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            push_bounded(&mut buffer, latency_ms, MAX_BUFFER);
        }
        metrics::histogram!("fraud_decision_latency_ms").record(latency_ms);
        metrics::counter!("fraud_decisions_total", "action" => action_label(decision.action)).increment(1);
        metrics::gauge!("fraud_decisions_throughput_per_sec").set(self.throughput_per_sec());
    }

    /// Computes decisions/sec over the trailing throughput window: `n /
    /// (t_last - t_first)`. Returns `0.0` until at least two timestamps
    /// have been observed.
    #[must_use]
    pub fn throughput_per_sec(&self) -> f64 {
        let timestamps = self.decision_timestamps.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let (Some(first), Some(last)) = (timestamps.front(), timestamps.back()) else {
            return 0.0;
        };
        let elapsed = last.seconds_since(*first);
        if elapsed <= 0.0 {
            return 0.0;
        }
        timestamps.len() as f64 / elapsed
    }

    /// Builds the `GET /metrics/drift` snapshot (§6).
    #[must_use]
    pub fn drift_snapshot(&self) -> DriftSnapshot {
        let buffers = self.feature_buffers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut features = HashMap::new();
        for (name, buffer) in buffers.iter() {
            if buffer.len() < PSI_MIN_OBSERVATIONS {
                continue;
            }
            let values: Vec<f64> = buffer.iter().copied().collect();
            let midpoint = values.len() / 2;
            let (reference, current) = values.split_at(midpoint);
            let psi = population_stability_index(reference, current);
            metrics::gauge!("fraud_feature_psi", "feature" => name.clone()).set(psi);
            features.insert(
                name.clone(),
                DriftReading { psi, alert: psi > PSI_ALERT_THRESHOLD, observation_count: values.len() },
            );
        }
        DriftSnapshot { features }
    }

    /// Builds the `GET /metrics/calibration` snapshot (§6).
    #[must_use]
    pub fn calibration_snapshot(&self) -> CalibrationSnapshot {
        let buffers = self.brier_buffers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut models = HashMap::new();
        for (model_version, buffer) in buffers.iter() {
            if buffer.is_empty() {
                continue;
            }
            let observations: Vec<BrierObservation> = buffer.iter().copied().collect();
            let brier = brier_score(&observations);
            metrics::gauge!("fraud_model_brier_score", "model_version" => model_version.clone()).set(brier);
            models.insert(
                model_version.clone(),
                CalibrationReading {
                    brier,
                    alert: brier > BRIER_ALERT_THRESHOLD,
                    proxy_label: true,
                    observation_count: observations.len(),
                },
            );
        }
        CalibrationSnapshot { models }
    }

    /// Builds the `GET /metrics/latency` snapshot (§6).
    #[must_use]
    pub fn latency_snapshot(&self) -> LatencySnapshot {
        let scoring = self.scoring_latency_ms.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let decision = self.decision_latency_ms.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        LatencySnapshot { scoring: latency_stats(&scoring), decision: latency_stats(&decision) }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use fraud_core::ComputationMeta;
    use fraud_core::EntityId;
    use fraud_core::EventId;
    use fraud_core::Explanation;
    use fraud_core::ModelScores;
    use fraud_core::ModelVersion;
    use fraud_core::PolicyVersion;
    use fraud_core::VelocityCounts;

    use super::*;

    fn sample_features(amount: f64, seed: u32) -> FeatureVector {
        FeatureVector {
            event_id: EventId::new(format!("evt-{seed}")),
            entity_id: EntityId::new("ent-1"),
            computed_at: Timestamp::now(),
            amount,
            currency: "USD".to_string(),
            channel: None,
            velocity: VelocityCounts { window_1h: u64::from(seed % 5), window_24h: 0, window_7d: 0 },
            ip_risk: 0.1,
            merchant_risk: 0.2,
            geolocation: None,
            geo_distance_km: 10.0,
            account_age_days: 30,
            device_fingerprint: None,
            session_id: None,
            user_agent_hash: None,
            schema_version: 1,
            computation: ComputationMeta { compute_time_ms: 0, cache_hit: true, data_freshness_minutes: 0 },
        }
    }

    fn sample_score(calibrated: f64, computation_time_ms: u64) -> ScoreOutput {
        ScoreOutput {
            event_id: EventId::new("evt-score"),
            scores: ModelScores { xgb: calibrated, nn: calibrated, rules: calibrated, ensemble: calibrated, calibrated },
            explain: Explanation::default(),
            model_version: ModelVersion::new("ensemble-v1"),
            computation_time_ms,
        }
    }

    fn sample_decision(action: Action, latency_ms: u64) -> DecisionOutput {
        DecisionOutput {
            event_id: EventId::new("evt-decision"),
            risk: 0.5,
            action,
            policy_version: PolicyVersion::new("baseline"),
            reasons: Vec::new(),
            case_id: None,
            watchlist_hit: false,
            velocity_anomaly: false,
            graph_anomaly: false,
            decision_latency: Duration::from_millis(latency_ms),
        }
    }

    #[test]
    fn drift_snapshot_is_empty_below_the_minimum_observation_count() {
        let engine = MonitorEngine::new();
        for seed in 0..50 {
            engine.observe_feature_vector(&sample_features(100.0, seed));
        }
        assert!(engine.drift_snapshot().features.is_empty());
    }

    #[test]
    fn identical_distribution_reports_near_zero_drift() {
        let engine = MonitorEngine::new();
        for seed in 0..400 {
            engine.observe_feature_vector(&sample_features(f64::from(seed % 50), seed));
        }
        let snapshot = engine.drift_snapshot();
        let reading = snapshot.features.get("amount").expect("amount tracked");
        assert!(reading.psi < 1e-6, "psi was {}", reading.psi);
        assert!(!reading.alert);
    }

    #[test]
    fn calibration_snapshot_tags_proxy_labels() {
        let engine = MonitorEngine::new();
        engine.observe_score(&sample_score(0.9, 5));
        engine.observe_score(&sample_score(0.9, 5));
        let snapshot = engine.calibration_snapshot();
        let reading = snapshot.models.get("ensemble-v1").expect("model tracked");
        assert!(reading.proxy_label);
        assert!(reading.brier < 1e-9, "brier was {}", reading.brier);
    }

    #[test]
    fn latency_snapshot_reflects_observed_samples() {
        let engine = MonitorEngine::new();
        engine.observe_score(&sample_score(0.2, 10));
        engine.observe_decision(&sample_decision(Action::Hold, 20));
        let snapshot = engine.latency_snapshot();
        assert_eq!(snapshot.scoring.count, 1);
        assert_eq!(snapshot.decision.count, 1);
        assert!((snapshot.scoring.mean_ms - 10.0).abs() < 1e-9);
        assert!((snapshot.decision.mean_ms - 20.0).abs() < 1e-9);
    }

    #[test]
    fn throughput_is_zero_with_fewer_than_two_decisions() {
        let engine = MonitorEngine::new();
        assert!((engine.throughput_per_sec() - 0.0).abs() < 1e-9);
        engine.observe_decision(&sample_decision(Action::Allow, 1));
        assert!((engine.throughput_per_sec() - 0.0).abs() < 1e-9);
    }
}
