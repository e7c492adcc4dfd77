// fraud-config/src/policy.rs
// ============================================================================
// Module: Decision Policy
// Description: Versioned rule-group policy model for the decision engine.
// Purpose: Provide swappable, fail-closed policy evaluation for decisioning.
// Dependencies: fraud-core, rule-logic, serde
// ============================================================================

//! ## Overview
//! The decision engine evaluates a versioned, ordered list of rule groups
//! against a score record and side-signal facts. Rule groups are tried in
//! severity order `block → hold → allow`; the first matching group wins.
//! Override rules (watchlist hits, velocity anomaly, graph anomaly) are
//! applied by the decision engine itself after baseline evaluation — this
//! module only models the baseline policy and its atomic-swap reload path.
//!
//! Security posture: policy evaluation is a trust boundary; malformed
//! policy fails closed rather than defaulting to `allow`.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use fraud_core::Channel;
use fraud_core::ModelVersion;
use fraud_core::PolicyVersion;
use fraud_core::Timestamp;
use rule_logic::KleeneLogic;
use rule_logic::Requirement;
use rule_logic::TriPredicate;
use rule_logic::TriState;
use serde::Deserialize;
use serde::Serialize;

use crate::EnsembleWeights;
use crate::PlattParams;

/// Default block threshold (§4.4 baseline rules).
pub const DEFAULT_BLOCK_THRESHOLD: f64 = 0.90;
/// Default hold threshold (§4.4 baseline rules).
pub const DEFAULT_HOLD_THRESHOLD: f64 = 0.70;
/// Watchlist-override calibrated-score floor that escalates a hit to block.
pub const WATCHLIST_BLOCK_FLOOR: f64 = 0.8;
/// Calibrated-score floor for the `ip_proxy_match` block carve-out.
pub const IP_PROXY_MATCH_BLOCK_FLOOR: f64 = 0.80;

/// Facts a rule-group predicate may test, gathered by the decision engine
/// before policy evaluation (calibrated score, pre-rule reason codes).
#[derive(Debug, Clone, Copy)]
pub struct PolicyFacts<'a> {
    /// Final calibrated score for this event.
    pub calibrated: f64,
    /// Pre-rule reason codes already derived (§4.4 reason derivation).
    pub reasons: &'a [String],
}

impl PolicyFacts<'_> {
    fn has_reason(&self, code: &str) -> bool {
        self.reasons.iter().any(|reason| reason == code)
    }
}

/// A predicate over [`PolicyFacts`] used to build rule-group [`Requirement`]
/// trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorePredicate {
    /// True when `calibrated >= threshold`.
    CalibratedAtLeast {
        /// Threshold the calibrated score must meet or exceed.
        threshold: f64,
    },
    /// True when a given pre-rule reason code was derived for this event.
    HasReason {
        /// Reason code to test for, e.g. `"ip_proxy_match"`.
        code: String,
    },
}

impl TriPredicate for ScorePredicate {
    type Context<'a> = PolicyFacts<'a>;

    fn evaluate(&self, ctx: &Self::Context<'_>) -> TriState {
        let matched = match self {
            Self::CalibratedAtLeast { threshold } => ctx.calibrated >= *threshold,
            Self::HasReason { code } => ctx.has_reason(code),
        };
        TriState::from(matched)
    }
}

/// A rule group's severity, fixed to the three-level taxonomy from §4.4;
/// groups are evaluated `Block → Hold → Allow` and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleGroupSeverity {
    /// Blocks the event outright.
    Block,
    /// Holds the event for manual review.
    Hold,
    /// Allows the event through.
    Allow,
}

impl RuleGroupSeverity {
    /// Converts the severity into the resulting [`fraud_core::Action`].
    #[must_use]
    pub const fn into_action(self) -> fraud_core::Action {
        match self {
            Self::Block => fraud_core::Action::Block,
            Self::Hold => fraud_core::Action::Hold,
            Self::Allow => fraud_core::Action::Allow,
        }
    }
}

/// An ordered rule group: a predicate conjunction over [`PolicyFacts`] and
/// the `(action, reason_codes)` to apply when it matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleGroup {
    /// Severity / resulting action for this group.
    pub severity: RuleGroupSeverity,
    /// Requirement tree gating this group.
    pub when: Requirement<ScorePredicate>,
    /// Reason codes appended when this group matches.
    #[serde(default)]
    pub reason_codes: Vec<String>,
}

impl RuleGroup {
    /// Evaluates this rule group's requirement against the given facts.
    ///
    /// A requirement tree evaluating to [`TriState::Unknown`] is treated as
    /// non-matching: policy evaluation fails closed rather than guessing.
    #[must_use]
    pub fn matches(&self, facts: &PolicyFacts<'_>) -> bool {
        self.when.eval(facts, &KleeneLogic) == TriState::True
    }
}

/// Errors raised when validating a [`Policy`].
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// A threshold or weight was out of its valid range.
    #[error("policy invalid: {0}")]
    Invalid(String),
}

/// A versioned decision policy: baseline rule groups, thresholds, trusted
/// channels, ensemble weights, and per-model-version Platt parameters.
/// Mirrors the `decision_policy` table's shape (`policy_config`, `version`,
/// `is_active`, `effective_date`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Policy version identifier.
    pub version: PolicyVersion,
    /// When this policy version became effective.
    pub effective_date: Timestamp,
    /// Whether this is the currently active policy row.
    pub is_active: bool,
    /// Calibrated-score floor for the baseline `block` rule.
    pub block_threshold: f64,
    /// Calibrated-score floor for the baseline `hold` rule.
    pub hold_threshold: f64,
    /// Channels exempt from the `untrusted_channel` reason code.
    pub trusted_channels: HashSet<Channel>,
    /// Ensemble blending weights for `(xgb, nn, rules)`.
    pub ensemble_weights: EnsembleWeights,
    /// Platt calibration parameters keyed by model version; the `"default"`
    /// entry is used when a score carries no recognized model version.
    pub platt_params: HashMap<ModelVersion, PlattParams>,
    /// Ordered rule groups, tried `block → hold → allow`.
    pub rule_groups: Vec<RuleGroup>,
}

impl Policy {
    /// Builds the shipped baseline policy from §4.4: block when
    /// `calibrated >= block_threshold` or (`ip_proxy_match` and
    /// `calibrated >= 0.80`); else hold when `calibrated >= hold_threshold`
    /// or `velocity_high`; else allow.
    #[must_use]
    pub fn baseline(version: PolicyVersion, effective_date: Timestamp) -> Self {
        let block_threshold = DEFAULT_BLOCK_THRESHOLD;
        let hold_threshold = DEFAULT_HOLD_THRESHOLD;
        let block_group = RuleGroup {
            severity: RuleGroupSeverity::Block,
            when: Requirement::or(vec![
                Requirement::predicate(ScorePredicate::CalibratedAtLeast { threshold: block_threshold }),
                Requirement::and(vec![
                    Requirement::predicate(ScorePredicate::HasReason { code: "ip_proxy_match".to_string() }),
                    Requirement::predicate(ScorePredicate::CalibratedAtLeast {
                        threshold: IP_PROXY_MATCH_BLOCK_FLOOR,
                    }),
                ]),
            ]),
            reason_codes: Vec::new(),
        };
        let hold_group = RuleGroup {
            severity: RuleGroupSeverity::Hold,
            when: Requirement::or(vec![
                Requirement::predicate(ScorePredicate::CalibratedAtLeast { threshold: hold_threshold }),
                Requirement::predicate(ScorePredicate::HasReason { code: "velocity_high".to_string() }),
            ]),
            reason_codes: Vec::new(),
        };
        let allow_group =
            RuleGroup { severity: RuleGroupSeverity::Allow, when: Requirement::default(), reason_codes: Vec::new() };
        let mut platt_params = HashMap::new();
        platt_params.insert(ModelVersion::new("default"), crate::DEFAULT_PLATT_PARAMS);
        Self {
            version,
            effective_date,
            is_active: true,
            block_threshold,
            hold_threshold,
            trusted_channels: HashSet::from([Channel::Mobile]),
            ensemble_weights: crate::DEFAULT_ENSEMBLE_WEIGHTS,
            platt_params,
            rule_groups: vec![block_group, hold_group, allow_group],
        }
    }

    /// Evaluates the baseline rule groups in severity order and returns the
    /// first matching group's resulting action and reason codes.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if no rule group matches (should not happen
    /// given a valid policy, since the trailing `allow` group is trivially
    /// true, but evaluation fails closed rather than defaulting silently).
    pub fn evaluate_baseline(
        &self,
        facts: &PolicyFacts<'_>,
    ) -> Result<(fraud_core::Action, Vec<String>), PolicyError> {
        self.rule_groups
            .iter()
            .find(|group| group.matches(facts))
            .map(|group| (group.severity.into_action(), group.reason_codes.clone()))
            .ok_or_else(|| PolicyError::Invalid("no rule group matched; policy must end in a trivial allow".to_string()))
    }

    /// Returns the Platt parameters for the given model version, falling
    /// back to the `"default"` entry.
    #[must_use]
    pub fn platt_params_for(&self, model_version: &ModelVersion) -> PlattParams {
        self.platt_params
            .get(model_version)
            .or_else(|| self.platt_params.get(&ModelVersion::new("default")))
            .copied()
            .unwrap_or(crate::DEFAULT_PLATT_PARAMS)
    }

    /// Validates thresholds, weights, and rule-group structure.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the policy is internally inconsistent.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(0.0..=1.0).contains(&self.block_threshold) {
            return Err(PolicyError::Invalid("block_threshold must be in [0, 1]".to_string()));
        }
        if !(0.0..=1.0).contains(&self.hold_threshold) {
            return Err(PolicyError::Invalid("hold_threshold must be in [0, 1]".to_string()));
        }
        if self.hold_threshold > self.block_threshold {
            return Err(PolicyError::Invalid("hold_threshold must not exceed block_threshold".to_string()));
        }
        self.ensemble_weights
            .validate()
            .map_err(|err| PolicyError::Invalid(format!("ensemble_weights: {err}")))?;
        if self.rule_groups.is_empty() {
            return Err(PolicyError::Invalid("rule_groups must not be empty".to_string()));
        }
        let mut last_severity = None;
        for group in &self.rule_groups {
            if let Some(previous) = last_severity
                && group.severity < previous
            {
                return Err(PolicyError::Invalid(
                    "rule_groups must be ordered block -> hold -> allow".to_string(),
                ));
            }
            last_severity = Some(group.severity);
        }
        Ok(())
    }
}

/// Atomic-swap policy store: reload is a pointer swap to an immutable
/// record read under a lock-free load — no in-process mutation of a live
/// policy, only whole-record replacement.
#[derive(Clone)]
pub struct PolicyStore {
    current: Arc<ArcSwap<Policy>>,
}

impl PolicyStore {
    /// Creates a policy store seeded with the given policy.
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self { current: Arc::new(ArcSwap::from_pointee(policy)) }
    }

    /// Returns the currently active policy.
    #[must_use]
    pub fn current(&self) -> Arc<Policy> {
        self.current.load_full()
    }

    /// Atomically swaps in a new policy after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the replacement policy is invalid; the
    /// previously active policy remains in effect.
    pub fn reload(&self, policy: Policy) -> Result<(), PolicyError> {
        policy.validate()?;
        self.current.store(Arc::new(policy));
        Ok(())
    }
}
