// fraud-core/src/core/decision.rs
// ============================================================================
// Module: Decision
// Description: Policy verdict record.
// Purpose: Canonical decision record published to alerts.decisions.v1.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! One `DecisionOutput` is produced per event by the decision engine (§4.4).
//! The action domain is fixed to four values everywhere in this pipeline
//! (§9 Open Question resolution: "Fix the action set to
//! `{allow, hold, block, escalate}` everywhere"), and `case_id` is `Some`
//! iff `action != Allow`.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::identifiers::CaseId;
use super::identifiers::EventId;
use super::identifiers::PolicyVersion;

/// Policy verdict. Fixed to four members everywhere in this pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// No intervention; the event proceeds.
    Allow,
    /// Held for manual review.
    Hold,
    /// Blocked outright.
    Block,
    /// Escalated to a specialized review queue.
    Escalate,
}

impl Action {
    /// Returns whether this action requires a case record (§3, §4.4, §9).
    #[must_use]
    pub const fn requires_case(self) -> bool {
        !matches!(self, Self::Allow)
    }
}

/// Decision output published to `alerts.decisions.v1` (§3, §4.4).
///
/// # Invariants
/// - `case_id` is `Some` iff `action != Allow` (§8 "Case coupling").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutput {
    /// Event this decision concerns.
    pub event_id: EventId,
    /// Calibrated risk score the policy thresholded against.
    pub risk: f64,
    /// The chosen action.
    pub action: Action,
    /// Policy version that produced this decision.
    pub policy_version: PolicyVersion,
    /// Ordered reason codes accumulated during evaluation.
    pub reasons: Vec<String>,
    /// Case identifier, present iff `action.requires_case()`.
    pub case_id: Option<CaseId>,
    /// Whether any watchlist (entity/IP/device) was hit.
    pub watchlist_hit: bool,
    /// Whether the velocity-anomaly detector flagged this event.
    pub velocity_anomaly: bool,
    /// Whether the graph-anomaly detector flagged this event.
    pub graph_anomaly: bool,
    /// Wall-clock time spent in the decision stage.
    #[serde(with = "duration_millis")]
    pub decision_latency: Duration,
}

impl DecisionOutput {
    /// Validates the action/case-id coupling invariant (§8 "Case coupling").
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when `case_id` and `action` disagree.
    pub fn validate(&self) -> Result<(), String> {
        match (self.action, &self.case_id) {
            (Action::Allow, Some(_)) => Err("allow decisions must not carry a case_id".to_string()),
            (action, None) if action.requires_case() => {
                Err(format!("{action:?} decisions must carry a case_id"))
            }
            _ => Ok(()),
        }
    }
}

/// Serializes `Duration` as whole milliseconds, matching how this pipeline
/// reports latencies elsewhere (`computation_time_ms`, `compute_time_ms`).
mod duration_millis {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        #[expect(clippy::cast_possible_truncation, reason = "decision latency fits in u64 ms")]
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(action: Action, case_id: Option<CaseId>) -> DecisionOutput {
        DecisionOutput {
            event_id: EventId::new("evt-1"),
            risk: 0.5,
            action,
            policy_version: PolicyVersion::new("v1"),
            reasons: vec![],
            case_id,
            watchlist_hit: false,
            velocity_anomaly: false,
            graph_anomaly: false,
            decision_latency: Duration::from_millis(10),
        }
    }

    #[test]
    fn allow_without_case_id_is_valid() {
        assert!(base(Action::Allow, None).validate().is_ok());
    }

    #[test]
    fn allow_with_case_id_is_invalid() {
        assert!(base(Action::Allow, Some(CaseId::generate())).validate().is_err());
    }

    #[test]
    fn hold_without_case_id_is_invalid() {
        assert!(base(Action::Hold, None).validate().is_err());
    }

    #[test]
    fn hold_with_case_id_is_valid() {
        assert!(base(Action::Hold, Some(CaseId::generate())).validate().is_ok());
    }
}
