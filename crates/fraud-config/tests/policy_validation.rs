//! Policy validation tests for fraud-config.
// fraud-config/tests/policy_validation.rs
// ============================================================================
// Module: Policy Validation Tests
// Description: Tests for Policy baseline evaluation, validation, and reload.
// Purpose: Ensure the decision policy is fail-closed and deterministic.
// ============================================================================

use fraud_config::Policy;
use fraud_config::PolicyFacts;
use fraud_config::PolicyStore;
use fraud_core::Action;
use fraud_core::PolicyVersion;
use fraud_core::Timestamp;

type TestResult = Result<(), String>;

fn baseline() -> Policy {
    Policy::baseline(PolicyVersion::new("v1"), Timestamp::now())
}

#[test]
fn scenario_threshold_hold_matches_section_eight() -> TestResult {
    let policy = baseline();
    let reasons = vec!["untrusted_channel".to_string()];
    let facts = PolicyFacts { calibrated: 0.75, reasons: &reasons };
    let (action, _) = policy.evaluate_baseline(&facts).map_err(|err| err.to_string())?;
    if action != Action::Hold {
        return Err(format!("expected hold, got {action:?}"));
    }
    Ok(())
}

#[test]
fn low_risk_allows_without_case() -> TestResult {
    let policy = baseline();
    let reasons = Vec::new();
    let facts = PolicyFacts { calibrated: 0.05, reasons: &reasons };
    let (action, _) = policy.evaluate_baseline(&facts).map_err(|err| err.to_string())?;
    if action != Action::Allow {
        return Err(format!("expected allow, got {action:?}"));
    }
    Ok(())
}

#[test]
fn empty_rule_groups_fail_validation() -> TestResult {
    let mut policy = baseline();
    policy.rule_groups.clear();
    if policy.validate().is_ok() {
        return Err("expected validation failure for empty rule groups".to_string());
    }
    Ok(())
}

#[test]
fn reload_is_atomic_and_rejects_bad_policy() -> TestResult {
    let store = PolicyStore::new(baseline());
    let mut reloaded = baseline();
    reloaded.block_threshold = 0.99;
    store.reload(reloaded).map_err(|err| err.to_string())?;
    if (store.current().block_threshold - 0.99).abs() > 1e-9 {
        return Err("reload did not take effect".to_string());
    }

    let mut bad = baseline();
    bad.hold_threshold = 1.5;
    if store.reload(bad).is_ok() {
        return Err("expected reload to reject an invalid policy".to_string());
    }
    if (store.current().block_threshold - 0.99).abs() > 1e-9 {
        return Err("a rejected reload must not change the active policy".to_string());
    }
    Ok(())
}

#[test]
fn platt_params_fall_back_to_default_model_version() -> TestResult {
    let policy = baseline();
    let params = policy.platt_params_for(&fraud_core::ModelVersion::new("unknown-version"));
    if (params.k - fraud_config::DEFAULT_PLATT_PARAMS.k).abs() > 1e-9 {
        return Err("expected fallback to default platt params".to_string());
    }
    Ok(())
}
