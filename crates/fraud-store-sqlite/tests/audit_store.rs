// fraud-store-sqlite/tests/audit_store.rs
// ============================================================================
// Module: Audit Store Integration Tests
// Description: Validate SQLite audit index and filesystem object store
//              behavior end to end.
// Purpose: Ensure durable persistence, idempotence, and the audit round trip.
// Dependencies: fraud-store-sqlite, fraud-core, tempfile
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use fraud_core::AuditIndexRow;
use fraud_core::AuditIndexStore;
use fraud_core::AuditRowFilter;
use fraud_core::EntityId;
use fraud_core::EventId;
use fraud_core::EvidenceBundle;
use fraud_core::EvidenceType;
use fraud_core::ObjectStore;
use fraud_core::PolicyVersion;
use fraud_core::Timestamp;
use fraud_store_sqlite::FsObjectStore;
use fraud_store_sqlite::ModelMetricRow;
use fraud_store_sqlite::PolicyRecordRow;
use fraud_store_sqlite::SqliteAuditIndexStore;
use fraud_store_sqlite::SqliteStoreConfig;
use fraud_store_sqlite::SqliteStoreMode;
use fraud_store_sqlite::SqliteSyncMode;
use serde_json::json;
use tempfile::TempDir;

type TestResult = Result<(), String>;

fn audit_store() -> (TempDir, SqliteAuditIndexStore) {
    let dir = TempDir::new().expect("tempdir");
    let config = SqliteStoreConfig {
        path: dir.path().join("audit.db"),
        busy_timeout_ms: 5_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    };
    let store = SqliteAuditIndexStore::new(&config).expect("open store");
    (dir, store)
}

#[test]
fn audit_round_trip_matches_evidence_hash() -> TestResult {
    let (_dir, audit_store) = audit_store();
    let fs_dir = TempDir::new().map_err(|err| err.to_string())?;
    let object_store = FsObjectStore::new(fs_dir.path()).map_err(|err| err.to_string())?;

    let bundle = EvidenceBundle::seal(
        fraud_core::BundleId::generate(),
        EventId::new("evt-100"),
        EvidenceType::Decision,
        json!({"action": "hold", "reasons": ["watchlist_match"]}),
        Timestamp::now(),
    )
    .map_err(|err| err.to_string())?;

    let key = format!("2024/03/05/{}.json", bundle.bundle_id);
    let payload = serde_json::to_vec(&bundle.payload).map_err(|err| err.to_string())?;
    object_store.put(&key, &payload).map_err(|err| err.to_string())?;

    let row = AuditIndexRow {
        event_id: bundle.event_id.clone(),
        event_type: "decision".to_string(),
        entity_id: EntityId::new("entity-42"),
        user_id: Some("fraud-decision-svc".to_string()),
        action: "hold".to_string(),
        details: bundle.payload.clone(),
        evidence_hash: bundle.content_hash.value.clone(),
        evidence_path: key.clone(),
        created_at: bundle.created_at,
    };
    audit_store.append(row).map_err(|err| err.to_string())?;

    let fetched = audit_store
        .latest_for_event(&bundle.event_id)
        .map_err(|err| err.to_string())?
        .ok_or("row must be present")?;
    let reread_bytes = object_store.get(&fetched.evidence_path).map_err(|err| err.to_string())?;
    let reread_payload: serde_json::Value =
        serde_json::from_slice(&reread_bytes).map_err(|err| err.to_string())?;
    if reread_payload != bundle.payload {
        return Err("re-read payload must match the sealed payload".to_string());
    }
    if fetched.evidence_hash != bundle.content_hash.value {
        return Err("stored evidence hash must match the sealed bundle hash".to_string());
    }
    Ok(())
}

#[test]
fn replay_with_same_event_id_is_idempotent_at_the_audit_layer() -> TestResult {
    let (_dir, store) = audit_store();
    let row = AuditIndexRow {
        event_id: EventId::new("evt-replay"),
        event_type: "feature".to_string(),
        entity_id: EntityId::new("entity-1"),
        user_id: None,
        action: "persisted".to_string(),
        details: json!({}),
        evidence_hash: "hash-1".to_string(),
        evidence_path: "2024/01/01/x.json".to_string(),
        created_at: Timestamp::now(),
    };
    store.append(row.clone()).map_err(|err| err.to_string())?;
    store.append(row).map_err(|err| err.to_string())
}

#[test]
fn list_respects_limit_and_offset() -> TestResult {
    let (_dir, store) = audit_store();
    for idx in 0..5 {
        let row = AuditIndexRow {
            event_id: EventId::new(format!("evt-{idx}")),
            event_type: "decision".to_string(),
            entity_id: EntityId::new("entity-9"),
            user_id: None,
            action: "allow".to_string(),
            details: json!({}),
            evidence_hash: format!("hash-{idx}"),
            evidence_path: format!("2024/01/01/{idx}.json"),
            created_at: Timestamp::now(),
        };
        store.append(row).map_err(|err| err.to_string())?;
    }
    let filter = AuditRowFilter { limit: 2, offset: 1, ..Default::default() };
    let rows = store.list(&filter).map_err(|err| err.to_string())?;
    if rows.len() != 2 {
        return Err(format!("expected 2 rows, got {}", rows.len()));
    }
    Ok(())
}

#[test]
fn active_policy_reflects_most_recent_reload() -> TestResult {
    let (_dir, store) = audit_store();
    store
        .insert_policy_record(&PolicyRecordRow {
            policy_config: json!({"block_threshold": 0.9}),
            version: PolicyVersion::new("v1"),
            is_active: true,
            effective_date: Timestamp::now(),
        })
        .map_err(|err| err.to_string())?;
    store
        .insert_policy_record(&PolicyRecordRow {
            policy_config: json!({"block_threshold": 0.95}),
            version: PolicyVersion::new("v2"),
            is_active: true,
            effective_date: Timestamp::now(),
        })
        .map_err(|err| err.to_string())?;
    let active =
        store.active_policy().map_err(|err| err.to_string())?.ok_or("expected active row")?;
    if active.version.as_str() != "v2" {
        return Err(format!("expected v2 active, got {}", active.version));
    }
    Ok(())
}

#[test]
fn model_metrics_are_queryable_after_recording() -> TestResult {
    let (_dir, store) = audit_store();
    store
        .record_model_metric(&ModelMetricRow {
            model_name: "ensemble".to_string(),
            metric_type: "brier".to_string(),
            metric_value: 0.08,
            metadata: json!({"proxy_label": true}),
            created_at: Timestamp::now(),
        })
        .map_err(|err| err.to_string())?;
    let rows =
        store.list_model_metrics("ensemble", "brier", 5).map_err(|err| err.to_string())?;
    if rows.len() != 1 {
        return Err("expected exactly one recorded metric".to_string());
    }
    Ok(())
}
