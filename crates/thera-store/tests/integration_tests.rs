//! Integration tests for thera-store
//!
//! These tests exercise the catalog, result and checkpoint files together,
//! the way a worker uses them across reruns.

use std::collections::BTreeSet;
use thera_domain::traits::{ResultStore, WorkCatalog};
use thera_domain::{CandidateRecord, Confidence, DefectKind, Outcome, ResultSet, RunId};
use thera_store::{CheckpointFile, JsonCatalog, JsonResultStore, StoreError};

fn write_catalog(dir: &std::path::Path, names: &[&str]) -> JsonCatalog {
    let entries: Vec<_> = names
        .iter()
        .map(|n| serde_json::json!({ "name": n, "description": format!("about {}", n) }))
        .collect();
    let path = dir.join("catalog.json");
    std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();
    JsonCatalog::new(path)
}

fn record(label: &str, confidence: f64) -> CandidateRecord {
    CandidateRecord {
        label: label.to_string(),
        confidence: Confidence::clamped(confidence),
        evidence: true,
        citations: vec!["12345678".to_string()],
        rationale: "Stated in abstract.".to_string(),
        extracted_at: 1_700_000_000,
    }
}

#[test]
fn test_catalog_and_store_drive_pending_set() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), &["warfarin", "aspirin", "metformin"]);
    let store = JsonResultStore::new(dir.path().join("results"));

    let all = catalog.load_all().unwrap();
    assert_eq!(all.len(), 3);
    assert!(store.completed_ids().unwrap().is_empty());

    let run_id = RunId::new();
    store
        .save(&ResultSet::new("aspirin", vec![record("Fever", 0.9)], 0.6, run_id))
        .unwrap();

    let done = store.completed_ids().unwrap();
    let pending: Vec<_> = all.iter().filter(|i| !done.contains(&i.id)).map(|i| i.id.clone()).collect();
    assert_eq!(pending, vec!["metformin".to_string(), "warfarin".to_string()]);
}

#[test]
fn test_persisted_document_shape() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonResultStore::new(dir.path());
    let result = ResultSet::new(
        "lisinopril",
        vec![record("Hypertension", 0.85), record("Heart failure", 0.4)],
        0.6,
        RunId::new(),
    )
    .with_model_name("llama3.3:70b")
    .with_processing_time_ms(1234);

    store.save(&result).unwrap();

    let raw = std::fs::read_to_string(store.path_for("lisinopril")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json["metadata"]["work_item_id"], "lisinopril");
    assert_eq!(json["metadata"]["total_found"], 2);
    assert_eq!(json["metadata"]["confirmed_count"], 1);
    assert_eq!(json["metadata"]["processing_time_ms"], 1234);
    assert_eq!(json["metadata"]["model"], "llama3.3:70b");
    assert_eq!(json["metadata"]["confidence_threshold"], 0.6);
    assert_eq!(json["metadata"]["run_id"], result.run_id.to_string());
    assert_eq!(json["records"][0]["label"], "Hypertension");
    assert_eq!(json["records"][0]["evidence"], true);
    assert_eq!(json["records"][0]["citations"][0], "12345678");
    assert!(json.get("diagnostics").is_none());
}

#[test]
fn test_zero_record_document_has_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonResultStore::new(dir.path());
    let result = ResultSet::new("mystery", vec![], 0.6, RunId::new())
        .with_raw_reply("Indication 1:\nCONFIDENCE: 0.9")
        .with_outcome(Outcome::ParsingDefect(DefectKind::StructureUnparsed));

    store.save(&result).unwrap();

    let doc = store.load_document("mystery").unwrap().unwrap();
    let diagnostics = doc.diagnostics.unwrap();
    assert_eq!(diagnostics.outcome, "parsing_defect");
    assert_eq!(diagnostics.raw_reply, "Indication 1:\nCONFIDENCE: 0.9");
    assert!(doc.records.is_empty());
}

#[test]
fn test_two_stores_share_one_directory() {
    let dir = tempfile::tempdir().unwrap();
    let worker_a = JsonResultStore::new(dir.path());
    let worker_b = JsonResultStore::new(dir.path());

    worker_a.save(&ResultSet::new("a", vec![], 0.6, RunId::new())).unwrap();
    worker_b.save(&ResultSet::new("b", vec![], 0.6, RunId::new())).unwrap();

    let expected: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
    assert_eq!(worker_a.completed_ids().unwrap(), expected);
    assert!(worker_b.exists("a"));
}

#[test]
fn test_corrupt_result_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonResultStore::new(dir.path());
    std::fs::write(store.path_for("broken"), "{ not json").unwrap();

    assert!(store.exists("broken"));
    assert!(matches!(store.load("broken"), Err(StoreError::Serialization(_))));
}

#[test]
fn test_checkpoint_lives_beside_results() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint = CheckpointFile::for_chunk(dir.path(), 0, 25);
    checkpoint.save(&vec!["aspirin".to_string()]).unwrap();

    let store = JsonResultStore::new(dir.path());
    assert!(store.completed_ids().unwrap().is_empty());
    assert_eq!(
        checkpoint.load::<Vec<String>>().unwrap(),
        Some(vec!["aspirin".to_string()])
    );
}
