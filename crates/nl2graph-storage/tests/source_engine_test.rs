//! Source store tests: JSON loading, filtering and lookups.

use nl2graph_core::config::StorageConfig;
use nl2graph_core::errors::StorageError;
use nl2graph_core::traits::storage::ISourceStore;
use nl2graph_core::RecordFilter;
use nl2graph_storage::SourceStorageEngine;
use serde_json::json;
use tempfile::TempDir;

fn write_dataset(dir: &TempDir, items: serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("data.json");
    std::fs::write(&path, serde_json::to_string(&items).unwrap()).unwrap();
    path
}

#[test]
fn init_from_json_loads_and_filters() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(
        &dir,
        json!([
            {"id": "q1", "question": "a?", "answer": ["A"], "hop": 1, "split": "test"},
            {"id": "q2", "question": "b?", "answer": ["B", "C"], "hop": 2, "split": "test"},
            {"id": 3, "question": "c?", "answer": [], "hop": 1, "split": "train"}
        ]),
    );
    let engine = SourceStorageEngine::open(&dir.path().join("src.db"), &StorageConfig::default()).unwrap();

    assert_eq!(engine.init_from_json(&data).unwrap(), 3);
    assert_eq!(engine.count().unwrap(), 3);
    assert!(engine.exists("3").unwrap());

    let q2 = engine.get("q2").unwrap().unwrap();
    assert_eq!(q2.answer, vec![json!("B"), json!("C")]);
    assert_eq!(q2.extra.get("hop"), Some(&json!(2)));

    let hop1 = engine
        .iter_by_filter(&RecordFilter::from_hop_split(Some(1), None))
        .unwrap();
    let ids: Vec<_> = hop1.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "q1"]);

    let test_hop1 = engine
        .iter_by_filter(&RecordFilter::from_hop_split(Some(1), Some("test")))
        .unwrap();
    assert_eq!(test_hop1.len(), 1);
    assert_eq!(engine.iter_all().unwrap().len(), 3);
}

#[test]
fn reloading_replaces_existing_ids() {
    let dir = TempDir::new().unwrap();
    let engine = SourceStorageEngine::open(&dir.path().join("src.db"), &StorageConfig::default()).unwrap();
    let first = write_dataset(&dir, json!([{"id": "q1", "question": "old", "answer": []}]));
    engine.init_from_json(&first).unwrap();
    let second = write_dataset(&dir, json!([{"id": "q1", "question": "new", "answer": []}]));
    assert_eq!(engine.init_from_json(&second).unwrap(), 1);
    assert_eq!(engine.get("q1").unwrap().unwrap().question, "new");
}

#[test]
fn items_without_id_are_rejected() {
    let dir = TempDir::new().unwrap();
    let engine = SourceStorageEngine::open_in_memory().unwrap();
    let data = write_dataset(&dir, json!([{"question": "no id", "answer": []}]));
    let err = engine.init_from_json(&data).unwrap_err();
    assert!(matches!(err, StorageError::Serialization { .. }));
    assert_eq!(engine.count().unwrap(), 0);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let engine = SourceStorageEngine::open_in_memory().unwrap();
    let err = engine.init_from_json(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));
}
