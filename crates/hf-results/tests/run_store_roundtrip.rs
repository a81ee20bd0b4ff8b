use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};
use hf_core::CartesianMesh;
use hf_results::{
    RecordedFields, ResultsError, RunManifest, RunProperties, RunStore, Snapshot, run_full_name,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn mesh() -> CartesianMesh {
    CartesianMesh::new(1.0, 1.0, 5, 5).unwrap()
}

fn manifest(name: &str, hour: u32) -> RunManifest {
    let created_at = Utc.with_ymd_and_hms(2026, 2, 25, hour, 0, 0).unwrap();
    RunManifest {
        run_name: name.to_string(),
        full_name: run_full_name(name, &created_at),
        created_at,
        properties: RunProperties {
            solver_version: "0.1.0".to_string(),
            mesh: mesh(),
            recorded: RecordedFields::default(),
            notes: None,
        },
        snapshot_count: 0,
    }
}

fn snapshots(times: &[f64]) -> Vec<Snapshot> {
    times
        .iter()
        .map(|&t| {
            let mut s = Snapshot::empty(t, mesh());
            s.width[12] = t * 1e-3;
            s
        })
        .collect()
}

#[test]
fn save_and_load_run() {
    let store = RunStore::new(unique_temp_dir("hf_results_roundtrip")).unwrap();
    let m = manifest("radial", 12);

    store.save_run(&m, &snapshots(&[0.0, 1.0, 2.5])).unwrap();

    let loaded = store.load_manifest(&m.full_name).unwrap();
    assert_eq!(loaded.run_name, "radial");
    assert_eq!(loaded.snapshot_count, 3);
    assert_eq!(loaded.properties.mesh, mesh());

    let loaded = store.load_snapshots(&m.full_name).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[2].time_s, 2.5);
    assert_eq!(loaded[2].width[12], 2.5e-3);

    let times = store.load_snapshot_times(&m.full_name).unwrap();
    assert_eq!(times, vec![0.0, 1.0, 2.5]);
}

#[test]
fn load_selected_snapshots_keeps_request_order() {
    let store = RunStore::new(unique_temp_dir("hf_results_selected")).unwrap();
    let m = manifest("radial", 12);
    store
        .save_run(&m, &snapshots(&[10.0, 50.0, 100.0, 150.0]))
        .unwrap();

    let picked = store.load_snapshots_at(&m.full_name, &[2, 0, 2]).unwrap();
    let times: Vec<f64> = picked.iter().map(|s| s.time_s).collect();
    assert_eq!(times, vec![100.0, 10.0, 100.0]);

    assert!(store.load_snapshots_at(&m.full_name, &[4]).is_err());
}

#[test]
fn resolve_picks_most_recent_run() {
    let store = RunStore::new(unique_temp_dir("hf_results_resolve")).unwrap();
    let older = manifest("radial", 9);
    let newer = manifest("radial", 17);
    let other = manifest("ellipse", 20);

    store.save_run(&older, &snapshots(&[0.0])).unwrap();
    store.save_run(&newer, &snapshots(&[0.0])).unwrap();
    store.save_run(&other, &snapshots(&[0.0])).unwrap();

    assert_eq!(store.resolve_run("radial").unwrap(), newer.full_name);
    assert_eq!(store.resolve_run(&older.full_name).unwrap(), older.full_name);

    let radial = store.list_runs(Some("radial")).unwrap();
    assert_eq!(radial.len(), 2);
    assert_eq!(radial[0].full_name, newer.full_name);

    assert_eq!(store.list_runs(None).unwrap().len(), 3);
}

#[test]
fn missing_runs_are_not_found() {
    let store = RunStore::open(unique_temp_dir("hf_results_missing"));

    assert!(matches!(
        store.resolve_run("radial"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(matches!(
        store.load_manifest("radial__2026-01-01__00_00_00"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(store.list_runs(None).unwrap().is_empty());
}

#[test]
fn unordered_snapshots_are_rejected() {
    let store = RunStore::new(unique_temp_dir("hf_results_unordered")).unwrap();
    let m = manifest("radial", 12);

    let err = store
        .save_run(&m, &snapshots(&[0.0, 2.0, 1.0]))
        .unwrap_err();
    assert!(matches!(err, ResultsError::UnorderedSnapshots { index: 2, .. }));
    assert!(!store.has_run(&m.full_name));
}

fn snapshots_file(store: &RunStore, full_name: &str) -> PathBuf {
    store.root_dir().join(full_name).join("snapshots.jsonl")
}

#[test]
fn unordered_file_on_disk_is_rejected_on_read() {
    let store = RunStore::new(unique_temp_dir("hf_results_unordered_file")).unwrap();
    let m = manifest("radial", 12);
    store
        .save_run(&m, &snapshots(&[10.0, 50.0, 100.0, 150.0]))
        .unwrap();

    let path = snapshots_file(&store, &m.full_name);
    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    let shuffled = [lines[2], lines[0], lines[3], lines[1]].join("\n");
    fs::write(&path, shuffled).unwrap();

    assert!(matches!(
        store.load_snapshot_times(&m.full_name),
        Err(ResultsError::UnorderedSnapshots { index: 1, .. })
    ));
    assert!(matches!(
        store.load_snapshots(&m.full_name),
        Err(ResultsError::UnorderedSnapshots { index: 1, .. })
    ));
}

#[test]
fn ragged_edge_field_on_disk_is_rejected_on_read() {
    let store = RunStore::new(unique_temp_dir("hf_results_ragged")).unwrap();
    let m = manifest("radial", 12);
    store.save_run(&m, &snapshots(&[1.0])).unwrap();

    let path = snapshots_file(&store, &m.full_name);
    let content = fs::read_to_string(&path).unwrap();
    let mut record: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    record["reynolds_number"] = serde_json::json!([vec![0.0; 25], ([0.0; 3]), ([0.0; 3]), ([0.0; 3])]);
    fs::write(&path, format!("{record}\n")).unwrap();

    assert!(matches!(
        store.load_snapshots(&m.full_name),
        Err(ResultsError::InvalidSnapshot { index: 0, .. })
    ));
    assert!(matches!(
        store.load_snapshots_at(&m.full_name, &[0]),
        Err(ResultsError::InvalidSnapshot { index: 0, .. })
    ));
    assert_eq!(store.load_snapshot_times(&m.full_name).unwrap(), vec![1.0]);
}

#[test]
fn delete_run_removes_directory() {
    let root = unique_temp_dir("hf_results_delete");
    let store = RunStore::new(root.clone()).unwrap();
    let m = manifest("radial", 12);
    store.save_run(&m, &snapshots(&[0.0])).unwrap();

    store.delete_run(&m.full_name).unwrap();
    assert!(!store.has_run(&m.full_name));
    assert!(fs::read_dir(&root).unwrap().next().is_none());
}
