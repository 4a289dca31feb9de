use gpx_track3d_wasm::loader::prepare_track;
use gpx_track3d_wasm::options::ViewerOptions;
use std::path::Path;

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).unwrap()
}

fn normalize_fixture(fixture: &str) -> serde_json::Value {
    let track = prepare_track(&load_fixture(fixture), &ViewerOptions::default()).unwrap();
    serde_json::to_value(track.points()).unwrap()
}

/// Compare actual output against the expected snapshot file.
/// When `UPDATE_SNAPSHOTS=1` is set, write/overwrite the expected file instead.
fn assert_snapshot(actual: &serde_json::Value, expected_path: &str) {
    let path = format!("tests/fixtures/expected/{expected_path}");

    if matches!(std::env::var("UPDATE_SNAPSHOTS").as_deref(), Ok("1")) {
        let dir = Path::new(&path).parent().unwrap();
        std::fs::create_dir_all(dir).unwrap();
        let pretty = serde_json::to_string_pretty(actual).unwrap();
        std::fs::write(&path, pretty.as_bytes()).unwrap();
        eprintln!("Updated snapshot: {path}");
        return;
    }

    let expected_str = std::fs::read_to_string(&path).unwrap_or_else(|_| {
        panic!("Expected file not found: {path}. Run with UPDATE_SNAPSHOTS=1 to generate.")
    });
    let expected: serde_json::Value = serde_json::from_str(&expected_str)
        .unwrap_or_else(|e| panic!("Failed to parse {path}: {e}"));

    assert_eq!(
        *actual, expected,
        "Snapshot mismatch for {path}.\nRun with UPDATE_SNAPSHOTS=1 to update."
    );
}

#[test]
fn snapshot_simple_track() {
    assert_snapshot(&normalize_fixture("simple_track.gpx"), "simple_track.json");
}

#[test]
fn snapshot_flat_elevation() {
    assert_snapshot(
        &normalize_fixture("flat_elevation.gpx"),
        "flat_elevation.json",
    );
}

#[test]
fn snapshot_multi_segment() {
    assert_snapshot(&normalize_fixture("multi_segment.gpx"), "multi_segment.json");
}
