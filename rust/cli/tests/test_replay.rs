mod helpers;

use helpers::{fixture, run_cli};
use pokerfelt_cli::recorder::FrameRecorder;

fn state_frame() -> String {
    let snapshot = std::fs::read_to_string(fixture("snapshot_betting.json")).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    serde_json::json!({"event": "pokerTableState", "data": snapshot}).to_string()
}

fn record(path: &str, frames: &[&str]) {
    let mut rec = FrameRecorder::create(path).unwrap();
    for frame in frames {
        rec.record(frame).unwrap();
    }
}

const CONNECT: &str = r#"{"event":"connect","data":{"socketId":"sock-c"}}"#;
const TABLES: &str = r#"{"event":"pokerTablesUpdate","data":[{"tableId":"poker_7","tableName":"Riverside",
    "gameState":"betting","smallBlind":10,"bigBlind":20,"minBuyIn":400,"maxBuyIn":2000,
    "playerCount":3,"maxPlayers":6}]}"#;
const CHAT: &str =
    r#"{"event":"pokerChatMessage","data":{"username":"bob","message":"nice hand","timestamp":0}}"#;

#[test]
fn replay_renders_as_the_recorded_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.jsonl");
    let path = path.to_str().unwrap();
    let state = state_frame();
    record(path, &[CONNECT, TABLES, &state, CHAT]);

    let res = run_cli(&["replay", "--input", path]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    let out = &res.stdout;
    assert!(out.contains("Riverside"));
    assert!(out.contains("> Seat 4: cara (you) [D]"));
    assert!(out.contains("Your move:"));
    assert!(out.contains("] bob: nice hand"));
    assert!(out.ends_with("Replayed 4 frames: 1 tables drawn, 0 skipped\n"), "{}", out);
}

#[test]
fn viewer_override_changes_whose_cards_are_shown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.jsonl.zst");
    let path = path.to_str().unwrap();
    let state = state_frame();
    record(path, &[CONNECT, &state]);

    let res = run_cli(&["replay", "--input", path, "--viewer", "sock-b"]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    assert!(res.stdout.contains("Seat 2: bob (you) [SB]"));
    assert!(res.stdout.contains("> Seat 4: cara [D]  1000 chips  [## ##]"));
    assert!(!res.stdout.contains("Your move:"));
}

#[test]
fn other_tables_are_ignored_when_following_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.jsonl");
    let path = path.to_str().unwrap();
    let state = state_frame();
    record(path, &[CONNECT, &state]);

    let res = run_cli(&["replay", "--input", path, "--table", "poker_1"]);
    assert_eq!(res.exit_code, 0);
    assert!(!res.stdout.contains("Riverside"));
    assert!(res.stdout.contains("0 tables drawn"));
}

#[test]
fn undecodable_frames_are_skipped_with_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.jsonl");
    let path_str = path.to_str().unwrap();
    let state = state_frame();
    record(
        path_str,
        &[CONNECT, "garbage", r#"{"event":"somethingNew","data":{}}"#, &state],
    );
    let mut text = std::fs::read_to_string(&path).unwrap();
    text.push_str("{not a recording line\n");
    std::fs::write(&path, text).unwrap();

    let res = run_cli(&["replay", "--input", path_str]);
    assert_eq!(res.exit_code, 0, "stderr: {}", res.stderr);
    assert!(res.stderr.contains("WARNING: line 5"), "{}", res.stderr);
    assert!(res.stderr.contains("Invalid frame"), "{}", res.stderr);
    assert!(res.stdout.contains("Replayed 4 frames: 1 tables drawn, 3 skipped"));
}

#[test]
fn empty_recording_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.jsonl");
    std::fs::write(&path, "").unwrap();

    let res = run_cli(&["replay", "--input", path.to_str().unwrap()]);
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("no frames recorded"));
}
