use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use bytemuck::cast_slice;
use safetensors::tensor::{Dtype, TensorView};
use serde_json::Value;

fn ht_bin() -> String {
    env!("CARGO_BIN_EXE_ht").to_string()
}

const GAMES: usize = 1;
const STEPS: usize = 3;
const SEATS: usize = 3;
const DECK_LEN: usize = 50;

/// One recorded 3-player game: play slot 0, color clue, discard slot 0.
fn write_dump(path: &Path, actions: Vec<i64>, score: i64) {
    let rank_pattern = [0i64, 0, 0, 1, 1, 2, 2, 3, 3, 4];
    let mut decks = Vec::with_capacity(DECK_LEN * 2);
    for j in 0..DECK_LEN {
        decks.push((j / 10) as i64);
        decks.push(rank_pattern[j % 10]);
    }

    let num_actions = vec![STEPS as i64];
    let num_players = vec![3i64];
    let scores = vec![score];

    let mut tensors: BTreeMap<String, TensorView<'_>> = BTreeMap::new();
    tensors.insert(
        "actions".to_string(),
        TensorView::new(Dtype::I64, vec![GAMES, STEPS, SEATS], cast_slice(&actions)).unwrap(),
    );
    tensors.insert(
        "decks".to_string(),
        TensorView::new(Dtype::I64, vec![GAMES, DECK_LEN, 2], cast_slice(&decks)).unwrap(),
    );
    tensors.insert(
        "num_actions".to_string(),
        TensorView::new(Dtype::I64, vec![GAMES], cast_slice(&num_actions)).unwrap(),
    );
    tensors.insert(
        "num_players".to_string(),
        TensorView::new(Dtype::I64, vec![], cast_slice(&num_players)).unwrap(),
    );
    tensors.insert(
        "scores".to_string(),
        TensorView::new(Dtype::I64, vec![GAMES], cast_slice(&scores)).unwrap(),
    );

    fs::write(path, safetensors::serialize(&tensors, &None).unwrap()).unwrap();
}

fn valid_actions() -> Vec<i64> {
    let mut actions = vec![30i64; GAMES * STEPS * SEATS];
    actions[0] = 5; // step 0, seat 0: play slot 0 (Red 1 under block deal)
    actions[SEATS + 1] = 10; // step 1, seat 1: red clue two seats over
    actions[2 * SEATS + 2] = 0; // step 2, seat 2: discard slot 0
    actions
}

#[test]
fn trace_writes_files_manifest_and_events() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("games.safetensors");
    write_dump(&data, valid_actions(), 1);
    let out = dir.path().join("run1");

    let output = Command::new(ht_bin())
        .args([
            "trace",
            "--data",
            data.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--jobs",
            "1",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let trace = fs::read_to_string(out.join("traces/game_1.txt")).unwrap();
    assert!(trace.contains("HANABI GAME 1 TRACE"));
    assert!(trace.contains("Step 1: Player 1 plays slot 0"));
    assert!(trace.contains("   -> Played Red 1"));
    assert!(trace.contains("Step 2: Player 2 reveals Red cards to Player 3"));
    assert!(trace.contains("Step 3: Player 3 discards slot 0"));
    assert!(trace.contains("Final Score: 1"));

    let manifest: Value =
        serde_json::from_slice(&fs::read(out.join("run.json")).unwrap()).unwrap();
    assert_eq!(manifest["games_total"], 1);
    assert_eq!(manifest["games_completed"], 1);
    assert_eq!(manifest["games_failed"], 0);
    assert_eq!(manifest["ruleset_id"], "hanabi_clue8_fuse3_nodcap_blk_shift_v1");
    assert!(manifest["dataset_hash"].is_string());

    let events = fs::read_to_string(out.join("logs/events.ndjson")).unwrap();
    let lines: Vec<Value> = events
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["event"], "game_traced");
    assert_eq!(lines[0]["game_idx"], 0);
    assert_eq!(lines[0]["steps"], 3);
    assert_eq!(lines[0]["score_matches"], true);
    assert_eq!(lines[0]["end_reason"], "actions_exhausted");
}

#[test]
fn inspect_writes_parseable_json_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("games.safetensors");
    write_dump(&data, valid_actions(), 1);
    let out = dir.path().join("readable");

    let output = Command::new(ht_bin())
        .args([
            "inspect",
            "--data",
            data.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let doc: Value =
        serde_json::from_slice(&fs::read(out.join("game_1.json")).unwrap()).unwrap();
    assert_eq!(doc["game_index"], 0);
    assert_eq!(doc["num_players"], 3);
    assert_eq!(doc["recorded_score"], 1);
    assert_eq!(doc["replayed_score"], 1);
    assert_eq!(doc["deck"][0], "Red 1");
    assert_eq!(doc["steps"].as_array().unwrap().len(), 3);
    assert_eq!(doc["steps"][0]["description"], "plays slot 0");
}

#[test]
fn corrupt_games_are_isolated_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("games.safetensors");
    // Undecodable action code in step 0.
    let mut actions = valid_actions();
    actions[0] = 31;
    write_dump(&data, actions, 1);
    let out = dir.path().join("run2");

    let output = Command::new(ht_bin())
        .args([
            "trace",
            "--data",
            data.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--jobs",
            "1",
        ])
        .output()
        .unwrap();
    // The run itself succeeds; the bad game is recorded as failed.
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let manifest: Value =
        serde_json::from_slice(&fs::read(out.join("run.json")).unwrap()).unwrap();
    assert_eq!(manifest["games_completed"], 0);
    assert_eq!(manifest["games_failed"], 1);

    let events = fs::read_to_string(out.join("logs/events.ndjson")).unwrap();
    let first: Value = serde_json::from_str(events.lines().next().unwrap()).unwrap();
    assert_eq!(first["event"], "game_failed");
    assert!(first["error"].as_str().unwrap().contains("game 0"));
}

#[test]
fn illegal_replays_leave_an_error_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("games.safetensors");
    // Discard at the clue cap: decodes fine, but the replay rejects it.
    let mut actions = vec![30i64; GAMES * STEPS * SEATS];
    actions[0] = 0;
    actions[SEATS + 1] = 10;
    actions[2 * SEATS + 2] = 0;
    write_dump(&data, actions, 0);
    let out = dir.path().join("run3");

    let output = Command::new(ht_bin())
        .args([
            "trace",
            "--data",
            data.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--jobs",
            "1",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let trace = fs::read_to_string(out.join("traces/game_1.txt")).unwrap();
    assert!(trace.starts_with("Error tracing game 1:"));
    assert!(trace.contains("turn 0"));

    let manifest: Value =
        serde_json::from_slice(&fs::read(out.join("run.json")).unwrap()).unwrap();
    assert_eq!(manifest["games_failed"], 1);
}

#[test]
fn version_flag_prints_the_crate_version() {
    let output = Command::new(ht_bin()).args(["--version"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ht "));
}
