//! ht-logging: NDJSON run events + atomic run manifests.
//!
//! Append-only NDJSON logs make a trace run auditable after the fact: one
//! event per processed game, plus a manifest tying outputs to the dataset
//! and rule versions that produced them.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run manifest schema version.
pub const RUN_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifestV1 {
    pub run_manifest_version: u32,

    pub run_id: String,
    pub created_ts_ms: u64,

    // Versioning.
    pub format_version: u32,
    pub table_version: u32,
    pub ruleset_id: String,

    // Input provenance.
    pub dataset_path: String,
    pub dataset_hash: Option<String>,
    pub git_hash: Option<String>,

    // Layout, relative to the run directory.
    pub traces_dir: String,
    pub logs_dir: String,

    // Counters.
    pub games_total: u64,
    pub games_completed: u64,
    pub games_failed: u64,
}

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

/// Content hash for input provenance.
pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn try_git_hash() -> Option<String> {
    use std::process::Command;

    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?;
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<RunManifestV1, NdjsonError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<RunManifestV1>(&bytes)?)
}

pub fn write_manifest_atomic(path: impl AsRef<Path>, m: &RunManifestV1) -> Result<(), NdjsonError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(m)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Versioning fields attached to every event.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfoV1 {
    pub format_version: u32,
    pub table_version: u32,
    pub ruleset_id: String,
}

/// One game successfully replayed and rendered.
#[derive(Debug, Clone, Serialize)]
pub struct GameTracedEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub game_idx: u64,

    pub steps: u64,
    pub replayed_score: u8,
    pub recorded_score: i64,
    pub score_matches: bool,
    pub end_reason: &'static str,

    pub out_path: String,
}

/// One game that could not be replayed.
#[derive(Debug, Clone, Serialize)]
pub struct GameFailedEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub game_idx: u64,

    pub error: String,
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new()
            .create(true)
            .append(true)
            .write(true)
            .open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use serde_json::Value;

    fn read_ndjson_lenient(path: &Path) -> Vec<Value> {
        let s = fs::read_to_string(path).expect("read");
        let mut out = Vec::new();
        for line in s.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(v) = serde_json::from_str::<Value>(line) {
                out.push(v);
            }
        }
        out
    }

    fn sample_manifest() -> RunManifestV1 {
        RunManifestV1 {
            run_manifest_version: RUN_MANIFEST_VERSION,
            run_id: "r".to_string(),
            created_ts_ms: now_ms(),
            format_version: 1,
            table_version: 1,
            ruleset_id: "hanabi_clue8_fuse3_nodcap_blk_shift_v1".to_string(),
            dataset_path: "data/games.safetensors".to_string(),
            dataset_hash: Some("abc".to_string()),
            git_hash: None,
            traces_dir: "traces".to_string(),
            logs_dir: "logs".to_string(),
            games_total: 10,
            games_completed: 0,
            games_failed: 0,
        }
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn hash_is_stable() {
        assert_eq!(hash_bytes(b"abc"), hash_bytes(b"abc"));
        assert_ne!(hash_bytes(b"abc"), hash_bytes(b"abd"));
    }

    #[test]
    fn writes_one_valid_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut w = NdjsonWriter::open_append(&path).unwrap();

        #[derive(Serialize)]
        struct E {
            event: &'static str,
            x: u32,
        }

        w.write_event(&E { event: "e", x: 1 }).unwrap();
        w.write_event(&E { event: "e", x: 2 }).unwrap();
        w.flush().unwrap();

        let vals = read_ndjson_lenient(&path);
        assert_eq!(vals.len(), 2);
        assert_eq!(vals[0]["x"], 1);
        assert_eq!(vals[1]["x"], 2);
    }

    #[test]
    fn lenient_reader_tolerates_trailing_partial_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");

        {
            let mut w = NdjsonWriter::open_append(&path).unwrap();
            #[derive(Serialize)]
            struct E {
                event: &'static str,
                x: u32,
            }
            w.write_event(&E { event: "e", x: 1 }).unwrap();
            w.flush().unwrap();
        }

        // Simulate crash: append a partial JSON line (no newline, invalid JSON).
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(br#"{"event":"e","x":"#).unwrap();
        f.flush().unwrap();

        let vals = read_ndjson_lenient(&path);
        assert_eq!(vals.len(), 1);
        assert_eq!(vals[0]["x"], 1);
    }

    #[test]
    fn game_traced_event_serializes_flat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut w = NdjsonWriter::open_append(&path).unwrap();

        let ev = GameTracedEventV1 {
            event: "game_traced",
            ts_ms: now_ms(),
            v: VersionInfoV1 {
                format_version: 1,
                table_version: 1,
                ruleset_id: "id".to_string(),
            },
            run_id: "r".to_string(),
            game_idx: 3,
            steps: 42,
            replayed_score: 17,
            recorded_score: 17,
            score_matches: true,
            end_reason: "final_turns_elapsed",
            out_path: "traces/game_4.txt".to_string(),
        };
        w.write_event(&ev).unwrap();
        w.flush().unwrap();

        let vals = read_ndjson_lenient(&path);
        assert_eq!(vals[0]["event"], "game_traced");
        assert_eq!(vals[0]["game_idx"], 3);
        assert_eq!(vals[0]["v"]["table_version"], 1);
        assert_eq!(vals[0]["score_matches"], true);
    }

    #[test]
    fn manifest_write_is_atomic_wrt_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let run_json = dir.path().join("run.json");

        let mut m = sample_manifest();
        write_manifest_atomic(&run_json, &m).unwrap();

        // Simulate crash leaving a corrupt tmp file around; run.json must remain readable.
        let tmp = run_json.with_extension("json.tmp");
        fs::write(&tmp, b"{not valid json").unwrap();

        let got = read_manifest(&run_json).unwrap();
        assert_eq!(got.run_id, "r");

        // Update manifest and ensure it overwrites cleanly.
        m.games_completed = 7;
        write_manifest_atomic(&run_json, &m).unwrap();
        let got2 = read_manifest(&run_json).unwrap();
        assert_eq!(got2.games_completed, 7);
    }
}
