//! ht: CLI binary for the Hanabi game-dump toolkit.
//!
//! Subcommands:
//! - inspect: decoded per-game JSON snapshots
//! - trace: step-by-step text traces with a run manifest + NDJSON events

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use rayon::prelude::*;

use ht_core::{replay_game, Config, Replay, Rules};
use ht_dataset::schema::FORMAT_VERSION;
use ht_dataset::{ActionTable, Dataset, GameRecord};

fn print_help() {
    eprintln!(
        r#"ht - Hanabi game-dump tools

USAGE:
    ht <COMMAND> [OPTIONS]

COMMANDS:
    inspect     Convert recorded games to readable JSON snapshots
    trace       Write step-by-step text traces for recorded games

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `ht <COMMAND> --help` for per-command options.
"#
    );
}

fn print_version() {
    println!("ht {}", env!("CARGO_PKG_VERSION"));
}

/// Options shared by both subcommands.
struct CommonOpts {
    data: String,
    out: String,
    game: Option<usize>,
    table: Option<String>,
    config: Option<String>,
}

struct LoadedInputs {
    dataset: Dataset,
    dataset_hash: String,
    table: ActionTable,
    config: Config,
    indices: Vec<usize>,
}

fn load_inputs(opts: &CommonOpts) -> LoadedInputs {
    let config = match &opts.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }),
        None => Config::default(),
    };

    let table = match &opts.table {
        Some(path) => ActionTable::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Failed to load action table: {e}");
            process::exit(1);
        }),
        None => ActionTable::v1(),
    };

    let bytes = std::fs::read(&opts.data).unwrap_or_else(|e| {
        eprintln!("Failed to read dataset {}: {e}", opts.data);
        process::exit(1);
    });
    let dataset_hash = ht_logging::hash_bytes(&bytes);
    let dataset = Dataset::from_bytes(&bytes).unwrap_or_else(|e| {
        eprintln!("Failed to parse dataset {}: {e}", opts.data);
        process::exit(1);
    });

    let indices: Vec<usize> = match opts.game {
        Some(idx) => {
            if idx >= dataset.num_games() {
                eprintln!(
                    "Game index {idx} out of range ({} games)",
                    dataset.num_games()
                );
                process::exit(1);
            }
            vec![idx]
        }
        None => (0..dataset.num_games()).collect(),
    };

    LoadedInputs {
        dataset,
        dataset_hash,
        table,
        config,
        indices,
    }
}

/// Per-game result used for events and counters.
struct GameSummary {
    idx: usize,
    steps: usize,
    replayed_score: u8,
    recorded_score: i64,
    end_reason: &'static str,
    out_path: String,
}

fn replay_record(rules: &Rules, record: &GameRecord) -> Result<Replay, ht_core::ReplayError> {
    replay_game(rules, record.num_players, record.deck.clone(), &record.actions)
}

/// Fan games out over rayon. `jobs` = 0 uses the default pool, 1 runs
/// serially. Each replay exclusively owns its state, so no synchronization
/// is needed beyond collecting the results.
fn run_games<F>(indices: &[usize], jobs: usize, f: F) -> Vec<Result<GameSummary, String>>
where
    F: Fn(usize) -> Result<GameSummary, String> + Send + Sync,
{
    match jobs {
        1 => indices.iter().map(|&i| f(i)).collect(),
        0 => indices.par_iter().map(|&i| f(i)).collect(),
        n => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .unwrap_or_else(|e| {
                    eprintln!("Failed to build thread pool: {e}");
                    process::exit(1);
                });
            pool.install(|| indices.par_iter().map(|&i| f(i)).collect())
        }
    }
}

/// Consume one shared option at `args[*i]`. Returns false if the option is
/// not one of the shared set.
fn parse_common(opts: &mut CommonOpts, args: &[String], i: &mut usize) -> bool {
    match args[*i].as_str() {
        "--data" => {
            opts.data = args.get(*i + 1).cloned().unwrap_or_default();
            *i += 2;
        }
        "--out" => {
            opts.out = args.get(*i + 1).cloned().unwrap_or_default();
            *i += 2;
        }
        "--game" => {
            match args.get(*i + 1).and_then(|s| s.parse().ok()) {
                Some(v) => opts.game = Some(v),
                None => {
                    eprintln!("Invalid --game value");
                    process::exit(1);
                }
            }
            *i += 2;
        }
        "--table" => {
            opts.table = Some(args.get(*i + 1).cloned().unwrap_or_default());
            *i += 2;
        }
        "--config" => {
            opts.config = Some(args.get(*i + 1).cloned().unwrap_or_default());
            *i += 2;
        }
        _ => return false,
    }
    true
}

fn require_io(opts: &CommonOpts, cmd: &str) {
    if opts.data.is_empty() {
        eprintln!("Missing --data");
        eprintln!("Run `ht {cmd} --help` for usage.");
        process::exit(1);
    }
    if opts.out.is_empty() {
        eprintln!("Missing --out");
        eprintln!("Run `ht {cmd} --help` for usage.");
        process::exit(1);
    }
}

fn cmd_inspect(args: &[String]) {
    let mut opts = CommonOpts {
        data: String::new(),
        out: String::new(),
        game: None,
        table: None,
        config: None,
    };

    let mut i = 0usize;
    while i < args.len() {
        if args[i] == "--help" || args[i] == "-h" {
            println!(
                r#"ht inspect

USAGE:
    ht inspect --data games.safetensors --out readable_data/ [--game N] [--table table.json] [--config cfg.yaml]

OPTIONS:
    --data FILE     Safetensors game dump (required)
    --out DIR       Output directory for game_<n>.json files (required)
    --game N        Only the game at index N (default: all games)
    --table FILE    Action lookup table JSON (default: built-in v1)
    --config FILE   YAML config with replay rules (default: dump-compat rules)
"#
            );
            return;
        }
        if !parse_common(&mut opts, args, &mut i) {
            eprintln!("Unknown option for `ht inspect`: {}", args[i]);
            eprintln!("Run `ht inspect --help` for usage.");
            process::exit(1);
        }
    }
    require_io(&opts, "inspect");

    let inputs = load_inputs(&opts);
    let rules = inputs.config.rules.clone();

    let out_dir = PathBuf::from(&opts.out);
    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir: {e}");
        process::exit(1);
    });

    let mut failed = 0usize;
    for &idx in &inputs.indices {
        let path = out_dir.join(format!("game_{}.json", idx + 1));
        let result = inputs
            .dataset
            .game(idx, &inputs.table)
            .map_err(|e| e.to_string())
            .and_then(|record| {
                let replay = replay_record(&rules, &record).map_err(|e| e.to_string())?;
                let doc = ht_render::game_doc(&inputs.table, &record, &replay);
                ht_render::write_game_json(&path, &doc).map_err(|e| e.to_string())
            });
        match result {
            Ok(()) => println!("Extracted game {} saved to {}", idx + 1, path.display()),
            Err(e) => {
                eprintln!("Error inspecting game {}: {e}", idx + 1);
                failed += 1;
            }
        }
    }

    println!(
        "Inspect complete. games={} failed={failed} out={}",
        inputs.indices.len(),
        opts.out
    );
}

fn cmd_trace(args: &[String]) {
    let mut opts = CommonOpts {
        data: String::new(),
        out: String::new(),
        game: None,
        table: None,
        config: None,
    };
    let mut jobs: Option<usize> = None;
    let mut log_flush_every: Option<u64> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"ht trace

USAGE:
    ht trace --data games.safetensors --out runs/<id>/ [--game N] [--table table.json] [--config cfg.yaml] [--jobs N]

OPTIONS:
    --data FILE             Safetensors game dump (required)
    --out DIR               Run directory; traces land in <DIR>/traces (required)
    --game N                Only the game at index N (default: all games)
    --table FILE            Action lookup table JSON (default: built-in v1)
    --config FILE           YAML config with replay rules (default: dump-compat rules)
    --jobs N                Worker threads (0 = all cores, 1 = serial; default from config)
    --log-flush-every N     Flush NDJSON logs every N lines (0 disables; default from config)
"#
                );
                return;
            }
            "--jobs" => {
                jobs = args.get(i + 1).and_then(|s| s.parse().ok());
                if jobs.is_none() {
                    eprintln!("Invalid --jobs value");
                    process::exit(1);
                }
                i += 2;
            }
            "--log-flush-every" => {
                log_flush_every = args.get(i + 1).and_then(|s| s.parse().ok());
                if log_flush_every.is_none() {
                    eprintln!("Invalid --log-flush-every value");
                    process::exit(1);
                }
                i += 2;
            }
            _ => {
                if !parse_common(&mut opts, args, &mut i) {
                    eprintln!("Unknown option for `ht trace`: {}", args[i]);
                    eprintln!("Run `ht trace --help` for usage.");
                    process::exit(1);
                }
            }
        }
    }
    require_io(&opts, "trace");

    let inputs = load_inputs(&opts);
    let rules = inputs.config.rules.clone();
    let jobs = jobs.unwrap_or(inputs.config.run.jobs);
    let log_flush_every = log_flush_every.unwrap_or(inputs.config.logging.flush_every_lines);

    let run_dir = PathBuf::from(&opts.out);
    let traces_dir = run_dir.join("traces");
    let logs_dir = run_dir.join("logs");
    for dir in [&traces_dir, &logs_dir] {
        std::fs::create_dir_all(dir).unwrap_or_else(|e| {
            eprintln!("Failed to create {}: {e}", dir.display());
            process::exit(1);
        });
    }

    let run_id = run_dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(&opts.out)
        .to_string();
    let run_json = run_dir.join("run.json");
    let mut manifest = ht_logging::RunManifestV1 {
        run_manifest_version: ht_logging::RUN_MANIFEST_VERSION,
        run_id: run_id.clone(),
        created_ts_ms: ht_logging::now_ms(),
        format_version: FORMAT_VERSION,
        table_version: inputs.table.version,
        ruleset_id: rules.ruleset_id(),
        dataset_path: opts.data.clone(),
        dataset_hash: Some(inputs.dataset_hash.clone()),
        git_hash: ht_logging::try_git_hash(),
        traces_dir: "traces".to_string(),
        logs_dir: "logs".to_string(),
        games_total: inputs.indices.len() as u64,
        games_completed: 0,
        games_failed: 0,
    };
    // If a manifest already exists (re-run into the same dir), keep its identity.
    if let Ok(existing) = ht_logging::read_manifest(&run_json) {
        manifest.created_ts_ms = existing.created_ts_ms;
        manifest.run_id = existing.run_id;
    }
    ht_logging::write_manifest_atomic(&run_json, &manifest).unwrap_or_else(|e| {
        eprintln!("Failed to write run manifest: {e:?}");
        process::exit(1);
    });

    let dataset = &inputs.dataset;
    let table = &inputs.table;
    let results = run_games(&inputs.indices, jobs, |idx| {
        trace_one(dataset, table, &rules, idx, &traces_dir)
    });

    let mut events = ht_logging::NdjsonWriter::open_append_with_flush(
        logs_dir.join("events.ndjson"),
        log_flush_every,
    )
    .unwrap_or_else(|e| {
        eprintln!("Failed to create event log: {e:?}");
        process::exit(1);
    });
    let version_info = || ht_logging::VersionInfoV1 {
        format_version: FORMAT_VERSION,
        table_version: inputs.table.version,
        ruleset_id: rules.ruleset_id(),
    };

    for (&idx, result) in inputs.indices.iter().zip(&results) {
        match result {
            Ok(s) => {
                manifest.games_completed += 1;
                let _ = events.write_event(&ht_logging::GameTracedEventV1 {
                    event: "game_traced",
                    ts_ms: ht_logging::now_ms(),
                    v: version_info(),
                    run_id: manifest.run_id.clone(),
                    game_idx: s.idx as u64,
                    steps: s.steps as u64,
                    replayed_score: s.replayed_score,
                    recorded_score: s.recorded_score,
                    score_matches: s.replayed_score as i64 == s.recorded_score,
                    end_reason: s.end_reason,
                    out_path: s.out_path.clone(),
                });
            }
            Err(e) => {
                manifest.games_failed += 1;
                let _ = events.write_event(&ht_logging::GameFailedEventV1 {
                    event: "game_failed",
                    ts_ms: ht_logging::now_ms(),
                    v: version_info(),
                    run_id: manifest.run_id.clone(),
                    game_idx: idx as u64,
                    error: e.clone(),
                });
            }
        }
    }
    let _ = events.flush();

    ht_logging::write_manifest_atomic(&run_json, &manifest).unwrap_or_else(|e| {
        eprintln!("Failed to write run manifest: {e:?}");
        process::exit(1);
    });

    println!(
        "Trace complete. games={} failed={} out={}",
        manifest.games_completed, manifest.games_failed, opts.out
    );
}

fn trace_one(
    dataset: &Dataset,
    table: &ActionTable,
    rules: &Rules,
    idx: usize,
    traces_dir: &Path,
) -> Result<GameSummary, String> {
    let path = traces_dir.join(format!("game_{}.txt", idx + 1));

    let result = dataset
        .game(idx, table)
        .map_err(|e| e.to_string())
        .and_then(|record| {
            let replay = replay_record(rules, &record).map_err(|e| e.to_string())?;
            let text = ht_render::render_trace(table, &record, &replay);
            ht_render::write_trace(&path, &text).map_err(|e| e.to_string())?;
            Ok(GameSummary {
                idx,
                steps: replay.steps.len(),
                replayed_score: replay.score,
                recorded_score: record.recorded_score,
                end_reason: replay.end.as_str(),
                out_path: path.display().to_string(),
            })
        });

    // Keep a per-game error file so the failure is visible next to the
    // successful traces, then carry on with the run.
    if let Err(e) = &result {
        let msg = format!("Error tracing game {}: {e}\n", idx + 1);
        let _ = ht_render::write_trace(&path, &msg);
    }
    result
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        process::exit(0);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "-V" | "--version" => {
            print_version();
        }
        "inspect" => {
            cmd_inspect(&args[2..]);
        }
        "trace" => {
            cmd_trace(&args[2..]);
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Run `ht --help` for usage.");
            process::exit(1);
        }
    }
}
