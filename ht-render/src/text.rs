//! Step-by-step text traces.
//!
//! One file per game: a banner, one block per applied action showing the
//! action, its effects, and the board afterwards, then the final score.

use std::fmt::Write as _;
use std::path::Path;

use ht_core::{Card, GameState, Outcome, Replay};
use ht_dataset::{ActionTable, GameRecord};

use crate::RenderError;

fn card_str(table: &ActionTable, card: Card) -> String {
    format!("{} {}", table.color_name(card.color), card.rank)
}

fn hand_str(table: &ActionTable, state: &GameState, player: usize) -> String {
    let slots: Vec<String> = state.hands()[player]
        .slots()
        .iter()
        .map(|s| match s {
            Some(c) => card_str(table, *c),
            None => "-".to_string(),
        })
        .collect();
    format!("[{}]", slots.join(", "))
}

fn push_state_block(out: &mut String, table: &ActionTable, state: &GameState) {
    for p in 0..state.num_players() as usize {
        let _ = writeln!(out, "      Player {} hand: {}", p + 1, hand_str(table, state, p));
    }

    let discards: Vec<String> = state
        .discards()
        .iter()
        .map(|&c| card_str(table, c))
        .collect();
    let _ = writeln!(out, "      Discard pile: [{}]", discards.join(", "));

    let played: Vec<String> = state
        .fireworks()
        .stacks()
        .map(|(color, top)| {
            if top > 0 {
                format!("{} {}", table.color_name(color), top)
            } else {
                format!("{} _", table.color_name(color))
            }
        })
        .collect();
    let _ = writeln!(out, "      Played pile:  {}", played.join(", "));

    let _ = writeln!(
        out,
        "      Tokens: clues {}, fuses {}",
        state.clue_tokens(),
        state.fuse_tokens()
    );
    out.push('\n');
}

fn push_outcome(out: &mut String, table: &ActionTable, outcome: &Outcome) {
    match outcome {
        Outcome::Played { card, drew } => {
            let _ = writeln!(out, "   -> Played {}", card_str(table, *card));
            push_drew(out, table, *drew);
        }
        Outcome::Misplayed { card, drew } => {
            let _ = writeln!(out, "   -> Misplayed {}", card_str(table, *card));
            push_drew(out, table, *drew);
        }
        Outcome::Discarded { card, drew } => {
            let _ = writeln!(out, "   -> Discarded {}", card_str(table, *card));
            push_drew(out, table, *drew);
        }
        Outcome::Clued { touched, .. } => {
            if touched.is_empty() {
                let _ = writeln!(out, "   -> Touched slots: none");
            } else {
                let slots: Vec<String> = touched.iter().map(u8::to_string).collect();
                let _ = writeln!(out, "   -> Touched slots: [{}]", slots.join(", "));
            }
        }
    }
}

fn push_drew(out: &mut String, table: &ActionTable, drew: Option<Card>) {
    if let Some(c) = drew {
        let _ = writeln!(out, "   -> Drew {}", card_str(table, c));
    }
}

/// Render a full game trace.
pub fn render_trace(table: &ActionTable, record: &GameRecord, replay: &Replay) -> String {
    let mut out = String::new();
    let game_no = record.index + 1;

    let _ = writeln!(
        out,
        "=============== HANABI GAME {game_no} TRACE ===============\n"
    );

    for (i, step) in replay.steps.iter().enumerate() {
        let _ = writeln!(
            out,
            "Step {}: Player {} {}",
            i + 1,
            step.player + 1,
            table.describe(&step.action)
        );
        push_outcome(&mut out, table, &step.outcome);
        push_state_block(&mut out, table, &step.state);
    }

    let _ = writeln!(out, "Final Score: {}", replay.score);
    if replay.score as i64 != record.recorded_score {
        let _ = writeln!(
            out,
            "Recorded score: {} (differs from replayed score)",
            record.recorded_score
        );
    }
    let _ = writeln!(out, "=============== END OF GAME TRACE ===============");
    out
}

/// Write a rendered trace atomically.
pub fn write_trace(path: &Path, contents: &str) -> Result<(), RenderError> {
    crate::write_atomic(path, contents.as_bytes())
}
