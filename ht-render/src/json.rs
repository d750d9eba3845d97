//! Per-game JSON snapshots.

use std::path::Path;

use serde::Serialize;

use ht_core::{Action, GameState, Outcome, Replay};
use ht_dataset::schema::FORMAT_VERSION;
use ht_dataset::{ActionTable, GameRecord};

use crate::RenderError;

/// Serialized view of one game: metadata, deal, decoded actions, and the
/// state after every step.
#[derive(Debug, Clone, Serialize)]
pub struct GameDoc {
    pub format_version: u32,
    pub table_version: u32,
    pub game_index: usize,
    pub num_players: u8,
    pub recorded_score: i64,
    pub replayed_score: u8,
    pub end_reason: &'static str,
    pub deck: Vec<String>,
    pub steps: Vec<StepDoc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepDoc {
    pub step: usize,
    pub player: u8,
    pub description: String,
    pub action: Action,
    pub outcome: Outcome,
    pub state: StateDoc,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateDoc {
    pub hands: Vec<Vec<Option<String>>>,
    pub discard_pile: Vec<String>,
    pub played_pile: Vec<StackDoc>,
    pub clue_tokens: u8,
    pub fuse_tokens: u8,
    pub deck_remaining: usize,
    pub current_player: u8,
    pub turn: u32,
    pub terminal: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackDoc {
    pub color: String,
    pub top: u8,
}

fn card_str(table: &ActionTable, card: ht_core::Card) -> String {
    format!("{} {}", table.color_name(card.color), card.rank)
}

fn state_doc(table: &ActionTable, state: &GameState) -> StateDoc {
    StateDoc {
        hands: state
            .hands()
            .iter()
            .map(|h| {
                h.slots()
                    .iter()
                    .map(|s| s.map(|c| card_str(table, c)))
                    .collect()
            })
            .collect(),
        discard_pile: state
            .discards()
            .iter()
            .map(|&c| card_str(table, c))
            .collect(),
        played_pile: state
            .fireworks()
            .stacks()
            .map(|(color, top)| StackDoc {
                color: table.color_name(color).to_string(),
                top,
            })
            .collect(),
        clue_tokens: state.clue_tokens(),
        fuse_tokens: state.fuse_tokens(),
        deck_remaining: state.deck_remaining().len(),
        current_player: state.current_player(),
        turn: state.turn(),
        terminal: state.is_terminal(),
    }
}

/// Build the JSON view of one replayed game.
pub fn game_doc(table: &ActionTable, record: &GameRecord, replay: &Replay) -> GameDoc {
    GameDoc {
        format_version: FORMAT_VERSION,
        table_version: table.version,
        game_index: record.index,
        num_players: record.num_players,
        recorded_score: record.recorded_score,
        replayed_score: replay.score,
        end_reason: replay.end.as_str(),
        deck: record.deck.iter().map(|&c| card_str(table, c)).collect(),
        steps: replay
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepDoc {
                step: i + 1,
                player: step.player,
                description: table.describe(&step.action),
                action: step.action,
                outcome: step.outcome.clone(),
                state: state_doc(table, &step.state),
            })
            .collect(),
    }
}

/// Write a game document as pretty JSON, atomically.
pub fn write_game_json(path: &Path, doc: &GameDoc) -> Result<(), RenderError> {
    let bytes = serde_json::to_vec_pretty(doc)?;
    crate::write_atomic(path, &bytes)
}
