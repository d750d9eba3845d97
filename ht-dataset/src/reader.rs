//! Game-dump reader: decode a safetensors file into typed per-game records.
//!
//! Tensors are extracted eagerly at open time so a `Dataset` owns plain
//! vectors and hands out records without touching the file again. Integer
//! tensors are accepted in any common dtype; everything is widened to i64.

use std::path::Path;

use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;
use thiserror::Error;

use ht_core::{Action, Card};

use crate::codec::{ActionTable, CodecError};
use crate::schema::{CARD_WIDTH, T_ACTIONS, T_DECKS, T_NUM_ACTIONS, T_NUM_PLAYERS, T_SCORES};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("safetensors: {0}")]
    Safetensors(#[from] safetensors::SafeTensorError),
    #[error("missing tensor '{0}'")]
    MissingTensor(&'static str),
    #[error("tensor '{name}' has unexpected shape {shape:?}")]
    BadShape { name: &'static str, shape: Vec<usize> },
    #[error("tensor '{name}' has unsupported dtype {dtype:?}")]
    UnsupportedDtype { name: &'static str, dtype: Dtype },
    #[error("game index {idx} out of range ({num_games} games)")]
    GameOutOfRange { idx: usize, num_games: usize },
    #[error("corrupt record in game {game}{}: {reason}", step_suffix(.step))]
    Corrupt {
        game: usize,
        step: Option<usize>,
        reason: String,
    },
}

fn step_suffix(step: &Option<usize>) -> String {
    match step {
        Some(s) => format!(" at step {s}"),
        None => String::new(),
    }
}

/// One decoded game: everything the replay engine needs, plus the recorded
/// final score for cross-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub index: usize,
    pub num_players: u8,
    pub deck: Vec<Card>,
    pub actions: Vec<Action>,
    pub recorded_score: i64,
}

/// An opened game dump.
#[derive(Debug, Clone)]
pub struct Dataset {
    num_games: usize,
    steps_per_game: usize,
    seats: usize,
    deck_len: usize,
    actions: Vec<i64>,
    decks: Vec<i64>,
    num_actions: Vec<i64>,
    num_players: Vec<i64>,
    scores: Vec<i64>,
}

impl Dataset {
    /// Open a safetensors game dump from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Dataset, DatasetError> {
        let bytes = std::fs::read(path)?;
        Dataset::from_bytes(&bytes)
    }

    /// Parse a safetensors game dump from bytes already in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Dataset, DatasetError> {
        let st = SafeTensors::deserialize(bytes)?;

        let actions_view = require(&st, T_ACTIONS)?;
        let decks_view = require(&st, T_DECKS)?;
        let num_actions_view = require(&st, T_NUM_ACTIONS)?;
        let num_players_view = require(&st, T_NUM_PLAYERS)?;
        let scores_view = require(&st, T_SCORES)?;

        let [num_games, steps_per_game, seats] = match actions_view.shape() {
            &[g, s, p] => [g, s, p],
            shape => {
                return Err(DatasetError::BadShape {
                    name: T_ACTIONS,
                    shape: shape.to_vec(),
                })
            }
        };
        let deck_len = match decks_view.shape() {
            &[g, d, w] if g == num_games && w == CARD_WIDTH => d,
            shape => {
                return Err(DatasetError::BadShape {
                    name: T_DECKS,
                    shape: shape.to_vec(),
                })
            }
        };
        check_len(T_NUM_ACTIONS, num_actions_view.shape(), num_games)?;
        check_len(T_SCORES, scores_view.shape(), num_games)?;
        // num_players is a scalar in recorded dumps; a per-game vector also works.
        let np_numel: usize = num_players_view.shape().iter().product();
        if np_numel != 1 && np_numel != num_games {
            return Err(DatasetError::BadShape {
                name: T_NUM_PLAYERS,
                shape: num_players_view.shape().to_vec(),
            });
        }

        Ok(Dataset {
            num_games,
            steps_per_game,
            seats,
            deck_len,
            actions: to_i64(T_ACTIONS, &actions_view)?,
            decks: to_i64(T_DECKS, &decks_view)?,
            num_actions: to_i64(T_NUM_ACTIONS, &num_actions_view)?,
            num_players: to_i64(T_NUM_PLAYERS, &num_players_view)?,
            scores: to_i64(T_SCORES, &scores_view)?,
        })
    }

    pub fn num_games(&self) -> usize {
        self.num_games
    }

    /// Cards per recorded deck.
    pub fn deck_len(&self) -> usize {
        self.deck_len
    }

    /// Player count for game `idx`.
    pub fn num_players(&self, idx: usize) -> u8 {
        let v = if self.num_players.len() == 1 {
            self.num_players[0]
        } else {
            self.num_players[idx]
        };
        v.clamp(0, u8::MAX as i64) as u8
    }

    /// Decode one game through `table`.
    pub fn game(&self, idx: usize, table: &ActionTable) -> Result<GameRecord, DatasetError> {
        if idx >= self.num_games {
            return Err(DatasetError::GameOutOfRange {
                idx,
                num_games: self.num_games,
            });
        }

        let num_players = self.num_players(idx);
        let corrupt = |step: Option<usize>, reason: String| DatasetError::Corrupt {
            game: idx,
            step,
            reason,
        };

        if num_players as usize > self.seats {
            return Err(corrupt(
                None,
                format!(
                    "{num_players} players but only {} action seats",
                    self.seats
                ),
            ));
        }

        let mut deck = Vec::with_capacity(self.deck_len);
        for j in 0..self.deck_len {
            let base = (idx * self.deck_len + j) * CARD_WIDTH;
            let color = table
                .color_for_raw(self.decks[base])
                .map_err(|e| corrupt(None, format!("deck card {j}: {e}")))?;
            let rank = table
                .rank_for_raw(self.decks[base + 1])
                .map_err(|e| corrupt(None, format!("deck card {j}: {e}")))?;
            deck.push(Card::new(color, rank));
        }

        let n = self.num_actions[idx];
        let n = usize::try_from(n)
            .ok()
            .filter(|&n| n <= self.steps_per_game)
            .ok_or_else(|| corrupt(None, format!("num_actions {n} out of range")))?;

        let mut actions = Vec::with_capacity(n);
        for step in 0..n {
            let base = (idx * self.steps_per_game + step) * self.seats;
            let row = &self.actions[base..base + self.seats];

            let mut acting: Option<(u8, i64)> = None;
            for (seat, &raw) in row.iter().take(num_players as usize).enumerate() {
                if table.is_sentinel(raw) {
                    continue;
                }
                if acting.is_some() {
                    return Err(corrupt(
                        Some(step),
                        "more than one acting player in a step".to_string(),
                    ));
                }
                acting = Some((seat as u8, raw));
            }

            // A row of sentinels is a recorded no-op; skip it.
            let Some((actor, raw)) = acting else {
                continue;
            };
            let action = table.decode(raw, actor, num_players).map_err(|e| match e {
                CodecError::ActionOutOfDomain { .. } => {
                    corrupt(Some(step), format!("seat {actor}: {e}"))
                }
                other => corrupt(Some(step), other.to_string()),
            })?;
            actions.push(action);
        }

        Ok(GameRecord {
            index: idx,
            num_players,
            deck,
            actions,
            recorded_score: self.scores[idx],
        })
    }
}

fn require<'a>(
    st: &'a SafeTensors<'a>,
    name: &'static str,
) -> Result<TensorView<'a>, DatasetError> {
    st.tensor(name).map_err(|_| DatasetError::MissingTensor(name))
}

fn check_len(name: &'static str, shape: &[usize], expected: usize) -> Result<(), DatasetError> {
    let numel: usize = shape.iter().product();
    if numel != expected {
        return Err(DatasetError::BadShape {
            name,
            shape: shape.to_vec(),
        });
    }
    Ok(())
}

/// Widen an integer tensor of any supported dtype to i64.
///
/// Tensor data inside a safetensors file is not guaranteed to be aligned for
/// wider integer types, so values are read element-wise rather than cast in
/// place.
fn to_i64(name: &'static str, view: &TensorView<'_>) -> Result<Vec<i64>, DatasetError> {
    let data = view.data();
    let out = match view.dtype() {
        Dtype::I64 => data
            .chunks_exact(8)
            .map(bytemuck::pod_read_unaligned::<i64>)
            .collect(),
        Dtype::I32 => data
            .chunks_exact(4)
            .map(|c| bytemuck::pod_read_unaligned::<i32>(c) as i64)
            .collect(),
        Dtype::I16 => data
            .chunks_exact(2)
            .map(|c| bytemuck::pod_read_unaligned::<i16>(c) as i64)
            .collect(),
        Dtype::I8 => data.iter().map(|&b| b as i8 as i64).collect(),
        Dtype::U8 => data.iter().map(|&b| b as i64).collect(),
        Dtype::U16 => data
            .chunks_exact(2)
            .map(|c| bytemuck::pod_read_unaligned::<u16>(c) as i64)
            .collect(),
        Dtype::U32 => data
            .chunks_exact(4)
            .map(|c| bytemuck::pod_read_unaligned::<u32>(c) as i64)
            .collect(),
        dtype => {
            return Err(DatasetError::UnsupportedDtype { name, dtype });
        }
    };
    Ok(out)
}
