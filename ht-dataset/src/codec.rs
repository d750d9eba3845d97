//! Raw action/color code lookup table.
//!
//! Dumps encode actions and card colors as small integers. The mapping to
//! semantic values is deliberately an explicit, versioned table loaded at the
//! decode boundary (with a built-in default matching the recorded dumps)
//! rather than logic inferred from tensor positions.
//!
//! Raw action layout (per acting player, v1):
//! - `0 .. h-1`           : discard slot
//! - `h .. 2h-1`          : play slot
//! - color-clue band      : `(target_offset - 1) * num_colors + color_index`
//! - rank-clue band       : `(target_offset - 1) * num_ranks + rank_index`
//! - `no_op`              : seat is not acting this step
//!
//! where `h` is the slot count covered by the bands and `target_offset` is
//! the clued player's seat distance from the actor (1..num_players).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ht_core::{Action, Color, Rank};

/// Table layout version understood by this crate.
pub const TABLE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported table version {0} (expected {TABLE_VERSION})")]
    UnsupportedVersion(u32),
    #[error("invalid table: {0}")]
    InvalidTable(String),
    #[error("raw action code {raw} out of domain for {num_players} players")]
    ActionOutOfDomain { raw: i64, num_players: u8 },
    #[error("raw color code {raw} out of domain")]
    ColorOutOfDomain { raw: i64 },
    #[error("raw rank code {raw} out of domain")]
    RankOutOfDomain { raw: i64 },
}

/// One raw color index: which `Color` it decodes to and how it is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub color: Color,
    pub name: String,
}

/// Description templates for the four action kinds. Placeholders: `{slot}`,
/// `{target}` (1-based player number), `{color}`, `{rank}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTemplates {
    pub play: String,
    pub discard: String,
    pub clue_color: String,
    pub clue_rank: String,
}

impl Default for ActionTemplates {
    fn default() -> Self {
        ActionTemplates {
            play: "plays slot {slot}".to_string(),
            discard: "discards slot {slot}".to_string(),
            clue_color: "reveals {color} cards to Player {target}".to_string(),
            clue_rank: "reveals rank {rank} cards to Player {target}".to_string(),
        }
    }
}

/// Versioned raw-code lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTable {
    pub version: u32,
    /// Slot count covered by the discard/play bands.
    pub hand_slots: u8,
    /// Distinct ranks covered by the rank-clue band.
    pub num_ranks: u8,
    /// Sentinel marking a non-acting seat.
    pub no_op: i64,
    /// Raw color index -> color, in band order.
    pub colors: Vec<ColorEntry>,
    #[serde(default)]
    pub templates: ActionTemplates,
}

impl Default for ActionTable {
    fn default() -> Self {
        ActionTable::v1()
    }
}

impl ActionTable {
    /// Built-in table matching the recorded dumps.
    pub fn v1() -> ActionTable {
        let colors = Color::ALL
            .iter()
            .map(|&color| ColorEntry {
                color,
                name: color.name().to_string(),
            })
            .collect();
        ActionTable {
            version: TABLE_VERSION,
            hand_slots: 5,
            num_ranks: 5,
            no_op: 30,
            colors,
            templates: ActionTemplates::default(),
        }
    }

    /// Load a table from a JSON file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<ActionTable, CodecError> {
        let bytes = std::fs::read(path)?;
        let table: ActionTable = serde_json::from_slice(&bytes)?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        if self.version != TABLE_VERSION {
            return Err(CodecError::UnsupportedVersion(self.version));
        }
        if self.hand_slots == 0 {
            return Err(CodecError::InvalidTable("hand_slots must be > 0".to_string()));
        }
        if self.num_ranks == 0 || self.num_ranks > Rank::MAX {
            return Err(CodecError::InvalidTable(format!(
                "num_ranks must be in 1..={}",
                Rank::MAX
            )));
        }
        if self.colors.is_empty() {
            return Err(CodecError::InvalidTable("color map is empty".to_string()));
        }
        for (i, a) in self.colors.iter().enumerate() {
            if self.colors[..i].iter().any(|b| b.color == a.color) {
                return Err(CodecError::InvalidTable(format!(
                    "color {} mapped twice",
                    a.color
                )));
            }
        }
        Ok(())
    }

    /// True if `raw` marks a non-acting seat.
    pub fn is_sentinel(&self, raw: i64) -> bool {
        raw == self.no_op
    }

    /// Decode a raw color index from a deck tensor.
    pub fn color_for_raw(&self, raw: i64) -> Result<Color, CodecError> {
        usize::try_from(raw)
            .ok()
            .and_then(|i| self.colors.get(i))
            .map(|e| e.color)
            .ok_or(CodecError::ColorOutOfDomain { raw })
    }

    /// Decode a raw 0-based rank index from a deck tensor.
    pub fn rank_for_raw(&self, raw: i64) -> Result<Rank, CodecError> {
        u8::try_from(raw)
            .ok()
            .and_then(|r| Rank::new(r + 1))
            .ok_or(CodecError::RankOutOfDomain { raw })
    }

    /// Decode a raw action code for `actor` at a table of `num_players`.
    ///
    /// Clue targets come out as absolute player indices.
    pub fn decode(&self, raw: i64, actor: u8, num_players: u8) -> Result<Action, CodecError> {
        let out_of_domain = CodecError::ActionOutOfDomain { raw, num_players };
        if raw < 0 || num_players < 2 {
            return Err(out_of_domain);
        }

        let h = self.hand_slots as i64;
        let c = self.colors.len() as i64;
        let r = self.num_ranks as i64;
        let others = (num_players - 1) as i64;

        if raw < h {
            return Ok(Action::Discard { slot: raw as u8 });
        }
        if raw < 2 * h {
            return Ok(Action::Play {
                slot: (raw - h) as u8,
            });
        }

        let clue_color_base = 2 * h;
        let clue_rank_base = clue_color_base + others * c;
        let clue_end = clue_rank_base + others * r;

        if raw < clue_rank_base {
            let off = raw - clue_color_base;
            let target = (actor as i64 + off / c + 1) % num_players as i64;
            let color = self.color_for_raw(off % c)?;
            Ok(Action::ClueColor {
                target: target as u8,
                color,
            })
        } else if raw < clue_end {
            let off = raw - clue_rank_base;
            let target = (actor as i64 + off / r + 1) % num_players as i64;
            let rank = self.rank_for_raw(off % r)?;
            Ok(Action::ClueRank {
                target: target as u8,
                rank,
            })
        } else {
            Err(out_of_domain)
        }
    }

    /// Display name for `color`, falling back to the canonical name if the
    /// table does not map it.
    pub fn color_name(&self, color: Color) -> &str {
        self.colors
            .iter()
            .find(|e| e.color == color)
            .map(|e| e.name.as_str())
            .unwrap_or_else(|| color.name())
    }

    /// Render the fixed description template for `action`.
    pub fn describe(&self, action: &Action) -> String {
        match action {
            Action::Play { slot } => self.templates.play.replace("{slot}", &slot.to_string()),
            Action::Discard { slot } => {
                self.templates.discard.replace("{slot}", &slot.to_string())
            }
            Action::ClueColor { target, color } => self
                .templates
                .clue_color
                .replace("{target}", &(target + 1).to_string())
                .replace("{color}", self.color_name(*color)),
            Action::ClueRank { target, rank } => self
                .templates
                .clue_rank
                .replace("{target}", &(target + 1).to_string())
                .replace("{rank}", &rank.to_string()),
        }
    }
}
