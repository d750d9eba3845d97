//! Action space: the four things a player can do on their turn.

use serde::{Deserialize, Serialize};

use crate::card::{Color, Rank};

/// One player action. Slot and target indices are 0-based.
///
/// Clue targets are absolute player indices, already resolved from whatever
/// relative encoding the dataset used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Play the card at `slot` onto its firework stack.
    Play { slot: u8 },
    /// Discard the card at `slot` to regain a clue token.
    Discard { slot: u8 },
    /// Point out every card of `color` in `target`'s hand.
    ClueColor { target: u8, color: Color },
    /// Point out every card of `rank` in `target`'s hand.
    ClueRank { target: u8, rank: Rank },
}

impl Action {
    /// True for the two clue variants.
    pub fn is_clue(&self) -> bool {
        matches!(self, Action::ClueColor { .. } | Action::ClueRank { .. })
    }
}
