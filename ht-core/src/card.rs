//! Card domain types: colors, ranks, and the (color, rank) pair.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of firework colors.
pub const NUM_COLORS: usize = 5;

/// Number of distinct ranks per color.
pub const NUM_RANKS: usize = 5;

/// Copies of each rank in the standard deck, indexed by rank - 1.
pub const RANK_COUNTS: [u8; NUM_RANKS] = [3, 2, 2, 2, 1];

/// One of the five firework colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Yellow,
    Green,
    White,
    Blue,
}

impl Color {
    /// All colors in canonical order.
    pub const ALL: [Color; NUM_COLORS] = [
        Color::Red,
        Color::Yellow,
        Color::Green,
        Color::White,
        Color::Blue,
    ];

    /// Canonical index of this color (position in [`Color::ALL`]).
    pub fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Yellow => 1,
            Color::Green => 2,
            Color::White => 3,
            Color::Blue => 4,
        }
    }

    pub fn from_index(idx: usize) -> Option<Color> {
        Color::ALL.get(idx).copied()
    }

    /// Canonical display name. Renderers may override this with a lookup table name.
    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Yellow => "Yellow",
            Color::Green => "Green",
            Color::White => "White",
            Color::Blue => "Blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Card rank in 1..=5. Construction is checked so a `Rank` is always in domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Rank> {
        if (Rank::MIN..=Rank::MAX).contains(&value) {
            Some(Rank(value))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rank {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::new(value).ok_or_else(|| format!("rank out of range 1..=5: {value}"))
    }
}

impl From<Rank> for u8 {
    fn from(r: Rank) -> u8 {
        r.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single card: a (color, rank) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub color: Color,
    pub rank: Rank,
}

impl Card {
    pub fn new(color: Color, rank: Rank) -> Card {
        Card { color, rank }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.rank)
    }
}

/// The standard 50-card deck in color-major, rank-ascending order.
///
/// Per color: three 1s, two each of 2..4, one 5. Recorded games supply their
/// own shuffled deal order; this is the reference composition.
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(NUM_COLORS * 10);
    for color in Color::ALL {
        for (i, &copies) in RANK_COUNTS.iter().enumerate() {
            // Rank indices are 0-based here; Rank::new only fails out of 1..=5.
            let Some(rank) = Rank::new(i as u8 + 1) else {
                continue;
            };
            for _ in 0..copies {
                deck.push(Card::new(color, rank));
            }
        }
    }
    deck
}
