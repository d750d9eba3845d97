//! Dump tensor schema + version ids.

/// Version of the dump layout this reader understands.
pub const FORMAT_VERSION: u32 = 1;

/// Tensor names inside a game-dump safetensors file.
pub const T_ACTIONS: &str = "actions";
pub const T_DECKS: &str = "decks";
pub const T_NUM_ACTIONS: &str = "num_actions";
pub const T_NUM_PLAYERS: &str = "num_players";
pub const T_SCORES: &str = "scores";

/// Width of one encoded card in the deck tensor: (color, rank) pairs.
pub const CARD_WIDTH: usize = 2;
