//! ht-core: Hanabi rules, state representation, replay engine, and configuration.

pub mod action;
pub mod card;
pub mod config;
pub mod engine;
pub mod legal;
pub mod replay;
pub mod rules;
pub mod state;

pub use action::Action;
pub use card::{standard_deck, Card, Color, Rank};
pub use config::{Config, ConfigError};
pub use engine::{
    apply_action, initialize, is_terminal, score, Outcome, ReplayError, Transition,
};
pub use legal::legal_actions;
pub use replay::{replay_game, EndReason, Replay, ReplayStep};
pub use rules::{DealOrder, RefillRule, Rules, MAX_PLAYERS, MIN_PLAYERS};
pub use state::{Fireworks, GameState, Hand};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod legal_tests;
