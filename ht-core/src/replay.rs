//! Whole-game replay driver: fold an action sequence over the engine and
//! collect a per-step record for downstream renderers.

use serde::Serialize;

use crate::action::Action;
use crate::card::Card;
use crate::engine::{apply_action, initialize, score, Outcome, ReplayError};
use crate::rules::Rules;
use crate::state::GameState;

/// Why a replay stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// All fuse tokens burned; the game is lost.
    FuseExhausted,
    /// Every stack reached rank 5.
    StacksComplete,
    /// The deck ran dry and every player took their final turn.
    FinalTurnsElapsed,
    /// The recorded action sequence ended before the game did.
    ActionsExhausted,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::FuseExhausted => "fuse_exhausted",
            EndReason::StacksComplete => "stacks_complete",
            EndReason::FinalTurnsElapsed => "final_turns_elapsed",
            EndReason::ActionsExhausted => "actions_exhausted",
        }
    }
}

/// One applied action: who acted, what they did, what it caused, and the
/// state afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub player: u8,
    pub action: Action,
    pub outcome: Outcome,
    pub state: GameState,
}

/// Deterministic reconstruction of one full game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub initial: GameState,
    pub steps: Vec<ReplayStep>,
    pub score: u8,
    pub end: EndReason,
}

impl Replay {
    /// State after the last applied action (the initial state if none).
    pub fn final_state(&self) -> &GameState {
        self.steps.last().map(|s| &s.state).unwrap_or(&self.initial)
    }
}

/// Replay a full game from its deal and recorded actions.
///
/// Pure in (rules, deal, actions): re-running produces an identical `Replay`.
/// Fails on the first invalid record or illegal action, reporting the turn
/// index; there is no partial recovery or skip-ahead.
pub fn replay_game(
    rules: &Rules,
    num_players: u8,
    deck: Vec<Card>,
    actions: &[Action],
) -> Result<Replay, ReplayError> {
    let initial = initialize(rules, num_players, deck)?;
    let mut state = initial.clone();
    let mut steps = Vec::with_capacity(actions.len());

    for &action in actions {
        if state.is_terminal() {
            return Err(ReplayError::IllegalAction {
                turn: state.turn(),
                reason: "action recorded after the game ended".to_string(),
            });
        }
        let player = state.current_player();
        let t = apply_action(rules, state, action)?;
        steps.push(ReplayStep {
            player,
            action,
            outcome: t.outcome,
            state: t.state.clone(),
        });
        state = t.state;
    }

    let end = if state.fuse_tokens() == 0 {
        EndReason::FuseExhausted
    } else if state.fireworks().all_complete() {
        EndReason::StacksComplete
    } else if state.endgame_turns_left() == Some(0) {
        EndReason::FinalTurnsElapsed
    } else {
        EndReason::ActionsExhausted
    };

    Ok(Replay {
        score: score(rules, &state),
        initial,
        steps,
        end,
    })
}
