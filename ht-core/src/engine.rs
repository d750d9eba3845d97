//! Replay engine: state transitions for the Hanabi ruleset.
//!
//! This module is the single place that mutates `GameState`. Transitions are
//! a pure function of (rules, state, action); replaying the same deal and
//! action sequence twice yields identical state sequences.

use serde::Serialize;
use thiserror::Error;

use crate::action::Action;
use crate::card::Card;
use crate::rules::{RefillRule, Rules, MAX_PLAYERS, MIN_PLAYERS};
use crate::state::{Fireworks, GameState, Hand};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// The game cannot be set up at all: bad player count or undersized deck.
    #[error("invalid setup: {reason}")]
    InvalidSetup { reason: String },
    /// An action is illegal in the state it was applied to.
    #[error("illegal action at turn {turn}: {reason}")]
    IllegalAction { turn: u32, reason: String },
    /// Record data is outside the expected domain. Upstream decoding already
    /// validates this; the engine rejects it again defensively.
    #[error("corrupt record at turn {turn}: {reason}")]
    CorruptRecord { turn: u32, reason: String },
}

/// What an applied action did, for rendering. Clue touch information is
/// derived here and never stored back into the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The card extended its firework stack.
    Played { card: Card, drew: Option<Card> },
    /// The card did not fit its stack: discarded, one fuse token burned.
    Misplayed { card: Card, drew: Option<Card> },
    Discarded { card: Card, drew: Option<Card> },
    /// Slots in the target hand matching the clue, in slot order.
    Clued { target: u8, touched: Vec<u8> },
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    pub outcome: Outcome,
}

/// Deal the initial hands and build the starting state.
///
/// Cards come off the front of the deck in the configured deal order. Fails
/// with `InvalidSetup` if the player count is outside 2..=5 or the deck is
/// too small for the full deal.
pub fn initialize(rules: &Rules, num_players: u8, deck: Vec<Card>) -> Result<GameState, ReplayError> {
    let hand_size = rules.hand_size(num_players).ok_or_else(|| ReplayError::InvalidSetup {
        reason: format!("unsupported player count {num_players} (expected {MIN_PLAYERS}..={MAX_PLAYERS})"),
    })? as usize;

    let need = hand_size * num_players as usize;
    if deck.len() < need {
        return Err(ReplayError::InvalidSetup {
            reason: format!(
                "deck of {} cards cannot deal {hand_size} to each of {num_players} players",
                deck.len()
            ),
        });
    }

    let mut dealt: Vec<Vec<Card>> = vec![Vec::with_capacity(hand_size); num_players as usize];
    match rules.deal {
        crate::rules::DealOrder::RoundRobin => {
            for (i, &card) in deck[..need].iter().enumerate() {
                dealt[i % num_players as usize].push(card);
            }
        }
        crate::rules::DealOrder::ContiguousBlocks => {
            for (p, hand) in dealt.iter_mut().enumerate() {
                hand.extend_from_slice(&deck[p * hand_size..(p + 1) * hand_size]);
            }
        }
    }

    Ok(GameState {
        deck,
        draw_pos: need,
        hands: dealt.into_iter().map(Hand::deal).collect(),
        fireworks: Fireworks::default(),
        discards: Vec::new(),
        clue_tokens: rules.max_clue_tokens,
        fuse_tokens: rules.max_fuse_tokens,
        current_player: 0,
        turn: 0,
        endgame_turns_left: None,
        terminal: false,
    })
}

/// Apply one action, producing the successor state and what happened.
pub fn apply_action(
    rules: &Rules,
    state: GameState,
    action: Action,
) -> Result<Transition, ReplayError> {
    validate_state(rules, &state)?;

    let turn = state.turn;
    if state.terminal {
        return Err(ReplayError::IllegalAction {
            turn,
            reason: "game is already over".to_string(),
        });
    }

    let mut s = state;
    let actor = s.current_player;
    let num_players = s.num_players();

    let outcome = match action {
        Action::Play { slot } => {
            let card = remove_from_hand(&mut s, actor, slot, rules.refill, turn)?;
            if s.fireworks.can_play(card) {
                s.fireworks.place(card);
                // Finishing a stack refunds a clue token.
                if card.rank.get() == 5 {
                    s.clue_tokens = (s.clue_tokens + 1).min(rules.max_clue_tokens);
                }
                let drew = draw_replacement(&mut s, actor, slot, rules.refill);
                Outcome::Played { card, drew }
            } else {
                s.discards.push(card);
                s.fuse_tokens = s.fuse_tokens.checked_sub(1).ok_or_else(|| {
                    ReplayError::CorruptRecord {
                        turn,
                        reason: "misplay with no fuse tokens left".to_string(),
                    }
                })?;
                let drew = draw_replacement(&mut s, actor, slot, rules.refill);
                Outcome::Misplayed { card, drew }
            }
        }
        Action::Discard { slot } => {
            if !rules.allow_discard_at_max_clues && s.clue_tokens == rules.max_clue_tokens {
                return Err(ReplayError::IllegalAction {
                    turn,
                    reason: format!(
                        "discard with clue tokens at the cap ({})",
                        rules.max_clue_tokens
                    ),
                });
            }
            let card = remove_from_hand(&mut s, actor, slot, rules.refill, turn)?;
            s.discards.push(card);
            s.clue_tokens = (s.clue_tokens + 1).min(rules.max_clue_tokens);
            let drew = draw_replacement(&mut s, actor, slot, rules.refill);
            Outcome::Discarded { card, drew }
        }
        Action::ClueColor { target, color } => {
            check_clue(&s, actor, target, turn)?;
            let touched = touched_slots(&s, target, |c| c.color == color);
            if rules.forbid_empty_clues && touched.is_empty() {
                return Err(ReplayError::IllegalAction {
                    turn,
                    reason: format!("color clue touches no card in player {target}'s hand"),
                });
            }
            s.clue_tokens -= 1;
            Outcome::Clued { target, touched }
        }
        Action::ClueRank { target, rank } => {
            check_clue(&s, actor, target, turn)?;
            let touched = touched_slots(&s, target, |c| c.rank == rank);
            if rules.forbid_empty_clues && touched.is_empty() {
                return Err(ReplayError::IllegalAction {
                    turn,
                    reason: format!("rank clue touches no card in player {target}'s hand"),
                });
            }
            s.clue_tokens -= 1;
            Outcome::Clued { target, touched }
        }
    };

    // Turn bookkeeping, identical for every action kind.
    s.current_player = (actor + 1) % num_players;
    s.turn += 1;
    if s.draw_pos >= s.deck.len() {
        s.endgame_turns_left = match s.endgame_turns_left {
            // Deck just ran dry: every player gets one final turn.
            None => Some(num_players),
            Some(n) => Some(n.saturating_sub(1)),
        };
    }
    s.terminal = compute_terminal(&s);

    Ok(Transition { state: s, outcome })
}

/// Terminal test: fuses exhausted, all stacks complete, or final turns elapsed.
pub fn is_terminal(_rules: &Rules, state: &GameState) -> bool {
    compute_terminal(state)
}

/// Final score. A game lost by burning out all fuse tokens scores 0; the
/// partial stack sum is still visible in the state for rendering. Otherwise
/// the score is the sum of stack tops (0..=25).
pub fn score(_rules: &Rules, state: &GameState) -> u8 {
    if state.fuse_tokens == 0 {
        0
    } else {
        state.fireworks.score_sum()
    }
}

fn compute_terminal(state: &GameState) -> bool {
    state.fuse_tokens == 0
        || state.fireworks.all_complete()
        || state.endgame_turns_left == Some(0)
}

fn check_clue(s: &GameState, actor: u8, target: u8, turn: u32) -> Result<(), ReplayError> {
    if target == actor {
        return Err(ReplayError::IllegalAction {
            turn,
            reason: format!("player {actor} cannot clue themselves"),
        });
    }
    if target >= s.num_players() {
        return Err(ReplayError::IllegalAction {
            turn,
            reason: format!("clue target {target} out of range"),
        });
    }
    if s.clue_tokens == 0 {
        return Err(ReplayError::IllegalAction {
            turn,
            reason: "clue with no clue tokens left".to_string(),
        });
    }
    Ok(())
}

fn touched_slots(s: &GameState, target: u8, pred: impl Fn(&Card) -> bool) -> Vec<u8> {
    s.hands[target as usize]
        .cards()
        .filter(|(_, c)| pred(c))
        .map(|(i, _)| i as u8)
        .collect()
}

fn remove_from_hand(
    s: &mut GameState,
    player: u8,
    slot: u8,
    refill: RefillRule,
    turn: u32,
) -> Result<Card, ReplayError> {
    let hand = &mut s.hands[player as usize];
    let card = match refill {
        RefillRule::VacatedSlot => hand.take_leaving_gap(slot as usize),
        RefillRule::ShiftAndAppend => hand.remove_shifting(slot as usize),
    };
    card.ok_or_else(|| ReplayError::IllegalAction {
        turn,
        reason: format!("player {player} has no card in slot {slot}"),
    })
}

fn draw_replacement(s: &mut GameState, player: u8, slot: u8, refill: RefillRule) -> Option<Card> {
    if s.draw_pos >= s.deck.len() {
        return None;
    }
    let card = s.deck[s.draw_pos];
    s.draw_pos += 1;
    match refill {
        RefillRule::VacatedSlot => s.hands[player as usize].fill_gap(slot as usize, card),
        RefillRule::ShiftAndAppend => s.hands[player as usize].push(card),
    }
    Some(card)
}

/// Defensive state validation run before every transition. A violation means
/// the record or a rule encoding is defective, not a transient condition.
fn validate_state(rules: &Rules, s: &GameState) -> Result<(), ReplayError> {
    let turn = s.turn;
    let corrupt = |reason: String| ReplayError::CorruptRecord { turn, reason };

    let num_players = s.hands.len();
    if !(MIN_PLAYERS as usize..=MAX_PLAYERS as usize).contains(&num_players) {
        return Err(corrupt(format!("state has {num_players} hands")));
    }
    if (s.current_player as usize) >= num_players {
        return Err(corrupt(format!(
            "current player {} out of range",
            s.current_player
        )));
    }
    if s.clue_tokens > rules.max_clue_tokens {
        return Err(corrupt(format!(
            "clue tokens {} above cap {}",
            s.clue_tokens, rules.max_clue_tokens
        )));
    }
    if s.fuse_tokens > rules.max_fuse_tokens {
        return Err(corrupt(format!(
            "fuse tokens {} above cap {}",
            s.fuse_tokens, rules.max_fuse_tokens
        )));
    }
    if s.draw_pos > s.deck.len() {
        return Err(corrupt("draw position past end of deck".to_string()));
    }
    if s.fireworks.tops.iter().any(|&t| t > 5) {
        return Err(corrupt("firework stack above rank 5".to_string()));
    }
    Ok(())
}
