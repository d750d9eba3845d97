//! Legal action enumeration for the current player.

use crate::action::Action;
use crate::card::{Color, Rank};
use crate::rules::Rules;
use crate::state::GameState;

/// Every action the current player could legally take in `state`.
///
/// Order is deterministic: plays by slot, discards by slot, color clues by
/// (target, color), rank clues by (target, rank). Empty on a terminal state.
pub fn legal_actions(rules: &Rules, state: &GameState) -> Vec<Action> {
    if state.is_terminal() {
        return Vec::new();
    }

    let actor = state.current_player();
    let num_players = state.num_players();
    let hand = &state.hands()[actor as usize];
    let mut out = Vec::new();

    for (slot, _) in hand.cards() {
        out.push(Action::Play { slot: slot as u8 });
    }

    let discard_ok =
        rules.allow_discard_at_max_clues || state.clue_tokens() < rules.max_clue_tokens;
    if discard_ok {
        for (slot, _) in hand.cards() {
            out.push(Action::Discard { slot: slot as u8 });
        }
    }

    if state.clue_tokens() > 0 {
        for offset in 1..num_players {
            let target = (actor + offset) % num_players;
            let target_hand = &state.hands()[target as usize];
            for color in Color::ALL {
                if rules.forbid_empty_clues
                    && !target_hand.cards().any(|(_, c)| c.color == color)
                {
                    continue;
                }
                out.push(Action::ClueColor { target, color });
            }
            for r in Rank::MIN..=Rank::MAX {
                // Rank::new only fails outside 1..=5.
                let Some(rank) = Rank::new(r) else { continue };
                if rules.forbid_empty_clues && !target_hand.cards().any(|(_, c)| c.rank == rank)
                {
                    continue;
                }
                out.push(Action::ClueRank { target, rank });
            }
        }
    }

    out
}
