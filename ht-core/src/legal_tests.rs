use crate::action::Action;
use crate::card::{standard_deck, Color};
use crate::engine::{apply_action, initialize};
use crate::legal::legal_actions;
use crate::rules::Rules;

#[test]
fn fresh_state_allows_plays_and_clues_but_no_discards() {
    let rules = Rules::standard();
    let s = initialize(&rules, 2, standard_deck()).unwrap();
    let legal = legal_actions(&rules, &s);

    let plays = legal.iter().filter(|a| matches!(a, Action::Play { .. })).count();
    let discards = legal
        .iter()
        .filter(|a| matches!(a, Action::Discard { .. }))
        .count();
    let clues = legal.iter().filter(|a| a.is_clue()).count();

    assert_eq!(plays, 5);
    // Clue tokens are at the cap, so discarding is off the table.
    assert_eq!(discards, 0);
    // One other player, five colors plus five ranks.
    assert_eq!(clues, 10);
}

#[test]
fn discards_open_up_once_a_token_is_spent() {
    let rules = Rules::standard();
    let s = initialize(&rules, 2, standard_deck()).unwrap();
    let s = apply_action(
        &rules,
        s,
        Action::ClueColor {
            target: 1,
            color: Color::Red,
        },
    )
    .unwrap()
    .state;

    let legal = legal_actions(&rules, &s);
    let discards = legal
        .iter()
        .filter(|a| matches!(a, Action::Discard { .. }))
        .count();
    assert_eq!(discards, 5);
}

#[test]
fn forbidding_empty_clues_prunes_untouching_clues() {
    let rules = Rules {
        forbid_empty_clues: true,
        ..Rules::standard()
    };
    let s = initialize(&rules, 2, standard_deck()).unwrap();
    let legal = legal_actions(&rules, &s);
    // Player 1's hand is all red with ranks 1..=5: one color clue, five rank clues.
    let clues: Vec<_> = legal.iter().filter(|a| a.is_clue()).collect();
    assert_eq!(clues.len(), 6);
    assert!(clues.contains(&&Action::ClueColor {
        target: 1,
        color: Color::Red,
    }));
}

#[test]
fn terminal_state_has_no_legal_actions() {
    let rules = Rules::standard();
    let mut s = initialize(&rules, 2, standard_deck()).unwrap();
    s.fuse_tokens = 0;
    s.terminal = true;
    assert!(legal_actions(&rules, &s).is_empty());
}

#[test]
fn multi_player_clues_cover_every_other_seat() {
    let rules = Rules::standard();
    let s = initialize(&rules, 4, standard_deck()).unwrap();
    let legal = legal_actions(&rules, &s);
    let clue_targets: std::collections::BTreeSet<u8> = legal
        .iter()
        .filter_map(|a| match a {
            Action::ClueColor { target, .. } | Action::ClueRank { target, .. } => Some(*target),
            _ => None,
        })
        .collect();
    assert_eq!(clue_targets.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
}
