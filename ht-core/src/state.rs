//! Board state: hands, firework stacks, discard pile, and the aggregate
//! `GameState` the engine threads through a replay.

use crate::card::{Card, Color, NUM_COLORS};

/// One player's hand, slot-indexed. A slot is `None` after a play or discard
/// until a draw refills it (vacated-slot refill keeps the gap; shift-and-append
/// removes it).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hand {
    pub(crate) slots: Vec<Option<Card>>,
}

impl Hand {
    pub(crate) fn deal(cards: Vec<Card>) -> Hand {
        Hand {
            slots: cards.into_iter().map(Some).collect(),
        }
    }

    /// Card at `slot`, or None for an empty or out-of-range slot.
    pub fn slot(&self, slot: usize) -> Option<Card> {
        self.slots.get(slot).copied().flatten()
    }

    /// Number of slots, including empty ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// All slots in order, empty ones included.
    pub fn slots(&self) -> &[Option<Card>] {
        &self.slots
    }

    /// Occupied slots as (slot, card) pairs.
    pub fn cards(&self) -> impl Iterator<Item = (usize, Card)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|c| (i, c)))
    }

    pub(crate) fn take_leaving_gap(&mut self, slot: usize) -> Option<Card> {
        self.slots.get_mut(slot).and_then(|s| s.take())
    }

    pub(crate) fn remove_shifting(&mut self, slot: usize) -> Option<Card> {
        if slot >= self.slots.len() {
            return None;
        }
        self.slots.remove(slot)
    }

    pub(crate) fn fill_gap(&mut self, slot: usize, card: Card) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(card);
        }
    }

    pub(crate) fn push(&mut self, card: Card) {
        self.slots.push(Some(card));
    }
}

/// Per-color firework stacks, tracked as the top rank of each stack
/// (0 means nothing played). Stacks grow by exactly one rank at a time,
/// starting at 1, so the top rank fully describes a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fireworks {
    pub(crate) tops: [u8; NUM_COLORS],
}

impl Fireworks {
    /// Current top rank for `color` (0 if the stack is empty).
    pub fn top(&self, color: Color) -> u8 {
        self.tops[color.index()]
    }

    /// Would `card` extend its stack?
    pub fn can_play(&self, card: Card) -> bool {
        card.rank.get() == self.tops[card.color.index()] + 1
    }

    pub(crate) fn place(&mut self, card: Card) {
        debug_assert!(self.can_play(card));
        self.tops[card.color.index()] = card.rank.get();
    }

    /// All five stacks at rank 5.
    pub fn all_complete(&self) -> bool {
        self.tops.iter().all(|&t| t == 5)
    }

    /// Sum of top ranks across all stacks (0..=25).
    pub fn score_sum(&self) -> u8 {
        self.tops.iter().sum()
    }

    /// (color, top rank) pairs in canonical color order.
    pub fn stacks(&self) -> impl Iterator<Item = (Color, u8)> + '_ {
        Color::ALL.iter().map(move |&c| (c, self.top(c)))
    }
}

/// Full board state after some number of applied actions.
///
/// Mutation happens only inside the engine; everything here is read-only for
/// consumers. The deck is kept whole and immutable with a draw position, so
/// the remainder is `deck()[draw_pos()..]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) deck: Vec<Card>,
    pub(crate) draw_pos: usize,
    pub(crate) hands: Vec<Hand>,
    pub(crate) fireworks: Fireworks,
    pub(crate) discards: Vec<Card>,
    pub(crate) clue_tokens: u8,
    pub(crate) fuse_tokens: u8,
    pub(crate) current_player: u8,
    pub(crate) turn: u32,
    pub(crate) endgame_turns_left: Option<u8>,
    pub(crate) terminal: bool,
}

impl GameState {
    /// The full deal order, including cards already drawn.
    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    /// Index of the next card to draw.
    pub fn draw_pos(&self) -> usize {
        self.draw_pos
    }

    /// Undrawn remainder of the deck.
    pub fn deck_remaining(&self) -> &[Card] {
        &self.deck[self.draw_pos..]
    }

    pub fn num_players(&self) -> u8 {
        self.hands.len() as u8
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn hand(&self, player: u8) -> Option<&Hand> {
        self.hands.get(player as usize)
    }

    pub fn fireworks(&self) -> &Fireworks {
        &self.fireworks
    }

    /// Cards removed from play by discards and misplays, in removal order.
    pub fn discards(&self) -> &[Card] {
        &self.discards
    }

    pub fn clue_tokens(&self) -> u8 {
        self.clue_tokens
    }

    pub fn fuse_tokens(&self) -> u8 {
        self.fuse_tokens
    }

    pub fn current_player(&self) -> u8 {
        self.current_player
    }

    /// Number of actions applied so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Remaining final turns once the deck has run dry; None while cards are
    /// still being drawn.
    pub fn endgame_turns_left(&self) -> Option<u8> {
        self.endgame_turns_left
    }

    /// Cached terminal flag, updated after every applied action.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}
