use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use ht_core::{
    apply_action, initialize, legal_actions, replay_game, standard_deck, Action, Card, Rules,
};
use ht_dataset::ActionTable;

/// Record one random legal game up front so the benchmark replays a fixed
/// (deal, actions) input.
fn scripted_game(seed: u64) -> (Vec<Card>, Vec<Action>) {
    let rules = Rules::standard();
    let mut deck = standard_deck();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);

    let mut actions = Vec::new();
    let mut state = initialize(&rules, 3, deck.clone()).expect("bench setup");
    while !state.is_terminal() {
        let legal = legal_actions(&rules, &state);
        let a = legal[rng.gen_range(0..legal.len())];
        actions.push(a);
        state = apply_action(&rules, state, a).expect("bench action").state;
    }
    (deck, actions)
}

fn bench_replay_full_game(c: &mut Criterion) {
    let rules = Rules::standard();
    let (deck, actions) = scripted_game(0xC0FFEE);

    c.bench_function("replay/full_game", |b| {
        b.iter(|| {
            let replay =
                replay_game(&rules, 3, black_box(deck.clone()), black_box(&actions)).unwrap();
            black_box(replay.score)
        })
    });
}

fn bench_decode_action_codes(c: &mut Criterion) {
    let table = ActionTable::v1();

    c.bench_function("decode/raw_codes", |b| {
        b.iter(|| {
            let mut decoded = 0usize;
            for raw in 0..30i64 {
                if table.decode(black_box(raw), 0, 3).is_ok() {
                    decoded += 1;
                }
            }
            black_box(decoded)
        })
    });
}

criterion_group!(benches, bench_replay_full_game, bench_decode_action_codes);
criterion_main!(benches);
