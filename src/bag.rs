//! 7-bag randomizer with an anti-repeat swap across bag boundaries.

use crate::pieces::TetrominoKind;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Number of recent draws remembered for the anti-repeat rule.
const HISTORY_LEN: usize = 7;

/// Bag of 7 tetrominoes (shuffled permutation, drawn from the front, refilled when empty).
#[derive(Debug, Clone)]
pub struct Bag {
    queue: VecDeque<TetrominoKind>,
    history: VecDeque<TetrominoKind>,
    rng: StdRng,
}

impl Bag {
    pub fn new(seed: u64) -> Self {
        Self {
            queue: VecDeque::with_capacity(TetrominoKind::ALL.len()),
            history: VecDeque::with_capacity(HISTORY_LEN),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn refill(&mut self) {
        let mut all = TetrominoKind::ALL;
        all.shuffle(&mut self.rng);
        if let Some(&last) = self.history.back() {
            avoid_repeat(&mut all, last, &mut self.rng);
        }
        self.queue.extend(all);
    }

    pub fn draw(&mut self) -> TetrominoKind {
        if self.queue.is_empty() {
            self.refill();
        }
        // Never empty right after a refill.
        let kind = self.queue.pop_front().unwrap_or(TetrominoKind::I);
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(kind);
        kind
    }

    #[cfg(test)]
    /// Pieces left in the current bag before the next refill.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    /// Most recent draws, oldest first.
    pub fn history(&self) -> impl Iterator<Item = TetrominoKind> + '_ {
        self.history.iter().copied()
    }
}

/// If the freshly shuffled bag would open with `last`, swap its head with a
/// uniformly chosen position in `1..len`. Returns whether the swap fired.
fn avoid_repeat<R: Rng>(bag: &mut [TetrominoKind], last: TetrominoKind, rng: &mut R) -> bool {
    if bag.len() < 2 || bag[0] != last {
        return false;
    }
    let j = rng.gen_range(1..bag.len());
    bag.swap(0, j);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_permutation(draws: &[TetrominoKind]) -> bool {
        draws.len() == 7 && TetrominoKind::ALL.iter().all(|k| draws.contains(k))
    }

    #[test]
    fn swap_fires_when_head_repeats_last() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut bag = TetrominoKind::ALL;
            bag.shuffle(&mut rng);
            let last = bag[0];
            assert!(avoid_repeat(&mut bag, last, &mut rng));
            assert_ne!(bag[0], last);
            let mut sorted = bag;
            sorted.sort_by_key(|k| k.color_index());
            assert_eq!(sorted, TetrominoKind::ALL);
        }
    }

    #[test]
    fn swap_is_skipped_when_head_differs() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bag = TetrominoKind::ALL;
        let before = bag;
        assert!(!avoid_repeat(&mut bag, TetrominoKind::L, &mut rng));
        assert_eq!(bag, before);
    }

    #[test]
    fn no_repeat_across_bag_boundary() {
        for seed in 0..200 {
            let mut bag = Bag::new(seed);
            let mut prev = bag.draw();
            for i in 1..70 {
                let kind = bag.draw();
                if i % 7 == 0 {
                    assert_ne!(kind, prev, "seed {seed} draw {i}");
                }
                prev = kind;
            }
        }
    }

    #[test]
    fn history_is_bounded() {
        let mut bag = Bag::new(3);
        let draws: Vec<_> = (0..20).map(|_| bag.draw()).collect();
        let history: Vec<_> = bag.history().collect();
        assert_eq!(history.len(), HISTORY_LEN);
        assert_eq!(history, draws[13..]);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Bag::new(42);
        let mut b = Bag::new(42);
        for _ in 0..30 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    proptest! {
        #[test]
        fn every_aligned_window_is_a_permutation(seed in any::<u64>(), bags in 1usize..8) {
            let mut bag = Bag::new(seed);
            for _ in 0..bags {
                let window: Vec<_> = (0..7).map(|_| bag.draw()).collect();
                prop_assert!(is_permutation(&window));
                prop_assert_eq!(bag.remaining(), 0);
            }
        }
    }
}
