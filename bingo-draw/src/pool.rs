use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use bingo_db::models::MAX_NUMBER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bolillero vacío")]
pub struct EmptyPool;

/// Balls still in the drum.
#[derive(Debug, Clone)]
pub struct BallPool {
    remaining: Vec<u8>,
    rng: StdRng,
}

impl BallPool {
    pub fn new(rng: StdRng) -> Self {
        let mut pool = Self {
            remaining: Vec::with_capacity(MAX_NUMBER as usize),
            rng,
        };
        pool.reset();
        pool
    }

    pub fn seeded(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self::new(rng)
    }

    pub fn reset(&mut self) {
        self.remaining.clear();
        self.remaining.extend(1..=MAX_NUMBER);
    }

    /// Removes and returns a uniformly chosen ball.
    pub fn draw_random(&mut self) -> Result<u8, EmptyPool> {
        if self.remaining.is_empty() {
            return Err(EmptyPool);
        }
        let idx = self.rng.random_range(0..self.remaining.len());
        Ok(self.remaining.swap_remove(idx))
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn contains(&self, number: u8) -> bool {
        self.remaining.contains(&number)
    }

    /// Refills the drum with everything except `drawn`.
    pub fn rebuild_without(&mut self, drawn: &[u8]) {
        self.reset();
        self.remaining.retain(|n| !drawn.contains(n));
    }

    pub(crate) fn put_back(&mut self, number: u8) {
        if !self.contains(number) {
            self.remaining.push(number);
        }
    }
}
