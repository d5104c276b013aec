use bingo_db::models::{Card, DrawRecord, Letter, Pattern};
use bingo_db::{CardStore, DrawStateStore, PatternStore, PayoutStore, StoreError};
use rand::rngs::StdRng;

use crate::error::{DrawError, InvalidReason};
use crate::matcher::matches;
use crate::pool::{BallPool, EmptyPool};
use crate::state::DrawState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    NotStarted,
    InProgress,
    /// All 75 balls called; winners can still be checked.
    Exhausted,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawnBall {
    pub number: u8,
    pub letter: Letter,
}

impl DrawnBall {
    fn new(number: u8) -> Result<Self, DrawError> {
        let letter = Letter::of(number).ok_or(DrawError::InvalidNumber {
            number,
            reason: InvalidReason::OutOfRange,
        })?;
        Ok(Self { number, letter })
    }
}

impl std::fmt::Display for DrawnBall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.letter, self.number)
    }
}

/// Runs one draw session: the drum, the durable state and the winner search.
///
/// Mutating calls take `&mut self`, reads take `&self`, so a caller cannot interleave a
/// write with a read of a half-updated board. Every mutating call either completes in
/// memory and in storage, or leaves both untouched.
pub struct DrawEngine<C, S> {
    catalog: C,
    state: DrawState<S>,
    pool: BallPool,
}

impl<C, S> DrawEngine<C, S>
where
    C: CardStore + PatternStore + PayoutStore,
    S: DrawStateStore,
{
    /// Loads the persisted state; a draw left in progress continues with the balls
    /// that had not been called yet.
    pub fn resume(catalog: C, state_store: S, rng: StdRng) -> Result<Self, DrawError> {
        let state = DrawState::open(state_store)?;
        let mut pool = BallPool::new(rng);
        pool.rebuild_without(state.drawn_numbers());

        if state.in_progress() {
            tracing::info!(
                drawn = state.drawn_numbers().len(),
                remaining = pool.remaining(),
                "sorteo reanudado"
            );
        }

        Ok(Self { catalog, state, pool })
    }

    /// Opens without replaying the persisted record, for when `resume` rejected it.
    /// The engine is idle until `start_draw` overwrites the stored state.
    pub fn recover(catalog: C, state_store: S, rng: StdRng) -> Self {
        tracing::warn!("estado del sorteo descartado, se espera un sorteo nuevo");
        Self {
            catalog,
            state: DrawState::idle(state_store),
            pool: BallPool::new(rng),
        }
    }

    pub fn start_draw(&mut self) -> Result<(), DrawError> {
        if self.catalog.list_active_patterns()?.is_empty() {
            return Err(DrawError::NoActivePattern);
        }
        if self.catalog.list_paid_cards()?.is_empty() {
            return Err(DrawError::NoSoldCards);
        }
        if self.catalog.latest_report()?.is_none() {
            return Err(DrawError::NoPayoutReport);
        }

        let previous = self.pool.clone();
        self.pool.reset();
        if let Err(e) = self.state.start() {
            self.pool = previous;
            return Err(e);
        }

        tracing::info!("sorteo iniciado");
        Ok(())
    }

    pub fn draw_next(&mut self) -> Result<DrawnBall, DrawError> {
        if !self.state.in_progress() {
            return Err(DrawError::DrawNotStarted);
        }

        let number = self
            .pool
            .draw_random()
            .map_err(|EmptyPool| DrawError::DrawExhausted)?;

        if let Err(e) = self.state.record_draw(number) {
            self.pool.put_back(number);
            return Err(e);
        }

        let ball = DrawnBall::new(number)?;
        tracing::debug!(ball = %ball, remaining = self.pool.remaining(), "bolilla");
        Ok(ball)
    }

    /// Paid cards satisfying the pattern with the numbers called so far, in store order.
    pub fn find_winners(&self, pattern_id: i64) -> Result<Vec<Card>, DrawError> {
        let pattern = self.catalog.get_pattern(pattern_id).map_err(|e| match e {
            StoreError::PatternNotFound(id) => DrawError::PatternNotFound(id),
            other => DrawError::Persistence(other),
        })?;

        let drawn = self.state.drawn_set();
        let winners: Vec<Card> = self
            .catalog
            .list_paid_cards()?
            .into_iter()
            .filter(|card| matches(card, &pattern, &drawn))
            .collect();

        tracing::debug!(pattern = %pattern.name, winners = winners.len(), "verificación");
        Ok(winners)
    }

    pub fn end_draw(&mut self) -> Result<(), DrawError> {
        self.state.stop()?;
        tracing::info!(drawn = self.state.drawn_numbers().len(), "sorteo finalizado");
        Ok(())
    }

    pub fn phase(&self) -> DrawPhase {
        match (self.state.in_progress(), self.pool.remaining()) {
            (true, 0) => DrawPhase::Exhausted,
            (true, _) => DrawPhase::InProgress,
            (false, _) if self.state.drawn_numbers().is_empty() => DrawPhase::NotStarted,
            (false, _) => DrawPhase::Ended,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pool.remaining()
    }

    pub fn drawn_numbers(&self) -> &[u8] {
        self.state.drawn_numbers()
    }

    pub fn last_drawn(&self) -> Option<DrawnBall> {
        self.state
            .drawn_numbers()
            .last()
            .and_then(|&n| DrawnBall::new(n).ok())
    }

    /// State as currently persisted.
    pub fn load(&self) -> Result<DrawRecord, DrawError> {
        self.state.load()
    }

    pub fn active_patterns(&self) -> Result<Vec<Pattern>, DrawError> {
        Ok(self.catalog.list_active_patterns()?)
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }
}
