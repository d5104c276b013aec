use std::collections::HashSet;

use bingo_db::DrawStateStore;
use bingo_db::models::{DrawRecord, MAX_NUMBER};

use crate::error::{DrawError, InvalidReason};

/// Authoritative record of draw progress. Every mutation is written through to the
/// store before it returns; a failed write leaves memory as it was.
pub struct DrawState<S> {
    store: S,
    record: DrawRecord,
}

impl<S: DrawStateStore> DrawState<S> {
    /// Reads the persisted record, or starts from an empty, idle state on first run.
    pub fn open(store: S) -> Result<Self, DrawError> {
        let mut state = Self {
            store,
            record: DrawRecord::default(),
        };
        state.record = state.load()?;
        Ok(state)
    }

    /// Ignores whatever is persisted; the next `start` overwrites it.
    pub fn idle(store: S) -> Self {
        Self {
            store,
            record: DrawRecord::default(),
        }
    }

    /// Current durable view of the state.
    pub fn load(&self) -> Result<DrawRecord, DrawError> {
        let record = self.store.load_draw_state()?.unwrap_or_default();
        check_record(&record)?;
        Ok(record)
    }

    pub fn start(&mut self) -> Result<(), DrawError> {
        self.replace(DrawRecord {
            drawn_numbers: Vec::with_capacity(MAX_NUMBER as usize),
            in_progress: true,
        })
    }

    pub fn record_draw(&mut self, number: u8) -> Result<(), DrawError> {
        if let Err(reason) = check_number(&self.record.drawn_numbers, number) {
            tracing::error!(number, %reason, drawn = self.record.drawn_numbers.len(), "número rechazado");
            return Err(DrawError::InvalidNumber { number, reason });
        }

        self.record.drawn_numbers.push(number);
        if let Err(e) = self.store.save_draw_state(&self.record) {
            self.record.drawn_numbers.pop();
            tracing::warn!(number, error = %e, "no se pudo guardar el número, se revierte");
            return Err(e.into());
        }
        Ok(())
    }

    /// Closes the session but keeps the called numbers for review.
    pub fn stop(&mut self) -> Result<(), DrawError> {
        let next = DrawRecord {
            drawn_numbers: self.record.drawn_numbers.clone(),
            in_progress: false,
        };
        self.replace(next)
    }

    pub fn drawn_numbers(&self) -> &[u8] {
        &self.record.drawn_numbers
    }

    pub fn drawn_set(&self) -> HashSet<u8> {
        self.record.drawn_numbers.iter().copied().collect()
    }

    pub fn in_progress(&self) -> bool {
        self.record.in_progress
    }

    fn replace(&mut self, next: DrawRecord) -> Result<(), DrawError> {
        if let Err(e) = self.store.save_draw_state(&next) {
            tracing::warn!(error = %e, "no se pudo guardar el estado del sorteo");
            return Err(e.into());
        }
        self.record = next;
        Ok(())
    }
}

fn check_number(drawn: &[u8], number: u8) -> Result<(), InvalidReason> {
    if !(1..=MAX_NUMBER).contains(&number) {
        return Err(InvalidReason::OutOfRange);
    }
    if drawn.contains(&number) {
        return Err(InvalidReason::AlreadyDrawn);
    }
    Ok(())
}

fn check_record(record: &DrawRecord) -> Result<(), DrawError> {
    for (i, &number) in record.drawn_numbers.iter().enumerate() {
        if let Err(reason) = check_number(&record.drawn_numbers[..i], number) {
            tracing::error!(number, %reason, "estado guardado inconsistente");
            return Err(DrawError::InvalidNumber { number, reason });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryDrawStore;

    #[test]
    fn test_first_run_is_idle() {
        let state = DrawState::open(MemoryDrawStore::default()).unwrap();
        assert!(!state.in_progress());
        assert!(state.drawn_numbers().is_empty());
    }

    #[test]
    fn test_start_clears_and_persists() {
        let store = MemoryDrawStore::with_record(DrawRecord { drawn_numbers: vec![4, 9], in_progress: false });
        let mut state = DrawState::open(store.clone()).unwrap();
        assert_eq!(state.drawn_numbers(), &[4, 9]);

        state.start().unwrap();
        assert!(state.drawn_numbers().is_empty());
        assert_eq!(store.saved(), Some(DrawRecord { drawn_numbers: vec![], in_progress: true }));

        state.record_draw(12).unwrap();
        state.start().unwrap();
        assert!(state.drawn_numbers().is_empty());
    }

    #[test]
    fn test_record_then_load_contains_number_once() {
        let mut state = DrawState::open(MemoryDrawStore::default()).unwrap();
        state.start().unwrap();
        state.record_draw(33).unwrap();
        state.record_draw(61).unwrap();

        let loaded = state.load().unwrap();
        assert_eq!(loaded.drawn_numbers.iter().filter(|&&n| n == 33).count(), 1);
        assert_eq!(loaded.drawn_numbers, vec![33, 61]);
        assert!(loaded.in_progress);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut state = DrawState::open(MemoryDrawStore::default()).unwrap();
        state.start().unwrap();
        state.record_draw(5).unwrap();

        assert!(matches!(
            state.record_draw(5),
            Err(DrawError::InvalidNumber { number: 5, reason: InvalidReason::AlreadyDrawn })
        ));
        assert!(matches!(
            state.record_draw(0),
            Err(DrawError::InvalidNumber { reason: InvalidReason::OutOfRange, .. })
        ));
        assert!(matches!(
            state.record_draw(76),
            Err(DrawError::InvalidNumber { reason: InvalidReason::OutOfRange, .. })
        ));
        assert_eq!(state.drawn_numbers(), &[5]);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let store = MemoryDrawStore::default();
        let mut state = DrawState::open(store.clone()).unwrap();
        state.start().unwrap();
        state.record_draw(10).unwrap();

        store.fail_writes(true);
        assert!(matches!(state.record_draw(11), Err(DrawError::Persistence(_))));
        assert_eq!(state.drawn_numbers(), &[10]);
        assert!(matches!(state.stop(), Err(DrawError::Persistence(_))));
        assert!(state.in_progress());
        assert_eq!(store.saved().unwrap().drawn_numbers, vec![10]);

        store.fail_writes(false);
        state.record_draw(11).unwrap();
        assert_eq!(state.load().unwrap().drawn_numbers, vec![10, 11]);
    }

    #[test]
    fn test_stop_keeps_numbers() {
        let mut state = DrawState::open(MemoryDrawStore::default()).unwrap();
        state.start().unwrap();
        state.record_draw(70).unwrap();
        state.stop().unwrap();
        assert!(!state.in_progress());
        assert_eq!(state.load().unwrap().drawn_numbers, vec![70]);
    }

    #[test]
    fn test_idle_ignores_saved_record_until_start() {
        let store = MemoryDrawStore::with_record(DrawRecord { drawn_numbers: vec![9, 80], in_progress: true });
        let mut state = DrawState::idle(store.clone());
        assert!(!state.in_progress());
        assert!(state.drawn_numbers().is_empty());
        assert!(state.load().is_err());

        state.start().unwrap();
        assert_eq!(store.saved(), Some(DrawRecord { drawn_numbers: vec![], in_progress: true }));
    }

    #[test]
    fn test_corrupt_record_rejected() {
        let store = MemoryDrawStore::with_record(DrawRecord { drawn_numbers: vec![3, 3], in_progress: true });
        assert!(matches!(
            DrawState::open(store),
            Err(DrawError::InvalidNumber { number: 3, reason: InvalidReason::AlreadyDrawn })
        ));
    }
}
