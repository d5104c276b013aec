//! In-memory stores for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use bingo_db::models::{Card, DrawRecord, Grid, Mask, Pattern, PayoutReport};
use bingo_db::{CardStore, DrawStateStore, PatternStore, PayoutStore, StoreError, StoreResult};
use chrono::NaiveDate;

#[derive(Default)]
pub struct MemoryStore {
    pub cards: Vec<Card>,
    pub patterns: Vec<Pattern>,
    pub reports: Vec<PayoutReport>,
}

impl MemoryStore {
    pub fn add_card(&mut self, grid: Grid, is_paid: bool) -> i64 {
        let id = self.cards.len() as i64 + 1;
        self.cards.push(Card {
            id,
            owner_label: format!("Jugador {id}"),
            grid,
            sale_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            buyer_name: if is_paid { format!("Comprador {id}") } else { String::new() },
            is_paid,
        });
        id
    }

    pub fn add_pattern(&mut self, name: &str, cells: &[u8], is_active: bool) -> i64 {
        let id = self.patterns.len() as i64 + 1;
        self.patterns.push(Pattern {
            id,
            name: name.to_string(),
            mask: Mask::new(cells.iter().copied()).unwrap(),
            is_active,
        });
        id
    }

    pub fn add_report(&mut self) {
        let id = self.reports.len() as i64 + 1;
        self.reports.push(PayoutReport {
            id,
            created_at: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap().and_hms_opt(20, 0, 0).unwrap(),
            total_prize_amount: 100.0,
            detail: BTreeMap::from([("Línea".to_string(), 100.0)]),
        });
    }
}

impl CardStore for MemoryStore {
    fn list_paid_cards(&self) -> StoreResult<Vec<Card>> {
        Ok(self.cards.iter().filter(|c| c.is_paid).cloned().collect())
    }

    fn list_all_cards(&self) -> StoreResult<Vec<Card>> {
        Ok(self.cards.clone())
    }

    fn get_card(&self, id: i64) -> StoreResult<Card> {
        self.cards.iter().find(|c| c.id == id).cloned().ok_or(StoreError::CardNotFound(id))
    }
}

impl PatternStore for MemoryStore {
    fn list_active_patterns(&self) -> StoreResult<Vec<Pattern>> {
        Ok(self.patterns.iter().filter(|p| p.is_active).cloned().collect())
    }

    fn get_pattern(&self, id: i64) -> StoreResult<Pattern> {
        self.patterns.iter().find(|p| p.id == id).cloned().ok_or(StoreError::PatternNotFound(id))
    }
}

impl PayoutStore for MemoryStore {
    fn latest_report(&self) -> StoreResult<Option<PayoutReport>> {
        Ok(self.reports.last().cloned())
    }
}

/// Shared slot so a test can keep a handle while the engine owns the store.
#[derive(Clone, Default)]
pub struct MemoryDrawStore {
    slot: Rc<RefCell<Option<DrawRecord>>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryDrawStore {
    pub fn with_record(record: DrawRecord) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(record);
        store
    }

    pub fn saved(&self) -> Option<DrawRecord> {
        self.slot.borrow().clone()
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl DrawStateStore for MemoryDrawStore {
    fn load_draw_state(&self) -> StoreResult<Option<DrawRecord>> {
        Ok(self.slot.borrow().clone())
    }

    fn save_draw_state(&mut self, record: &DrawRecord) -> StoreResult<()> {
        if self.failing.get() {
            return Err(StoreError::Sqlite(bingo_db::rusqlite::Error::InvalidQuery));
        }
        *self.slot.borrow_mut() = Some(record.clone());
        Ok(())
    }
}
