use rusqlite::Connection;

use crate::error::StoreResult;
use crate::models::{Card, DrawRecord, Pattern, PayoutReport};
use crate::{cards, draw_state, patterns, payouts};

pub trait CardStore {
    fn list_paid_cards(&self) -> StoreResult<Vec<Card>>;
    fn list_all_cards(&self) -> StoreResult<Vec<Card>>;
    fn get_card(&self, id: i64) -> StoreResult<Card>;
}

pub trait PatternStore {
    fn list_active_patterns(&self) -> StoreResult<Vec<Pattern>>;
    fn get_pattern(&self, id: i64) -> StoreResult<Pattern>;
}

pub trait PayoutStore {
    fn latest_report(&self) -> StoreResult<Option<PayoutReport>>;
}

/// Durable home of the draw state singleton.
pub trait DrawStateStore {
    fn load_draw_state(&self) -> StoreResult<Option<DrawRecord>>;
    fn save_draw_state(&mut self, record: &DrawRecord) -> StoreResult<()>;
}

/// Handle over an open connection implementing every store.
#[derive(Clone, Copy)]
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl CardStore for SqliteStore<'_> {
    fn list_paid_cards(&self) -> StoreResult<Vec<Card>> {
        cards::list_paid_cards(self.conn)
    }

    fn list_all_cards(&self) -> StoreResult<Vec<Card>> {
        cards::list_all_cards(self.conn)
    }

    fn get_card(&self, id: i64) -> StoreResult<Card> {
        cards::get_card(self.conn, id)
    }
}

impl PatternStore for SqliteStore<'_> {
    fn list_active_patterns(&self) -> StoreResult<Vec<Pattern>> {
        patterns::list_active_patterns(self.conn)
    }

    fn get_pattern(&self, id: i64) -> StoreResult<Pattern> {
        patterns::get_pattern(self.conn, id)
    }
}

impl PayoutStore for SqliteStore<'_> {
    fn latest_report(&self) -> StoreResult<Option<PayoutReport>> {
        payouts::latest_report(self.conn)
    }
}

impl DrawStateStore for SqliteStore<'_> {
    fn load_draw_state(&self) -> StoreResult<Option<DrawRecord>> {
        draw_state::load_draw_state(self.conn)
    }

    fn save_draw_state(&mut self, record: &DrawRecord) -> StoreResult<()> {
        draw_state::save_draw_state(self.conn, record)
    }
}
