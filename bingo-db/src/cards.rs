use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{StoreError, StoreResult};
use crate::models::{Card, Grid};

const CARD_COLUMNS: &str = "id, owner_label, grid_json, sale_date, buyer_name, is_paid";

struct CardRow {
    id: i64,
    owner_label: String,
    grid_json: String,
    sale_date: NaiveDate,
    buyer_name: String,
    is_paid: bool,
}

impl CardRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_label: row.get(1)?,
            grid_json: row.get(2)?,
            sale_date: row.get(3)?,
            buyer_name: row.get(4)?,
            is_paid: row.get(5)?,
        })
    }

    fn into_card(self) -> StoreResult<Card> {
        let grid: Grid = serde_json::from_str(&self.grid_json)?;
        Ok(Card {
            id: self.id,
            owner_label: self.owner_label,
            grid,
            sale_date: self.sale_date,
            buyer_name: self.buyer_name,
            is_paid: self.is_paid,
        })
    }
}

fn query_cards(conn: &Connection, filter: &str) -> StoreResult<Vec<Card>> {
    let sql = format!("SELECT {CARD_COLUMNS} FROM cards {filter} ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], CardRow::read)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(CardRow::into_card).collect()
}

/// Deletes the current series and stores `grids` as the new one, ids restarting at 1.
pub fn replace_series(conn: &Connection, grids: &[Grid], sale_date: NaiveDate) -> StoreResult<Vec<Card>> {
    for grid in grids {
        grid.validate()?;
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM cards", [])?;
    tx.execute("DELETE FROM sqlite_sequence WHERE name = 'cards'", [])?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO cards (owner_label, grid_json, sale_date, buyer_name, is_paid)
             VALUES (?1, ?2, ?3, '', 0)",
        )?;
        for (i, grid) in grids.iter().enumerate() {
            let grid_json = serde_json::to_string(grid)?;
            stmt.execute(rusqlite::params![format!("Jugador {}", i + 1), grid_json, sale_date])?;
        }
    }
    tx.commit()?;

    tracing::info!(count = grids.len(), "nueva serie de cartones");
    list_all_cards(conn)
}

pub fn record_sale(conn: &Connection, id: i64, buyer_name: &str, is_paid: bool) -> StoreResult<Card> {
    let changed = conn.execute(
        "UPDATE cards SET buyer_name = ?1, is_paid = ?2 WHERE id = ?3",
        rusqlite::params![buyer_name.trim(), is_paid, id],
    )?;
    if changed == 0 {
        return Err(StoreError::CardNotFound(id));
    }
    get_card(conn, id)
}

pub fn get_card(conn: &Connection, id: i64) -> StoreResult<Card> {
    let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1");
    let row = conn
        .query_row(&sql, [id], CardRow::read)
        .optional()?
        .ok_or(StoreError::CardNotFound(id))?;
    row.into_card()
}

pub fn list_all_cards(conn: &Connection) -> StoreResult<Vec<Card>> {
    query_cards(conn, "")
}

pub fn list_paid_cards(conn: &Connection) -> StoreResult<Vec<Card>> {
    query_cards(conn, "WHERE is_paid = 1")
}

pub fn count_cards(conn: &Connection) -> StoreResult<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_paid_cards(conn: &Connection) -> StoreResult<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM cards WHERE is_paid = 1", [], |row| row.get(0))?;
    Ok(count)
}
