use rusqlite::{Connection, OptionalExtension};

use crate::error::StoreResult;
use crate::models::DrawRecord;

const DRAW_STATE_KEY: i64 = 1;

pub fn load_draw_state(conn: &Connection) -> StoreResult<Option<DrawRecord>> {
    let row = conn
        .query_row(
            "SELECT drawn_json, in_progress FROM draw_state WHERE id = ?1",
            [DRAW_STATE_KEY],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)),
        )
        .optional()?;

    match row {
        Some((drawn_json, in_progress)) => Ok(Some(DrawRecord {
            drawn_numbers: serde_json::from_str(&drawn_json)?,
            in_progress,
        })),
        None => Ok(None),
    }
}

pub fn save_draw_state(conn: &Connection, record: &DrawRecord) -> StoreResult<()> {
    let drawn_json = serde_json::to_string(&record.drawn_numbers)?;
    conn.execute(
        "INSERT INTO draw_state (id, drawn_json, in_progress) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET drawn_json = excluded.drawn_json, in_progress = excluded.in_progress",
        rusqlite::params![DRAW_STATE_KEY, drawn_json, record.in_progress],
    )?;
    Ok(())
}
