use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{StoreError, StoreResult};
use crate::models::{Mask, Pattern};

const PATTERN_COLUMNS: &str = "id, name, mask_json, is_active";

fn read_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, bool)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_pattern((id, name, mask_json, is_active): (i64, String, String, bool)) -> StoreResult<Pattern> {
    let mask: Mask = serde_json::from_str(&mask_json)?;
    Ok(Pattern { id, name, mask, is_active })
}

fn query_patterns(conn: &Connection, filter: &str) -> StoreResult<Vec<Pattern>> {
    let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns {filter} ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], read_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(into_pattern).collect()
}

/// Stores a new, inactive pattern. Names and masks are unique across patterns.
pub fn create_pattern(conn: &Connection, name: &str, mask: &Mask) -> StoreResult<Pattern> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidPattern("escriba un nombre para la modalidad".to_string()));
    }
    mask.validate_for_pattern()?;

    let mask_json = serde_json::to_string(mask)?;
    let existing: u32 = conn.query_row(
        "SELECT COUNT(*) FROM patterns WHERE name = ?1 OR mask_json = ?2",
        [name, mask_json.as_str()],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Err(StoreError::DuplicatePattern(name.to_string()));
    }

    conn.execute(
        "INSERT INTO patterns (name, mask_json, is_active) VALUES (?1, ?2, 0)",
        [name, mask_json.as_str()],
    )?;
    get_pattern(conn, conn.last_insert_rowid())
}

pub fn get_pattern(conn: &Connection, id: i64) -> StoreResult<Pattern> {
    let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns WHERE id = ?1");
    let row = conn
        .query_row(&sql, [id], read_row)
        .optional()?
        .ok_or(StoreError::PatternNotFound(id))?;
    into_pattern(row)
}

pub fn find_pattern_by_name(conn: &Connection, name: &str) -> StoreResult<Option<Pattern>> {
    let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns WHERE name = ?1");
    conn.query_row(&sql, [name.trim()], read_row)
        .optional()?
        .map(into_pattern)
        .transpose()
}

pub fn list_patterns(conn: &Connection) -> StoreResult<Vec<Pattern>> {
    query_patterns(conn, "")
}

pub fn list_active_patterns(conn: &Connection) -> StoreResult<Vec<Pattern>> {
    query_patterns(conn, "WHERE is_active = 1")
}

pub fn delete_pattern(conn: &Connection, id: i64) -> StoreResult<()> {
    let changed = conn.execute("DELETE FROM patterns WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(StoreError::PatternNotFound(id));
    }
    Ok(())
}

pub fn set_pattern_active(conn: &Connection, id: i64, active: bool) -> StoreResult<()> {
    let changed = conn.execute(
        "UPDATE patterns SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![active, id],
    )?;
    if changed == 0 {
        return Err(StoreError::PatternNotFound(id));
    }
    Ok(())
}

pub fn deactivate_all_patterns(conn: &Connection) -> StoreResult<()> {
    conn.execute("UPDATE patterns SET is_active = 0", [])?;
    Ok(())
}
