use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cards (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_label   TEXT NOT NULL DEFAULT '',
    grid_json     TEXT NOT NULL,
    sale_date     TEXT NOT NULL,
    buyer_name    TEXT NOT NULL DEFAULT '',
    is_paid       INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS patterns (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE,
    mask_json     TEXT NOT NULL UNIQUE,
    is_active     INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS payout_reports (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at    TEXT NOT NULL,
    total_prize   REAL NOT NULL,
    detail_json   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS draw_state (
    id            INTEGER PRIMARY KEY CHECK (id = 1),
    drawn_json    TEXT NOT NULL,
    in_progress   INTEGER NOT NULL DEFAULT 0
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("bingo.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("No se pudo crear la carpeta de datos del bingo {}", parent.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("No se pudo abrir la base de cartones y sorteos {}", path.display()))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("No se pudieron crear las tablas de cartones, modalidades, pagos y sorteo")?;
    Ok(())
}
