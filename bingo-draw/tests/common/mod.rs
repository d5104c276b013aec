use std::collections::BTreeMap;
use std::sync::OnceLock;

use bingo_db::db::migrate;
use bingo_db::models::{Card, Grid, Mask, Pattern};
use bingo_db::rusqlite::Connection;
use bingo_db::{cards, patterns, payouts};
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

static LOGGING: OnceLock<()> = OnceLock::new();

/// Test logging, level from `TEST_LOG` then `RUST_LOG`, quiet by default.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub fn card_grid() -> Grid {
    Grid::from_numbers([
        [3, 17, 33, 50, 66],
        [5, 20, 35, 52, 70],
        [1, 16, 0, 46, 61],
        [9, 28, 44, 59, 75],
        [15, 30, 31, 60, 62],
    ])
}

pub fn other_grid() -> Grid {
    Grid::from_numbers([
        [2, 18, 32, 47, 63],
        [4, 19, 34, 48, 64],
        [6, 21, 0, 49, 65],
        [7, 22, 36, 51, 67],
        [8, 23, 37, 53, 68],
    ])
}

pub fn open_memory() -> Connection {
    init_logging();
    let conn = Connection::open_in_memory().unwrap();
    migrate(&conn).unwrap();
    conn
}

pub struct Hall {
    pub cards: Vec<Card>,
    pub top_row: Pattern,
    pub full_card: Pattern,
}

/// Two cards sold and paid, one unsold, a top-row and a full-card pattern, report published.
pub fn prepare_hall(conn: &Connection) -> Hall {
    let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    cards::replace_series(conn, &[card_grid(), other_grid(), card_grid()], date).unwrap();
    cards::record_sale(conn, 1, "Rosa", true).unwrap();
    cards::record_sale(conn, 2, "Juan", true).unwrap();

    let top_row = patterns::create_pattern(conn, "Línea superior", &Mask::new([0, 1, 2, 3, 4]).unwrap()).unwrap();
    let full_card = patterns::create_pattern(conn, "Cartón lleno", &Mask::new(0..25).unwrap()).unwrap();

    payouts::publish_report(
        conn,
        date.and_hms_opt(19, 0, 0).unwrap(),
        &BTreeMap::from([
            ("Línea superior".to_string(), 50.0),
            ("Cartón lleno".to_string(), 200.0),
        ]),
    )
    .unwrap();

    Hall {
        cards: cards::list_all_cards(conn).unwrap(),
        top_row,
        full_card,
    }
}
