use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{StoreError, StoreResult};
use crate::models::PayoutReport;

pub fn insert_report(
    conn: &Connection,
    created_at: NaiveDateTime,
    detail: &BTreeMap<String, f64>,
) -> StoreResult<PayoutReport> {
    let total: f64 = detail.values().sum();
    let detail_json = serde_json::to_string(detail)?;
    conn.execute(
        "INSERT INTO payout_reports (created_at, total_prize, detail_json) VALUES (?1, ?2, ?3)",
        rusqlite::params![created_at, total, detail_json],
    )?;
    Ok(PayoutReport {
        id: conn.last_insert_rowid(),
        created_at,
        total_prize_amount: total,
        detail: detail.clone(),
    })
}

/// Saves a report and makes exactly the patterns it names active, atomically.
pub fn publish_report(
    conn: &Connection,
    created_at: NaiveDateTime,
    detail: &BTreeMap<String, f64>,
) -> StoreResult<PayoutReport> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("UPDATE patterns SET is_active = 0", [])?;
    for name in detail.keys() {
        let changed = tx.execute("UPDATE patterns SET is_active = 1 WHERE name = ?1", [name])?;
        if changed == 0 {
            return Err(StoreError::UnknownPattern(name.clone()));
        }
    }
    let report = insert_report(&tx, created_at, detail)?;
    tx.commit()?;

    tracing::info!(report = report.id, total = report.total_prize_amount, "reporte de pagos guardado");
    Ok(report)
}

pub fn latest_report(conn: &Connection) -> StoreResult<Option<PayoutReport>> {
    let row = conn
        .query_row(
            "SELECT id, created_at, total_prize, detail_json FROM payout_reports ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, NaiveDateTime>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, created_at, total_prize_amount, detail_json)) => Ok(Some(PayoutReport {
            id,
            created_at,
            total_prize_amount,
            detail: serde_json::from_str(&detail_json)?,
        })),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use crate::models::Mask;
    use crate::patterns::{create_pattern, list_active_patterns, set_pattern_active};
    use chrono::NaiveDate;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap().and_hms_opt(hour, 30, 0).unwrap()
    }

    #[test]
    fn test_latest_report_empty() {
        let conn = setup();
        assert!(latest_report(&conn).unwrap().is_none());
    }

    #[test]
    fn test_latest_is_most_recent() {
        let conn = setup();
        insert_report(&conn, at(10), &BTreeMap::from([("Línea".to_string(), 50.0)])).unwrap();
        insert_report(&conn, at(9), &BTreeMap::from([
            ("Línea".to_string(), 40.0),
            ("Lleno".to_string(), 160.0),
        ])).unwrap();

        let latest = latest_report(&conn).unwrap().unwrap();
        assert_eq!(latest.id, 2);
        assert_eq!(latest.created_at, at(9));
        assert!((latest.total_prize_amount - 200.0).abs() < 1e-9);
        assert_eq!(latest.detail.len(), 2);
    }

    #[test]
    fn test_publish_activates_named_patterns_only() {
        let conn = setup();
        let line = create_pattern(&conn, "Línea", &Mask::new([0, 1, 2, 3, 4]).unwrap()).unwrap();
        let full = create_pattern(&conn, "Lleno", &Mask::new(0..25).unwrap()).unwrap();
        set_pattern_active(&conn, line.id, true).unwrap();

        publish_report(&conn, at(20), &BTreeMap::from([("Lleno".to_string(), 300.0)])).unwrap();

        let active = list_active_patterns(&conn).unwrap();
        assert_eq!(active.iter().map(|p| p.id).collect::<Vec<_>>(), vec![full.id]);
    }

    #[test]
    fn test_publish_unknown_pattern_rolls_back() {
        let conn = setup();
        let line = create_pattern(&conn, "Línea", &Mask::new([0, 1, 2, 3, 4]).unwrap()).unwrap();
        set_pattern_active(&conn, line.id, true).unwrap();

        let err = publish_report(&conn, at(20), &BTreeMap::from([("Cuatro esquinas".to_string(), 10.0)]))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownPattern(_)));
        assert!(latest_report(&conn).unwrap().is_none());
        assert_eq!(list_active_patterns(&conn).unwrap().len(), 1);
    }
}
