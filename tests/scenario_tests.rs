// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! End-to-end walk through the evaluator and scorer over one manual ledger.

use budgetmind::insight::insight_context;
use budgetmind::limits::{recalc_spending_flag, SPENDING_LIMIT_NOTE};
use budgetmind::models::RiskLevel;
use budgetmind::store::{SqliteStore, UserStore};
use budgetmind::vulnerability::scan_vulnerability;
use budgetmind::window::ledger_window;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    budgetmind::db::init_schema(&mut conn).unwrap();
    conn
}

#[test]
fn manual_ledger_end_to_end() {
    let conn = setup();
    conn.execute("INSERT INTO users(username) VALUES ('sam')", [])
        .unwrap();
    let uid = conn.last_insert_rowid();

    // No aggregator connection, spending limit left unset (default 1000).
    for (kind, category, amount) in [
        ("income", "Salary", "2000"),
        ("expense", "Dining", "600"),
        ("expense", "Transport", "500"),
    ] {
        conn.execute(
            "INSERT INTO entries(user_id, kind, category, amount, created_at)
             VALUES (?1, ?2, ?3, ?4, '2025-08-01 09:00:00')",
            params![uid, kind, category, amount],
        )
        .unwrap();
    }

    let store = SqliteStore::new(&conn);

    // Spending-limit evaluation: 1100 > 1000 -> flagged, one note.
    recalc_spending_flag(&store, &store, uid).unwrap();
    let flagged: i64 = conn
        .query_row("SELECT is_flagged FROM users WHERE id=?1", params![uid], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(flagged, 1);
    let notes = store.notes(uid).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, SPENDING_LIMIT_NOTE);

    // Vulnerability scan over the same ledger: net 900 of 2000 income,
    // 45% left -> low tier.
    let as_of = NaiveDate::from_ymd_opt(2025, 8, 6).unwrap();
    let snaps = scan_vulnerability(&store, &store, &store, &store, 30, as_of).unwrap();
    assert_eq!(snaps.len(), 1);
    let snap = &snaps[0];
    assert_eq!(snap.user_id, uid);
    assert_eq!(snap.total_income, Decimal::new(2000, 0));
    assert_eq!(snap.total_expenses, Decimal::new(1100, 0));
    assert_eq!(snap.net_amount, Decimal::new(900, 0));
    assert_eq!(snap.percent_income_left, Decimal::new(45, 0));
    assert_eq!(snap.risk_level, RiskLevel::Low);

    // The assistant context composed from the same window.
    let cutoff = as_of - chrono::Duration::days(30);
    let win = ledger_window(&store, uid, cutoff).unwrap();
    let ctx = insight_context(&win);
    assert_eq!(ctx.total_income, Decimal::new(2000, 0));
    assert_eq!(ctx.total_expenses, Decimal::new(1100, 0));
    assert_eq!(ctx.net_income, Decimal::new(900, 0));
    assert_eq!(ctx.transaction_lines.len(), 3);
    let prompt = ctx.render_prompt();
    assert!(prompt.contains("Total income: 2000"));
    assert!(prompt.contains("Net income: 900"));
}
