// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Bank transactions whose date no aggregation will ever parse.
    //    These rows are silently dropped from every window.
    let mut stmt = conn.prepare("SELECT transaction_id, date FROM bank_transactions")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let txid: String = r.get(0)?;
        let d: String = r.get(1)?;
        if crate::window::parse_txn_date(&d).is_none() {
            rows.push(vec!["unparseable_date".into(), format!("{} '{}'", txid, d)]);
        }
    }

    // 2) Ledger entries with amounts that do not parse.
    let mut stmt2 = conn.prepare("SELECT id, amount FROM entries")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let a: String = r.get(1)?;
        if a.parse::<Decimal>().is_err() {
            rows.push(vec!["bad_entry_amount".into(), format!("entry {} '{}'", id, a)]);
        }
    }

    // 3) Users whose configured limit will silently fall back to the default.
    let mut stmt3 =
        conn.prepare("SELECT id, spending_limit FROM users WHERE spending_limit IS NOT NULL")?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let id: i64 = r.get(0)?;
        let lim: String = r.get(1)?;
        if lim.parse::<Decimal>().is_err() {
            rows.push(vec![
                "bad_spending_limit".into(),
                format!("user {} '{}'", id, lim),
            ]);
        }
    }

    // 4) Snapshots pointing at users that no longer exist.
    let mut stmt4 = conn.prepare(
        "SELECT s.user_id FROM vulnerability_snapshots s
         LEFT JOIN users u ON u.id=s.user_id WHERE u.id IS NULL",
    )?;
    let mut cur4 = stmt4.query([])?;
    while let Some(r) = cur4.next()? {
        let uid: i64 = r.get(0)?;
        rows.push(vec!["orphan_snapshot".into(), format!("user {}", uid)]);
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
