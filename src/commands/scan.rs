// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, pretty_table};
use crate::vulnerability::scan_vulnerability;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let days = *m.get_one::<i64>("days").unwrap();

    let store = SqliteStore::new(conn);
    let as_of = chrono::Utc::now().date_naive();
    let snaps = scan_vulnerability(&store, &store, &store, &store, days, as_of)?;

    if maybe_print_json(json_flag, jsonl_flag, &snaps)? {
        return Ok(());
    }
    if snaps.is_empty() {
        println!("Scan complete: no vulnerable users");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = snaps
        .iter()
        .map(|s| {
            vec![
                s.user_id.to_string(),
                format!("{:.2}", s.percent_income_left),
                format!("{:.2}", s.total_income),
                format!("{:.2}", s.total_expenses),
                format!("{:.2}", s.net_amount),
                format!("{:.2}", s.current_balance),
                s.risk_level.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["User", "% Left", "Income", "Expenses", "Net", "Balance", "Risk"],
            rows
        )
    );
    println!("Scan complete: {} vulnerable user(s)", snaps.len());
    Ok(())
}
