// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::limits::{recalc_spending_flag, DEFAULT_SPENDING_LIMIT};
use crate::models::EntryKind;
use crate::store::{LedgerStore, SqliteStore, UserStore};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("recalc", sub)) => recalc(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn recalc(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let store = SqliteStore::new(conn);
    recalc_spending_flag(&store, &store, user_id)?;

    if !store.user_exists(user_id)? {
        println!("User {} not found, nothing to recalculate", user_id);
        return Ok(());
    }
    let total: Decimal = store
        .entries(user_id)?
        .iter()
        .filter(|e| e.kind == EntryKind::Expense)
        .map(|e| e.amount)
        .sum();
    let limit = store
        .spending_limit(user_id)?
        .unwrap_or(*DEFAULT_SPENDING_LIMIT);
    println!(
        "User {}: expenses {:.2} vs limit {:.2} -> {}",
        user_id,
        total,
        limit,
        if total > limit { "over" } else { "within" }
    );
    Ok(())
}

#[derive(Serialize)]
struct FlaggedRow {
    id: i64,
    username: String,
    notes: i64,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut stmt = conn.prepare(
        "SELECT u.id, u.username,
                (SELECT COUNT(*) FROM user_notes n WHERE n.user_id=u.id) AS notes
         FROM users u WHERE u.is_flagged=1 ORDER BY u.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(FlaggedRow {
            id: r.get(0)?,
            username: r.get(1)?,
            notes: r.get(2)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|f| vec![f.id.to_string(), f.username.clone(), f.notes.to_string()])
            .collect();
        println!("{}", pretty_table(&["ID", "Username", "Notes"], rows));
    }
    Ok(())
}
