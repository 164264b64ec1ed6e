// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::limits::recalc_spending_flag;
use crate::models::EntryKind;
use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table, title_case};
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let kind_raw = sub.get_one::<String>("kind").unwrap();
    let kind = EntryKind::parse(kind_raw)
        .ok_or_else(|| anyhow!("Invalid kind '{}', expected income|expense", kind_raw))?;
    let category = title_case(sub.get_one::<String>("category").unwrap().trim());
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap().trim())?;
    if amount < rust_decimal::Decimal::ZERO {
        return Err(anyhow!("Amount must be non-negative, got {}", amount));
    }

    match sub.get_one::<String>("date") {
        Some(raw) => {
            let date = parse_date(raw.trim())?;
            conn.execute(
                "INSERT INTO entries(user_id, kind, category, amount, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user_id,
                    kind.as_str(),
                    category,
                    amount.to_string(),
                    format!("{} 00:00:00", date)
                ],
            )?;
        }
        None => {
            conn.execute(
                "INSERT INTO entries(user_id, kind, category, amount) VALUES (?1, ?2, ?3, ?4)",
                params![user_id, kind.as_str(), category, amount.to_string()],
            )?;
        }
    }

    // Every recorded expense re-evaluates the spending flag.
    if kind == EntryKind::Expense {
        let store = SqliteStore::new(conn);
        recalc_spending_flag(&store, &store, user_id)?;
    }

    println!(
        "Recorded {} {} '{}' for user {}",
        kind.as_str(),
        amount,
        category,
        user_id
    );
    Ok(())
}

#[derive(Serialize)]
struct EntryRow {
    id: i64,
    kind: String,
    category: String,
    amount: String,
    created_at: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let mut stmt = conn.prepare(
        "SELECT id, kind, category, amount, created_at FROM entries
         WHERE user_id=?1 ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok(EntryRow {
            id: r.get(0)?,
            kind: r.get(1)?,
            category: r.get(2)?,
            amount: r.get(3)?,
            created_at: r.get(4)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.kind.clone(),
                    e.category.clone(),
                    e.amount.clone(),
                    e.created_at.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Kind", "Category", "Amount", "Created"], rows)
        );
    }
    Ok(())
}
