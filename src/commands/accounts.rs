// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user_id = *sub.get_one::<i64>("user").unwrap();
            let name = sub.get_one::<String>("name").unwrap().trim();
            let balance = parse_decimal(sub.get_one::<String>("balance").unwrap().trim())?;
            conn.execute(
                "INSERT INTO bank_accounts(user_id, name, current_balance) VALUES (?1, ?2, ?3)",
                params![user_id, name, balance.to_string()],
            )?;
            println!("Added account '{}' for user {} ({})", name, user_id, balance);
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct AccountRow {
    id: i64,
    name: String,
    current_balance: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let mut stmt = conn.prepare(
        "SELECT id, name, current_balance FROM bank_accounts WHERE user_id=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok(AccountRow {
            id: r.get(0)?,
            name: r.get(1)?,
            current_balance: r.get(2)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|a| vec![a.id.to_string(), a.name.clone(), a.current_balance.clone()])
            .collect();
        println!("{}", pretty_table(&["ID", "Name", "Balance"], rows));
    }
    Ok(())
}
