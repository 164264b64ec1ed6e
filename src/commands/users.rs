// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::limits::recalc_spending_flag;
use crate::store::{SqliteStore, UserStore};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("set-limit", sub)) => set_limit(conn, sub)?,
        Some(("notes", sub)) => notes(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let full_name = sub.get_one::<String>("full-name").map(|s| s.trim());
    let role = sub.get_one::<String>("role").map(|s| s.trim());
    conn.execute(
        "INSERT INTO users(username, full_name, role) VALUES (?1, ?2, ?3)",
        params![name, full_name, role],
    )?;
    let id = conn.last_insert_rowid();
    println!("Added user '{}' (id {})", name, id);
    Ok(())
}

#[derive(Serialize)]
struct UserRow {
    id: i64,
    username: String,
    full_name: String,
    role: String,
    spending_limit: String,
    is_flagged: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut stmt = conn.prepare(
        "SELECT id, username, full_name, role, spending_limit, is_flagged
         FROM users ORDER BY id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(UserRow {
            id: r.get(0)?,
            username: r.get(1)?,
            full_name: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
            role: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
            spending_limit: r.get::<_, Option<String>>(4)?.unwrap_or_default(),
            is_flagged: r.get::<_, i64>(5)? != 0,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|u| {
                vec![
                    u.id.to_string(),
                    u.username.clone(),
                    u.full_name.clone(),
                    u.role.clone(),
                    u.spending_limit.clone(),
                    if u.is_flagged { "yes" } else { "" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Username", "Full Name", "Role", "Limit", "Flagged"], rows)
        );
    }
    Ok(())
}

fn set_limit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap().trim())?;
    conn.execute(
        "UPDATE users SET spending_limit=?2 WHERE id=?1",
        params![user_id, amount.to_string()],
    )?;
    // A new limit can move the user across the threshold either way.
    let store = SqliteStore::new(conn);
    recalc_spending_flag(&store, &store, user_id)?;
    println!("Spending limit for user {} set to {}", user_id, amount);
    Ok(())
}

fn notes(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let store = SqliteStore::new(conn);
    let notes = store.notes(user_id)?;
    let rows: Vec<Vec<String>> = notes
        .iter()
        .map(|n| vec![n.message.clone(), n.created_at.clone()])
        .collect();
    println!("{}", pretty_table(&["Message", "Created"], rows));
    Ok(())
}
