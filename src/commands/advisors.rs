// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user_id = *sub.get_one::<i64>("user").unwrap();
            let advisor = sub.get_one::<String>("advisor").unwrap().trim();
            conn.execute(
                "INSERT INTO advisor_links(user_id, advisor) VALUES (?1, ?2)",
                params![user_id, advisor],
            )?;
            println!(
                "Requested advisor link '{}' for user {} (id {})",
                advisor,
                user_id,
                conn.last_insert_rowid()
            );
        }
        Some(("accept", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let changed = conn.execute(
                "UPDATE advisor_links SET status='accepted' WHERE id=?1",
                params![id],
            )?;
            if changed > 0 {
                println!("Accepted advisor link {}", id);
            } else {
                println!("No advisor link with id {}", id);
            }
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct LinkRow {
    id: i64,
    user_id: i64,
    advisor: String,
    status: String,
    priority: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut sql = String::from(
        "SELECT id, user_id, advisor, status, COALESCE(priority,'') FROM advisor_links",
    );
    let user_filter = sub.get_one::<i64>("user").copied();
    if user_filter.is_some() {
        sql.push_str(" WHERE user_id=?1");
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let map_row = |r: &rusqlite::Row<'_>| {
        Ok(LinkRow {
            id: r.get(0)?,
            user_id: r.get(1)?,
            advisor: r.get(2)?,
            status: r.get(3)?,
            priority: r.get(4)?,
        })
    };
    let mut data = Vec::new();
    if let Some(uid) = user_filter {
        let rows = stmt.query_map(params![uid], map_row)?;
        for row in rows {
            data.push(row?);
        }
    } else {
        let rows = stmt.query_map([], map_row)?;
        for row in rows {
            data.push(row?);
        }
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|l| {
                vec![
                    l.id.to_string(),
                    l.user_id.to_string(),
                    l.advisor.clone(),
                    l.status.clone(),
                    l.priority.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "User", "Advisor", "Status", "Priority"], rows)
        );
    }
    Ok(())
}
