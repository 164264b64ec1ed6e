// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::EntryKind;
use crate::store::{LedgerStore, SqliteStore};
use crate::utils::{maybe_print_json, pretty_table};
use crate::window::ledger_window;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("window", sub)) => window(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn window(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let days = *sub.get_one::<i64>("days").unwrap();

    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(days);
    let store = SqliteStore::new(conn);
    let win = ledger_window(&store, user_id, cutoff)?;

    if maybe_print_json(json_flag, jsonl_flag, &win)? {
        return Ok(());
    }
    if win.is_empty() {
        println!("No transactions for user {} in the last {} days", user_id, days);
        return Ok(());
    }

    let mut rows = Vec::new();
    for (i, day) in win.labels.iter().enumerate() {
        rows.push(vec![
            day.to_string(),
            format!("{:.2}", win.income[i]),
            format!("{:.2}", win.expenses[i]),
        ]);
    }
    println!("{}", pretty_table(&["Date", "Income", "Expense"], rows));

    let mut cat_rows: Vec<(String, Decimal)> = win
        .category_totals
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    cat_rows.sort_by(|a, b| b.1.cmp(&a.1));
    let cat_data: Vec<Vec<String>> = cat_rows
        .into_iter()
        .map(|(c, v)| vec![c, format!("{:.2}", v)])
        .collect();
    println!("{}", pretty_table(&["Category", "Spent"], cat_data));
    println!(
        "Totals: income {:.2}, expenses {:.2}",
        win.total_income(),
        win.total_expenses()
    );
    Ok(())
}

#[derive(Serialize)]
struct SummaryOut {
    income: Decimal,
    expense: Decimal,
    categories: Vec<CategoryTotal>,
}

#[derive(Serialize)]
struct CategoryTotal {
    name: String,
    total: Decimal,
}

/// All-time totals over the manual ledger, expense categories sorted by
/// total descending.
fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user_id = *sub.get_one::<i64>("user").unwrap();

    let store = SqliteStore::new(conn);
    let entries = store.entries(user_id)?;

    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut by_category: std::collections::HashMap<String, Decimal> =
        std::collections::HashMap::new();
    for e in &entries {
        match e.kind {
            EntryKind::Income => income += e.amount,
            EntryKind::Expense => {
                expense += e.amount;
                *by_category.entry(e.category.clone()).or_insert(Decimal::ZERO) += e.amount;
            }
        }
    }
    let mut categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(name, total)| CategoryTotal {
            name,
            total: total.round_dp(2),
        })
        .collect();
    categories.sort_by(|a, b| b.total.cmp(&a.total));

    let out = SummaryOut {
        income: income.round_dp(2),
        expense: expense.round_dp(2),
        categories,
    };
    if !maybe_print_json(json_flag, jsonl_flag, &out)? {
        println!("Income:  {:.2}", out.income);
        println!("Expense: {:.2}", out.expense);
        let rows: Vec<Vec<String>> = out
            .categories
            .iter()
            .map(|c| vec![c.name.clone(), format!("{:.2}", c.total)])
            .collect();
        println!("{}", pretty_table(&["Category", "Total"], rows));
    }
    Ok(())
}
