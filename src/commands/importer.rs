// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CategoryValue, Transaction};
use crate::utils::parse_decimal;
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use rusqlite::{params, Connection};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// Load aggregator-shaped records for one user. Re-importing the same file
/// is a no-op: rows are keyed by (user_id, transaction_id).
fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let path = sub.get_one::<String>("path").unwrap().trim();
    let format = sub.get_one::<String>("format").unwrap().to_lowercase();

    let records = match format.as_str() {
        "json" => read_json(path)?,
        "csv" => read_csv(path)?,
        other => return Err(anyhow!("Unknown format: {} (use json|csv)", other)),
    };

    let tx = conn.transaction()?;
    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for rec in &records {
        let category_col = match &rec.category {
            Some(CategoryValue::Many(tokens)) => Some(serde_json::to_string(tokens)?),
            Some(CategoryValue::One(s)) => Some(s.clone()),
            None => None,
        };
        let changed = tx.execute(
            "INSERT OR IGNORE INTO bank_transactions(user_id, transaction_id, date, name, category, amount, currency)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                user_id,
                rec.transaction_id,
                rec.date,
                rec.name,
                category_col,
                rec.amount.to_string(),
                rec.currency
            ],
        )?;
        if changed > 0 {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }
    tx.commit()?;
    println!(
        "Imported {} transaction(s) from {} ({} already present)",
        inserted, path, skipped
    );
    Ok(())
}

fn read_json(path: &str) -> Result<Vec<Transaction>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Open JSON {}", path))?;
    let records: Vec<Transaction> =
        serde_json::from_str(&text).with_context(|| format!("Parse JSON {}", path))?;
    Ok(records)
}

/// CSV columns: transaction_id, date, name, amount, category, currency.
/// A category cell may hold several aggregator tokens separated by '|'.
fn read_csv(path: &str) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;
    let mut out = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let transaction_id = rec.get(0).context("transaction_id missing")?.trim().to_string();
        let date = rec.get(1).context("date missing")?.trim().to_string();
        let name = rec.get(2).context("name missing")?.trim().to_string();
        let amount_raw = rec.get(3).context("amount missing")?.trim();
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("Invalid amount '{}' for {}", amount_raw, name))?;
        let category_raw = rec.get(4).unwrap_or("").trim();
        let category = if category_raw.is_empty() {
            None
        } else if category_raw.contains('|') {
            Some(CategoryValue::Many(
                category_raw
                    .split('|')
                    .map(|s| s.trim().to_string())
                    .collect(),
            ))
        } else {
            Some(CategoryValue::One(category_raw.to_string()))
        };
        let currency = {
            let c = rec.get(5).unwrap_or("").trim();
            if c.is_empty() { "USD" } else { c }.to_uppercase()
        };
        out.push(Transaction {
            transaction_id,
            date,
            name,
            category,
            amount,
            currency,
        });
    }
    Ok(out)
}
