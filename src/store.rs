// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Storage and collaborator interfaces consumed by the engine.
//!
//! The engine never touches a global connection: callers hand it these
//! traits, which keeps the evaluator and scorer unit-testable against an
//! in-memory fake. `SqliteStore` is the production implementation.

use crate::error::{EngineError, Result};
use crate::models::{
    CategoryValue, EntryKind, ManualEntry, RiskLevel, Transaction, UserNote,
    VulnerabilitySnapshot,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

pub trait UserStore {
    fn user_exists(&self, user_id: i64) -> Result<bool>;
    fn list_user_ids(&self) -> Result<Vec<i64>>;
    /// The user's configured limit. Unset (or unparsable, the store is
    /// forgiving about dirty config) reads as None.
    fn spending_limit(&self, user_id: i64) -> Result<Option<Decimal>>;
    fn set_flagged(&self, user_id: i64, flagged: bool) -> Result<()>;
    /// Atomically add a note unless one with the same message already
    /// exists. Returns whether a note was inserted.
    fn add_note_once(&self, user_id: i64, message: &str) -> Result<bool>;
    fn notes(&self, user_id: i64) -> Result<Vec<UserNote>>;
}

pub trait LedgerStore {
    fn entries(&self, user_id: i64) -> Result<Vec<ManualEntry>>;
    fn bank_transactions(&self, user_id: i64) -> Result<Vec<Transaction>>;
    fn current_balance(&self, user_id: i64) -> Result<Decimal>;
}

pub trait AdvisorLinkStore {
    fn accepted_link_ids(&self, user_id: i64) -> Result<Vec<i64>>;
    fn set_link_priority(&self, link_id: i64, level: RiskLevel) -> Result<()>;
}

pub trait SnapshotStore {
    fn clear_snapshots(&self) -> Result<()>;
    fn upsert_snapshot(&self, snap: &VulnerabilitySnapshot) -> Result<()>;
    fn snapshots(&self) -> Result<Vec<VulnerabilitySnapshot>>;
    fn snapshot_for_user(&self, user_id: i64) -> Result<Option<VulnerabilitySnapshot>>;
}

pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl UserStore for SqliteStore<'_> {
    fn user_exists(&self, user_id: i64) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM users WHERE id=?1", params![user_id], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn list_user_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM users ORDER BY id")?;
        let ids = stmt
            .query_map([], |r| r.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn spending_limit(&self, user_id: i64) -> Result<Option<Decimal>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT spending_limit FROM users WHERE id=?1",
                params![user_id],
                |r| r.get(0),
            )
            .optional()?
            .flatten();
        match raw {
            Some(s) => match s.parse::<Decimal>() {
                Ok(d) => Ok(Some(d)),
                Err(_) => {
                    warn!("user {} has unparsable spending limit '{}'", user_id, s);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn set_flagged(&self, user_id: i64, flagged: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET is_flagged=?2 WHERE id=?1",
            params![user_id, flagged as i64],
        )?;
        Ok(())
    }

    fn add_note_once(&self, user_id: i64, message: &str) -> Result<bool> {
        // UNIQUE(user_id, message) does the dedup at the storage level, so
        // concurrent callers cannot both insert.
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO user_notes(user_id, message) VALUES (?1, ?2)",
            params![user_id, message],
        )?;
        Ok(changed > 0)
    }

    fn notes(&self, user_id: i64) -> Result<Vec<UserNote>> {
        let mut stmt = self.conn.prepare(
            "SELECT message, created_at FROM user_notes WHERE user_id=?1 ORDER BY created_at, id",
        )?;
        let rows = stmt
            .query_map(params![user_id], |r| {
                Ok(UserNote {
                    message: r.get(0)?,
                    created_at: r.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl LedgerStore for SqliteStore<'_> {
    fn entries(&self, user_id: i64) -> Result<Vec<ManualEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, category, amount, created_at FROM entries WHERE user_id=?1 ORDER BY created_at, id",
        )?;
        let mut cur = stmt.query(params![user_id])?;
        let mut out = Vec::new();
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let kind_s: String = r.get(1)?;
            let category: String = r.get(2)?;
            let amount_s: String = r.get(3)?;
            let created_s: String = r.get(4)?;

            // Malformed rows are skipped, not fatal: partial/dirty ledger
            // data is expected.
            let Some(kind) = EntryKind::parse(&kind_s) else {
                warn!("skipping entry {} with unknown kind '{}'", id, kind_s);
                continue;
            };
            let Ok(amount) = amount_s.parse::<Decimal>() else {
                warn!("skipping entry {} with bad amount '{}'", id, amount_s);
                continue;
            };
            let Ok(created_at) = NaiveDateTime::parse_from_str(&created_s, "%Y-%m-%d %H:%M:%S")
            else {
                warn!("skipping entry {} with bad timestamp '{}'", id, created_s);
                continue;
            };
            out.push(ManualEntry {
                id,
                user_id,
                kind,
                category,
                amount,
                created_at,
            });
        }
        Ok(out)
    }

    fn bank_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT transaction_id, date, name, category, amount, currency
             FROM bank_transactions WHERE user_id=?1 ORDER BY date, id",
        )?;
        let mut cur = stmt.query(params![user_id])?;
        let mut out = Vec::new();
        while let Some(r) = cur.next()? {
            let transaction_id: String = r.get(0)?;
            let date: String = r.get(1)?;
            let name: String = r.get(2)?;
            let category_raw: Option<String> = r.get(3)?;
            let amount_s: String = r.get(4)?;
            let currency: String = r.get(5)?;

            let Ok(amount) = amount_s.parse::<Decimal>() else {
                warn!(
                    "skipping transaction {} with bad amount '{}'",
                    transaction_id, amount_s
                );
                continue;
            };
            out.push(Transaction {
                transaction_id,
                date,
                name,
                category: category_raw.map(|s| parse_category_column(&s)),
                amount,
                currency,
            });
        }
        Ok(out)
    }

    fn current_balance(&self, user_id: i64) -> Result<Decimal> {
        let mut stmt = self
            .conn
            .prepare("SELECT current_balance FROM bank_accounts WHERE user_id=?1")?;
        let mut cur = stmt.query(params![user_id])?;
        let mut total = Decimal::ZERO;
        while let Some(r) = cur.next()? {
            let raw: String = r.get(0)?;
            match raw.parse::<Decimal>() {
                Ok(v) => total += v,
                Err(_) => warn!("skipping bad balance '{}' for user {}", raw, user_id),
            }
        }
        Ok(total)
    }
}

/// A category column holds either plain text or a JSON array of tokens.
fn parse_category_column(raw: &str) -> CategoryValue {
    if raw.trim_start().starts_with('[') {
        if let Ok(tokens) = serde_json::from_str::<Vec<String>>(raw) {
            return CategoryValue::Many(tokens);
        }
    }
    CategoryValue::One(raw.to_string())
}

impl AdvisorLinkStore for SqliteStore<'_> {
    fn accepted_link_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM advisor_links WHERE user_id=?1 AND status='accepted'")?;
        let ids = stmt
            .query_map(params![user_id], |r| r.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn set_link_priority(&self, link_id: i64, level: RiskLevel) -> Result<()> {
        self.conn.execute(
            "UPDATE advisor_links SET priority=?2 WHERE id=?1",
            params![link_id, level.as_str()],
        )?;
        Ok(())
    }
}

impl SnapshotStore for SqliteStore<'_> {
    fn clear_snapshots(&self) -> Result<()> {
        self.conn.execute("DELETE FROM vulnerability_snapshots", [])?;
        Ok(())
    }

    fn upsert_snapshot(&self, snap: &VulnerabilitySnapshot) -> Result<()> {
        self.conn.execute(
            "INSERT INTO vulnerability_snapshots(
                user_id, percent_income_left, total_income, total_expenses,
                net_amount, current_balance, risk_level, computed_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
             ON CONFLICT(user_id) DO UPDATE SET
                percent_income_left=excluded.percent_income_left,
                total_income=excluded.total_income,
                total_expenses=excluded.total_expenses,
                net_amount=excluded.net_amount,
                current_balance=excluded.current_balance,
                risk_level=excluded.risk_level,
                computed_at=excluded.computed_at",
            params![
                snap.user_id,
                snap.percent_income_left.to_string(),
                snap.total_income.to_string(),
                snap.total_expenses.to_string(),
                snap.net_amount.to_string(),
                snap.current_balance.to_string(),
                snap.risk_level.as_str(),
                snap.computed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn snapshots(&self) -> Result<Vec<VulnerabilitySnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, percent_income_left, total_income, total_expenses,
                    net_amount, current_balance, risk_level, computed_at
             FROM vulnerability_snapshots ORDER BY user_id",
        )?;
        let mut cur = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(r) = cur.next()? {
            out.push(snapshot_from_row(r)?);
        }
        Ok(out)
    }

    fn snapshot_for_user(&self, user_id: i64) -> Result<Option<VulnerabilitySnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, percent_income_left, total_income, total_expenses,
                    net_amount, current_balance, risk_level, computed_at
             FROM vulnerability_snapshots WHERE user_id=?1",
        )?;
        let mut cur = stmt.query(params![user_id])?;
        match cur.next()? {
            Some(r) => Ok(Some(snapshot_from_row(r)?)),
            None => Ok(None),
        }
    }
}

/// Snapshot columns are store-owned writes, so corruption here is an error
/// rather than a skip.
fn snapshot_from_row(r: &rusqlite::Row<'_>) -> Result<VulnerabilitySnapshot> {
    let parse_dec = |value: String, context: &str| -> Result<Decimal> {
        value
            .parse::<Decimal>()
            .map_err(|_| EngineError::InvalidDecimal {
                value,
                context: context.to_string(),
            })
    };

    let risk_raw: String = r.get(6)?;
    let risk_level =
        RiskLevel::parse(&risk_raw).ok_or_else(|| EngineError::UnknownRiskLevel(risk_raw))?;
    let computed_raw: String = r.get(7)?;
    let computed_at = DateTime::parse_from_rfc3339(&computed_raw)
        .map_err(|_| EngineError::InvalidTimestamp(computed_raw))?
        .with_timezone(&Utc);

    Ok(VulnerabilitySnapshot {
        user_id: r.get(0)?,
        percent_income_left: parse_dec(r.get(1)?, "snapshot percent_income_left")?,
        total_income: parse_dec(r.get(2)?, "snapshot total_income")?,
        total_expenses: parse_dec(r.get(3)?, "snapshot total_expenses")?,
        net_amount: parse_dec(r.get(4)?, "snapshot net_amount")?,
        current_balance: parse_dec(r.get(5)?, "snapshot current_balance")?,
        risk_level,
        computed_at,
    })
}
