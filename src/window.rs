// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Windowed aggregation of classified transactions into per-day series and
//! category totals.

use crate::classify::{assign_category, classify_direction, resolve_category};
use crate::error::Result;
use crate::models::{ClassifiedTransaction, ManualEntry, Transaction};
use crate::store::LedgerStore;
use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Parse an aggregator date field. Tolerates bare dates and datetime-like
/// values (space or 'T' separated, optional fraction, optional trailing Z).
/// Anything else is missing data, not an error.
pub fn parse_txn_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_end_matches('Z');
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Classify one raw aggregator record. Returns None (and logs) when the
/// date cannot be parsed; the record is treated as missing data and dropped.
///
/// Direction comes from the keyword classifier only. The aggregator's sign
/// is untrusted, so the magnitude is normalized with `abs()` before signing.
/// Category comes from `resolve_category` when the record carries structured
/// aggregator tokens, else from `assign_category` on the label.
pub fn classify_transaction(t: &Transaction) -> Option<ClassifiedTransaction> {
    let Some(date) = parse_txn_date(&t.date) else {
        warn!(
            "dropping transaction {} with unparseable date '{}'",
            t.transaction_id, t.date
        );
        return None;
    };

    let category_text = t.category.as_ref().map(|c| c.text());
    let is_income = classify_direction(&t.name, category_text.as_deref());
    let magnitude = t.amount.abs();
    let signed_amount = if is_income { magnitude } else { -magnitude };

    let category = match &t.category {
        Some(c) => {
            let tokens: Vec<String> = c.tokens().iter().map(|s| s.to_string()).collect();
            resolve_category(&tokens)
        }
        None => assign_category(&t.name).to_string(),
    };

    Some(ClassifiedTransaction {
        date,
        name: t.name.clone(),
        category,
        signed_amount,
        transaction_id: t.transaction_id.clone(),
    })
}

/// A bounded time range summarized into daily series and category totals.
///
/// `labels` is the sorted, deduplicated union of all day keys;
/// `income`/`expenses` are positionally aligned to it, defaulting to zero.
/// `category_totals` sums expense magnitudes only. All monetary values are
/// rounded to 2dp here and nowhere earlier; accumulation stays unrounded so
/// rounding error does not compound.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationWindow {
    pub cutoff: NaiveDate,
    pub labels: Vec<NaiveDate>,
    pub income: Vec<Decimal>,
    pub expenses: Vec<Decimal>,
    pub income_by_day: BTreeMap<NaiveDate, Decimal>,
    pub expense_by_day: BTreeMap<NaiveDate, Decimal>,
    pub category_totals: BTreeMap<String, Decimal>,
    pub transactions: Vec<ClassifiedTransaction>,
}

impl AggregationWindow {
    pub fn total_income(&self) -> Decimal {
        self.income.iter().copied().sum()
    }

    pub fn total_expenses(&self) -> Decimal {
        self.expenses.iter().copied().sum()
    }

    /// Empty labels mean "no data for this window", not an error.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Aggregate already-classified rows. This is the entry point for manual
/// ledger entries, whose direction is explicit and skips the keyword pass.
pub fn window_from_classified(
    mut rows: Vec<ClassifiedTransaction>,
    cutoff: NaiveDate,
) -> AggregationWindow {
    rows.retain(|r| r.date >= cutoff);
    // Deterministic output for a fixed input set, regardless of input order.
    rows.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.transaction_id.cmp(&b.transaction_id))
    });

    let mut income_by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut expense_by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut category_totals: BTreeMap<String, Decimal> = BTreeMap::new();

    for r in &rows {
        if r.signed_amount >= Decimal::ZERO {
            *income_by_day.entry(r.date).or_insert(Decimal::ZERO) += r.signed_amount;
        } else {
            let magnitude = -r.signed_amount;
            *expense_by_day.entry(r.date).or_insert(Decimal::ZERO) += magnitude;
            *category_totals
                .entry(r.category.clone())
                .or_insert(Decimal::ZERO) += magnitude;
        }
    }

    let labels: Vec<NaiveDate> = income_by_day
        .keys()
        .chain(expense_by_day.keys())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let income = labels
        .iter()
        .map(|d| {
            income_by_day
                .get(d)
                .copied()
                .unwrap_or(Decimal::ZERO)
                .round_dp(2)
        })
        .collect();
    let expenses = labels
        .iter()
        .map(|d| {
            expense_by_day
                .get(d)
                .copied()
                .unwrap_or(Decimal::ZERO)
                .round_dp(2)
        })
        .collect();

    AggregationWindow {
        cutoff,
        labels,
        income,
        expenses,
        income_by_day: income_by_day
            .into_iter()
            .map(|(k, v)| (k, v.round_dp(2)))
            .collect(),
        expense_by_day: expense_by_day
            .into_iter()
            .map(|(k, v)| (k, v.round_dp(2)))
            .collect(),
        category_totals: category_totals
            .into_iter()
            .map(|(k, v)| (k, v.round_dp(2)))
            .collect(),
        transactions: rows,
    }
}

/// Classify and aggregate raw aggregator records on or after `cutoff`.
pub fn build_window(txns: &[Transaction], cutoff: NaiveDate) -> AggregationWindow {
    let classified = txns.iter().filter_map(classify_transaction).collect();
    window_from_classified(classified, cutoff)
}

/// The window for a user's ledger: synced bank transactions when any exist,
/// manual entries as the fallback source otherwise.
pub fn ledger_window(
    ledger: &impl LedgerStore,
    user_id: i64,
    cutoff: NaiveDate,
) -> Result<AggregationWindow> {
    let bank = ledger.bank_transactions(user_id)?;
    if bank.is_empty() {
        let rows = ledger
            .entries(user_id)?
            .iter()
            .map(ManualEntry::to_classified)
            .collect();
        Ok(window_from_classified(rows, cutoff))
    } else {
        Ok(build_window(&bank, cutoff))
    }
}
