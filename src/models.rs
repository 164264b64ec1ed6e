// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw bank-aggregator transaction record.
///
/// `amount` is an unsigned magnitude: the aggregator gives no reliable sign
/// convention, so direction is always derived from the label/category text
/// (see `classify::classify_direction`), never from the sign. `date` stays
/// raw text because aggregator data is dirty; it is parsed per-aggregation
/// and unparseable rows are dropped there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<CategoryValue>,
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Aggregator category field: a plain string or a list of tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    One(String),
    Many(Vec<String>),
}

impl CategoryValue {
    /// The category as one flat text blob, for substring classification.
    pub fn text(&self) -> String {
        match self {
            CategoryValue::One(s) => s.clone(),
            CategoryValue::Many(v) => v.join(" "),
        }
    }

    pub fn tokens(&self) -> Vec<&str> {
        match self {
            CategoryValue::One(s) => vec![s.as_str()],
            CategoryValue::Many(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }

    /// Case-insensitive parse; anything unknown is None (skipped upstream).
    pub fn parse(s: &str) -> Option<EntryKind> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(EntryKind::Income),
            "expense" => Some(EntryKind::Expense),
            _ => None,
        }
    }
}

/// A manually entered ledger row; the fallback data source for users without
/// an aggregator connection. Amount is a non-negative magnitude, direction
/// is carried by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualEntry {
    pub id: i64,
    pub user_id: i64,
    pub kind: EntryKind,
    pub category: String,
    pub amount: Decimal,
    pub created_at: NaiveDateTime,
}

impl ManualEntry {
    /// Convert to a classified transaction. Manual entries carry their
    /// direction explicitly, so the keyword classifier is bypassed.
    pub fn to_classified(&self) -> ClassifiedTransaction {
        let signed = match self.kind {
            EntryKind::Income => self.amount.abs(),
            EntryKind::Expense => -self.amount.abs(),
        };
        ClassifiedTransaction {
            date: self.created_at.date(),
            name: self.category.clone(),
            category: self.category.clone(),
            signed_amount: signed,
            transaction_id: format!("entry-{}", self.id),
        }
    }
}

/// A transaction after direction/category classification. Positive
/// `signed_amount` = income, negative = expense.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedTransaction {
    pub date: NaiveDate,
    pub name: String,
    pub category: String,
    pub signed_amount: Decimal,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserNote {
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<RiskLevel> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(RiskLevel::High),
            "medium" => Some(RiskLevel::Medium),
            "low" => Some(RiskLevel::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user result of a vulnerability scan. The snapshot collection is a
/// full-replace materialized view: every scan clears it and repopulates,
/// and a user with more than 50% of income left has no row at all.
#[derive(Debug, Clone, Serialize)]
pub struct VulnerabilitySnapshot {
    pub user_id: i64,
    pub percent_income_left: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_amount: Decimal,
    pub current_balance: Decimal,
    pub risk_level: RiskLevel,
    pub computed_at: DateTime<Utc>,
}
