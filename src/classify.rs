// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction direction and category classification.
//!
//! Two independent categorizers live here on purpose. `assign_category`
//! keyword-matches a free-text merchant label into a closed set of spending
//! buckets; `resolve_category` applies its own rules to the structured
//! category token lists the aggregator sends. They have separate keyword
//! tables and are not interchangeable.

use crate::utils::title_case;
use serde::{Deserialize, Serialize};

/// Substring markers that flag a transaction as money-in. Matching is
/// case-insensitive and never consults the amount: a refund on a high-value
/// purchase is still income.
const INCOME_KEYWORDS: &[&str] = &["payroll", "deposit", "credit", "refund", "interest", "intrst"];

/// True if the transaction is income, judged from its label and category
/// text alone. Pure; every input (including empty strings) yields a verdict.
pub fn classify_direction(label: &str, category: Option<&str>) -> bool {
    let mut hay = label.to_lowercase();
    if let Some(cat) = category {
        hay.push(' ');
        hay.push_str(&cat.to_lowercase());
    }
    INCOME_KEYWORDS.iter().any(|k| hay.contains(k))
}

/// The closed set of spending buckets `assign_category` maps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpendCategory {
    Dining,
    Transport,
    Travel,
    Shopping,
    Fitness,
    Income,
    Bills,
    Other,
}

impl SpendCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendCategory::Dining => "Dining",
            SpendCategory::Transport => "Transport",
            SpendCategory::Travel => "Travel",
            SpendCategory::Shopping => "Shopping",
            SpendCategory::Fitness => "Fitness",
            SpendCategory::Income => "Income",
            SpendCategory::Bills => "Bills",
            SpendCategory::Other => "Other",
        }
    }
}

impl std::fmt::Display for SpendCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const DINING: &[&str] = &[
    "starbucks",
    "mcdonald",
    "burger",
    "pizza",
    "chipotle",
    "dunkin",
    "uber eats",
    "doordash",
    "grubhub",
    "restaurant",
    "cafe",
    "coffee",
    "taco",
    "sushi",
    "diner",
    "bakery",
];

const TRANSPORT: &[&str] = &[
    "uber", "lyft", "taxi", "shell", "chevron", "exxon", "gas", "parking", "metro", "transit",
    "amtrak", "toll",
];

const TRAVEL: &[&str] = &[
    "airline", "airlines", "delta", "united", "hotel", "airbnb", "expedia", "marriott", "hilton",
    "flight", "hostel",
];

const SHOPPING: &[&str] = &[
    "amazon", "walmart", "target", "costco", "best buy", "ebay", "etsy", "store", "mall", "outlet",
];

const FITNESS: &[&str] = &["gym", "fitness", "yoga", "peloton", "crossfit", "pilates"];

const INCOME: &[&str] = &[
    "payroll",
    "direct deposit",
    "salary",
    "paycheck",
    "employer",
    "interest",
];

const BILLS: &[&str] = &[
    "electric",
    "water",
    "internet",
    "comcast",
    "verizon",
    "t-mobile",
    "at&t",
    "insurance",
    "rent",
    "utility",
    "utilities",
    "phone",
    "netflix",
    "spotify",
    "subscription",
];

/// Group order is a tie-break contract, not a style choice: a label matching
/// keywords in several groups resolves to the first group checked.
const GROUPS: &[(SpendCategory, &[&str])] = &[
    (SpendCategory::Dining, DINING),
    (SpendCategory::Transport, TRANSPORT),
    (SpendCategory::Travel, TRAVEL),
    (SpendCategory::Shopping, SHOPPING),
    (SpendCategory::Fitness, FITNESS),
    (SpendCategory::Income, INCOME),
    (SpendCategory::Bills, BILLS),
];

/// Map a free-text merchant label to a spending bucket. First group with a
/// substring match wins; no match falls through to `Other`.
pub fn assign_category(label: &str) -> SpendCategory {
    let hay = label.to_lowercase();
    for (cat, keywords) in GROUPS {
        if keywords.iter().any(|k| hay.contains(k)) {
            return *cat;
        }
    }
    SpendCategory::Other
}

/// Resolve a structured aggregator category token list to a display
/// category. Independent from `assign_category`: its own keyword sets, its
/// own check order (transport, food & drink, bills, travel, income), and an
/// open result set: an unmatched list falls back to the Title-Cased first
/// token rather than a fixed bucket.
pub fn resolve_category(tokens: &[String]) -> String {
    let joined = tokens.join(" ").to_lowercase();

    const TRANSPORT_TOKENS: &[&str] = &["taxi", "ride share", "transportation", "public transit"];
    const FOOD_TOKENS: &[&str] = &["food and drink", "restaurants", "fast food", "groceries"];
    const BILL_TOKENS: &[&str] = &["utilities", "telecommunication", "rent", "subscription"];
    const TRAVEL_TOKENS: &[&str] = &["travel", "airlines", "lodging"];
    const INCOME_TOKENS: &[&str] = &["payroll", "interest", "deposit", "transfer credit"];

    let contains_any = |set: &[&str]| set.iter().any(|k| joined.contains(k));

    if contains_any(TRANSPORT_TOKENS) {
        return "Transport".to_string();
    }
    if contains_any(FOOD_TOKENS) {
        return "Dining".to_string();
    }
    if contains_any(BILL_TOKENS) {
        return "Bills".to_string();
    }
    if contains_any(TRAVEL_TOKENS) {
        return "Travel".to_string();
    }
    if contains_any(INCOME_TOKENS) {
        return "Income".to_string();
    }

    match tokens.first() {
        Some(first) if !first.trim().is_empty() => title_case(first),
        _ => "Other".to_string(),
    }
}
