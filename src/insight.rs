// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Composition of aggregation output into the context block the chat
//! assistant consumes. The chat completion client itself lives outside this
//! crate; our only obligation is producing this input reliably.

use crate::window::AggregationWindow;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct InsightContext {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub transaction_lines: Vec<String>,
}

pub fn insight_context(window: &AggregationWindow) -> InsightContext {
    let total_income = window.total_income();
    let total_expenses = window.total_expenses();
    let transaction_lines = window
        .transactions
        .iter()
        .map(|t| {
            format!(
                "{} | {} | {} | {}",
                t.date,
                t.name,
                t.category,
                t.signed_amount.round_dp(2)
            )
        })
        .collect();

    InsightContext {
        net_income: total_income - total_expenses,
        total_income,
        total_expenses,
        transaction_lines,
    }
}

impl InsightContext {
    /// Render the plain-text block handed to the assistant.
    pub fn render_prompt(&self) -> String {
        let mut out = String::new();
        out.push_str("Financial summary for the selected period:\n");
        out.push_str(&format!("Total income: {}\n", self.total_income));
        out.push_str(&format!("Total expenses: {}\n", self.total_expenses));
        out.push_str(&format!("Net income: {}\n", self.net_income));
        if self.transaction_lines.is_empty() {
            out.push_str("No transactions in this period.\n");
        } else {
            out.push_str("Transactions (date | name | category | signed amount):\n");
            for line in &self.transaction_lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}
