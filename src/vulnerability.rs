// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Financial-vulnerability scanning: percent-of-income-left scoring and
//! risk-tier assignment over a lookback window.

use crate::error::Result;
use crate::models::{RiskLevel, VulnerabilitySnapshot};
use crate::store::{AdvisorLinkStore, LedgerStore, SnapshotStore, UserStore};
use crate::window::ledger_window;
use chrono::{Duration, NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;

/// Map percent-of-income-left to a tier. Above 50 is not vulnerable and
/// yields no tier (and therefore no snapshot).
pub fn risk_level(percent_left: Decimal) -> Option<RiskLevel> {
    if percent_left <= Decimal::new(20, 0) {
        Some(RiskLevel::High)
    } else if percent_left <= Decimal::new(40, 0) {
        Some(RiskLevel::Medium)
    } else if percent_left <= Decimal::new(50, 0) {
        Some(RiskLevel::Low)
    } else {
        None
    }
}

/// Rescan every user and rebuild the snapshot collection from scratch.
///
/// The collection is a full-replace materialized view: prior snapshots are
/// cleared first, so a user who recovered since the last scan simply has no
/// row afterwards. The clear-then-repopulate is not atomic for concurrent
/// readers; scans themselves must not run concurrently.
///
/// For every vulnerable user, each *accepted* advisor link has its priority
/// set to the computed tier. Pending links are untouched.
pub fn scan_vulnerability<U, L, A, S>(
    users: &U,
    ledger: &L,
    links: &A,
    snapshots: &S,
    lookback_days: i64,
    as_of: NaiveDate,
) -> Result<Vec<VulnerabilitySnapshot>>
where
    U: UserStore,
    L: LedgerStore,
    A: AdvisorLinkStore,
    S: SnapshotStore,
{
    snapshots.clear_snapshots()?;

    let cutoff = as_of - Duration::days(lookback_days);
    let hundred = Decimal::new(100, 0);
    let mut emitted = Vec::new();

    for user_id in users.list_user_ids()? {
        let window = ledger_window(ledger, user_id, cutoff)?;
        let total_income = window.total_income();
        let total_expenses = window.total_expenses();

        // No activity in the window: nothing to score.
        if total_income.is_zero() && total_expenses.is_zero() {
            continue;
        }

        let net_amount = total_income - total_expenses;
        let percent_income_left = if total_income <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            (net_amount / total_income * hundred).round_dp(2)
        };

        let Some(level) = risk_level(percent_income_left) else {
            debug!(
                "user {} not vulnerable ({}% of income left)",
                user_id, percent_income_left
            );
            continue;
        };

        let snap = VulnerabilitySnapshot {
            user_id,
            percent_income_left,
            total_income,
            total_expenses,
            net_amount,
            current_balance: ledger.current_balance(user_id)?,
            risk_level: level,
            computed_at: Utc::now(),
        };
        snapshots.upsert_snapshot(&snap)?;

        for link_id in links.accepted_link_ids(user_id)? {
            links.set_link_priority(link_id, level)?;
        }

        emitted.push(snap);
    }

    Ok(emitted)
}
