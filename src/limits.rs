// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user spending-limit evaluation.

use crate::error::Result;
use crate::models::EntryKind;
use crate::store::{LedgerStore, UserStore};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

/// Fallback when a user has no configured limit.
pub static DEFAULT_SPENDING_LIMIT: Lazy<Decimal> = Lazy::new(|| Decimal::new(1000, 0));

/// The note message appended when a user crosses their limit. Exact-match
/// deduplicated by the store, so it appears at most once per user.
pub const SPENDING_LIMIT_NOTE: &str = "Spending limit exceeded";

/// Recompute a user's spending flag from their full ledger history.
///
/// Sums expense entries over all time (not windowed), compares against the
/// configured limit (strict greater-than; hitting the limit exactly is not
/// over), persists the flag, and appends the limit note once when over.
/// An unknown user is a silent no-op: the caller may race user deletion.
pub fn recalc_spending_flag<U, L>(users: &U, ledger: &L, user_id: i64) -> Result<()>
where
    U: UserStore,
    L: LedgerStore,
{
    if !users.user_exists(user_id)? {
        return Ok(());
    }

    let total_expense: Decimal = ledger
        .entries(user_id)?
        .iter()
        .filter(|e| e.kind == EntryKind::Expense)
        .map(|e| e.amount)
        .sum();

    let limit = users
        .spending_limit(user_id)?
        .unwrap_or(*DEFAULT_SPENDING_LIMIT);
    let is_over = total_expense > limit;

    users.set_flagged(user_id, is_over)?;
    if is_over {
        users.add_note_once(user_id, SPENDING_LIMIT_NOTE)?;
    }
    Ok(())
}
