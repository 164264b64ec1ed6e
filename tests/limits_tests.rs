// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetmind::error::Result;
use budgetmind::limits::{recalc_spending_flag, SPENDING_LIMIT_NOTE};
use budgetmind::models::{EntryKind, ManualEntry, Transaction, UserNote};
use budgetmind::store::{LedgerStore, SqliteStore, UserStore};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::cell::RefCell;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    budgetmind::db::init_schema(&mut conn).unwrap();
    conn
}

fn add_user(conn: &Connection, name: &str, limit: Option<&str>) -> i64 {
    conn.execute(
        "INSERT INTO users(username, spending_limit) VALUES (?1, ?2)",
        params![name, limit],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn add_expense(conn: &Connection, user_id: i64, category: &str, amount: &str) {
    conn.execute(
        "INSERT INTO entries(user_id, kind, category, amount) VALUES (?1,'expense',?2,?3)",
        params![user_id, category, amount],
    )
    .unwrap();
}

fn is_flagged(conn: &Connection, user_id: i64) -> bool {
    let v: i64 = conn
        .query_row(
            "SELECT is_flagged FROM users WHERE id=?1",
            params![user_id],
            |r| r.get(0),
        )
        .unwrap();
    v != 0
}

fn note_count(conn: &Connection, user_id: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM user_notes WHERE user_id=?1 AND message=?2",
        params![user_id, SPENDING_LIMIT_NOTE],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn flagging_is_idempotent() {
    let conn = setup();
    let uid = add_user(&conn, "alice", Some("1000"));
    add_expense(&conn, uid, "Dining", "700");
    add_expense(&conn, uid, "Transport", "500");

    let store = SqliteStore::new(&conn);
    recalc_spending_flag(&store, &store, uid).unwrap();
    assert!(is_flagged(&conn, uid));
    assert_eq!(note_count(&conn, uid), 1);

    // Second run with no new entries: identical state, no duplicate note.
    recalc_spending_flag(&store, &store, uid).unwrap();
    assert!(is_flagged(&conn, uid));
    assert_eq!(note_count(&conn, uid), 1);
}

#[test]
fn default_limit_applies_when_unset() {
    let conn = setup();
    let uid = add_user(&conn, "bob", None);
    add_expense(&conn, uid, "Dining", "1200");

    let store = SqliteStore::new(&conn);
    recalc_spending_flag(&store, &store, uid).unwrap();
    assert!(is_flagged(&conn, uid)); // 1200 > default 1000
}

#[test]
fn default_limit_applies_when_unparsable() {
    let conn = setup();
    let uid = add_user(&conn, "carol", Some("about a grand"));
    add_expense(&conn, uid, "Dining", "999");

    let store = SqliteStore::new(&conn);
    recalc_spending_flag(&store, &store, uid).unwrap();
    assert!(!is_flagged(&conn, uid)); // 999 <= default 1000
}

#[test]
fn hitting_the_limit_exactly_is_not_over() {
    let conn = setup();
    let uid = add_user(&conn, "dave", Some("500"));
    add_expense(&conn, uid, "Dining", "500");

    let store = SqliteStore::new(&conn);
    recalc_spending_flag(&store, &store, uid).unwrap();
    assert!(!is_flagged(&conn, uid));
    assert_eq!(note_count(&conn, uid), 0);
}

#[test]
fn raising_the_limit_unflags_but_keeps_the_note() {
    let conn = setup();
    let uid = add_user(&conn, "erin", Some("1000"));
    add_expense(&conn, uid, "Dining", "1500");

    let store = SqliteStore::new(&conn);
    recalc_spending_flag(&store, &store, uid).unwrap();
    assert!(is_flagged(&conn, uid));

    conn.execute(
        "UPDATE users SET spending_limit='2000' WHERE id=?1",
        params![uid],
    )
    .unwrap();
    recalc_spending_flag(&store, &store, uid).unwrap();
    assert!(!is_flagged(&conn, uid));
    // Notes are append-only history; unflagging does not erase them.
    assert_eq!(note_count(&conn, uid), 1);
}

#[test]
fn unknown_user_is_a_silent_noop() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    recalc_spending_flag(&store, &store, 424242).unwrap();
    let notes: i64 = conn
        .query_row("SELECT COUNT(*) FROM user_notes", [], |r| r.get(0))
        .unwrap();
    assert_eq!(notes, 0);
}

#[test]
fn malformed_entry_amounts_are_skipped() {
    let conn = setup();
    let uid = add_user(&conn, "frank", Some("1000"));
    add_expense(&conn, uid, "Dining", "nine hundred");
    add_expense(&conn, uid, "Dining", "900");

    let store = SqliteStore::new(&conn);
    recalc_spending_flag(&store, &store, uid).unwrap();
    // Only the parseable 900 counts; 900 <= 1000.
    assert!(!is_flagged(&conn, uid));
}

// The evaluator only sees the storage traits, so a hand-rolled in-memory
// fake is enough to drive it, no database involved.
struct FakeStore {
    exists: bool,
    limit: Option<Decimal>,
    entries: Vec<ManualEntry>,
    flagged: RefCell<Option<bool>>,
    notes: RefCell<Vec<String>>,
}

impl UserStore for FakeStore {
    fn user_exists(&self, _user_id: i64) -> Result<bool> {
        Ok(self.exists)
    }
    fn list_user_ids(&self) -> Result<Vec<i64>> {
        Ok(vec![1])
    }
    fn spending_limit(&self, _user_id: i64) -> Result<Option<Decimal>> {
        Ok(self.limit)
    }
    fn set_flagged(&self, _user_id: i64, flagged: bool) -> Result<()> {
        *self.flagged.borrow_mut() = Some(flagged);
        Ok(())
    }
    fn add_note_once(&self, _user_id: i64, message: &str) -> Result<bool> {
        let mut notes = self.notes.borrow_mut();
        if notes.iter().any(|n| n == message) {
            return Ok(false);
        }
        notes.push(message.to_string());
        Ok(true)
    }
    fn notes(&self, _user_id: i64) -> Result<Vec<UserNote>> {
        Ok(self
            .notes
            .borrow()
            .iter()
            .map(|m| UserNote {
                message: m.clone(),
                created_at: String::new(),
            })
            .collect())
    }
}

impl LedgerStore for FakeStore {
    fn entries(&self, _user_id: i64) -> Result<Vec<ManualEntry>> {
        Ok(self.entries.clone())
    }
    fn bank_transactions(&self, _user_id: i64) -> Result<Vec<Transaction>> {
        Ok(Vec::new())
    }
    fn current_balance(&self, _user_id: i64) -> Result<Decimal> {
        Ok(Decimal::ZERO)
    }
}

fn fake_entry(id: i64, kind: EntryKind, amount: &str) -> ManualEntry {
    ManualEntry {
        id,
        user_id: 1,
        kind,
        category: "Dining".to_string(),
        amount: amount.parse().unwrap(),
        created_at: chrono::NaiveDate::from_ymd_opt(2025, 8, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    }
}

#[test]
fn evaluator_runs_against_an_in_memory_fake() {
    let store = FakeStore {
        exists: true,
        limit: None,
        entries: vec![
            fake_entry(1, EntryKind::Expense, "600"),
            fake_entry(2, EntryKind::Expense, "500"),
            fake_entry(3, EntryKind::Income, "9999"), // income never counts
        ],
        flagged: RefCell::new(None),
        notes: RefCell::new(Vec::new()),
    };
    recalc_spending_flag(&store, &store, 1).unwrap();
    assert_eq!(*store.flagged.borrow(), Some(true)); // 1100 > default 1000
    assert_eq!(store.notes.borrow().len(), 1);
    assert_eq!(store.notes.borrow()[0], SPENDING_LIMIT_NOTE);

    recalc_spending_flag(&store, &store, 1).unwrap();
    assert_eq!(store.notes.borrow().len(), 1);
}

#[test]
fn evaluator_skips_missing_users_even_with_fake_entries() {
    let store = FakeStore {
        exists: false,
        limit: None,
        entries: vec![fake_entry(1, EntryKind::Expense, "5000")],
        flagged: RefCell::new(None),
        notes: RefCell::new(Vec::new()),
    };
    recalc_spending_flag(&store, &store, 1).unwrap();
    assert_eq!(*store.flagged.borrow(), None);
    assert!(store.notes.borrow().is_empty());
}
