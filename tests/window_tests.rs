// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetmind::models::{CategoryValue, Transaction};
use budgetmind::window::{build_window, parse_txn_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn txn(id: &str, date: &str, name: &str, amount: &str) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        date: date.to_string(),
        name: name.to_string(),
        category: None,
        amount: amount.parse::<Decimal>().unwrap(),
        currency: "USD".to_string(),
    }
}

#[test]
fn parse_txn_date_accepts_two_shapes() {
    assert_eq!(parse_txn_date("2025-08-01"), Some(d("2025-08-01")));
    assert_eq!(
        parse_txn_date("2025-08-01 12:30:00"),
        Some(d("2025-08-01"))
    );
    assert_eq!(
        parse_txn_date("2025-08-01T12:30:00Z"),
        Some(d("2025-08-01"))
    );
    assert_eq!(parse_txn_date("yesterday"), None);
    assert_eq!(parse_txn_date(""), None);
}

#[test]
fn cutoff_is_inclusive() {
    let cutoff = d("2025-08-01");
    let txns = vec![
        txn("t1", "2025-07-31", "Starbucks", "5"), // one day before: excluded
        txn("t2", "2025-08-01", "Starbucks", "6"), // on the cutoff: included
    ];
    let win = build_window(&txns, cutoff);
    assert_eq!(win.labels, vec![d("2025-08-01")]);
    assert_eq!(win.transactions.len(), 1);
    assert_eq!(win.transactions[0].transaction_id, "t2");
}

#[test]
fn unparseable_dates_are_dropped_silently() {
    let txns = vec![
        txn("t1", "2025-08-01", "Starbucks", "5"),
        txn("t2", "not-a-date", "Starbucks", "5"),
        txn("t3", "2025-08-02", "Uber", "7"),
    ];
    let win = build_window(&txns, d("2025-01-01"));
    assert_eq!(win.transactions.len(), 2);
}

#[test]
fn totals_conserve_signed_amounts() {
    let txns = vec![
        txn("t1", "2025-08-01", "Payroll Direct Deposit", "1000.50"),
        txn("t2", "2025-08-01", "Starbucks", "200.25"),
        txn("t3", "2025-08-03", "Uber Trip", "99.99"),
    ];
    let win = build_window(&txns, d("2025-08-01"));
    let algebraic = Decimal::new(100050, 2) - Decimal::new(20025, 2) - Decimal::new(9999, 2);
    assert_eq!(win.total_income() - win.total_expenses(), algebraic);
}

#[test]
fn labels_are_sorted_union_without_duplicates() {
    // Income and expense on the same day produce one label; output order is
    // independent of input order.
    let txns = vec![
        txn("t3", "2025-08-03", "Uber Trip", "10"),
        txn("t1", "2025-08-01", "Payroll Deposit", "500"),
        txn("t2", "2025-08-01", "Starbucks", "8"),
    ];
    let win = build_window(&txns, d("2025-08-01"));
    assert_eq!(win.labels, vec![d("2025-08-01"), d("2025-08-03")]);
    assert_eq!(win.income, vec![Decimal::new(500, 0), Decimal::ZERO]);
    assert_eq!(win.expenses, vec![Decimal::new(8, 0), Decimal::new(10, 0)]);
}

#[test]
fn direction_ignores_aggregator_sign() {
    // The aggregator has no trustworthy sign convention: a negative payroll
    // magnitude still aggregates as income.
    let txns = vec![txn("t1", "2025-08-01", "Payroll Deposit", "-500")];
    let win = build_window(&txns, d("2025-08-01"));
    assert_eq!(win.total_income(), Decimal::new(500, 0));
    assert_eq!(win.total_expenses(), Decimal::ZERO);
}

#[test]
fn category_totals_cover_expenses_only() {
    let txns = vec![
        txn("t1", "2025-08-01", "Payroll Deposit", "500"),
        txn("t2", "2025-08-01", "Starbucks", "8"),
        txn("t3", "2025-08-02", "Starbucks", "4"),
    ];
    let win = build_window(&txns, d("2025-08-01"));
    assert_eq!(win.category_totals.len(), 1);
    assert_eq!(win.category_totals["Dining"], Decimal::new(12, 0));
}

#[test]
fn structured_category_tokens_use_the_list_resolver() {
    let mut t = txn("t1", "2025-08-01", "WAKABA SUSHI HOUSE", "30");
    t.category = Some(CategoryValue::Many(vec![
        "Food and Drink".to_string(),
        "Restaurants".to_string(),
    ]));
    let win = build_window(&[t], d("2025-08-01"));
    assert_eq!(win.transactions[0].category, "Dining");
}

#[test]
fn label_only_records_use_the_keyword_assigner() {
    let txns = vec![txn("t1", "2025-08-01", "RANDOM MERCHANT XYZ", "10")];
    let win = build_window(&txns, d("2025-08-01"));
    assert_eq!(win.transactions[0].category, "Other");
}

#[test]
fn rounding_happens_at_the_boundary_only() {
    // Two sub-cent expenses accumulate unrounded before the 2dp boundary
    // rounding; rounding each first would lose the cent.
    let txns = vec![
        txn("t1", "2025-08-01", "Starbucks", "0.004"),
        txn("t2", "2025-08-01", "Starbucks", "0.004"),
    ];
    let win = build_window(&txns, d("2025-08-01"));
    assert_eq!(win.expenses, vec![Decimal::new(1, 2)]); // 0.008 -> 0.01
}

#[test]
fn empty_window_means_no_data_not_an_error() {
    let win = build_window(&[], d("2025-08-01"));
    assert!(win.is_empty());
    assert!(win.labels.is_empty());
    assert_eq!(win.total_income(), Decimal::ZERO);
    assert_eq!(win.total_expenses(), Decimal::ZERO);
}

#[test]
fn output_is_deterministic_for_shuffled_input() {
    let a = vec![
        txn("t1", "2025-08-01", "Payroll Deposit", "500"),
        txn("t2", "2025-08-01", "Starbucks", "8"),
        txn("t3", "2025-08-02", "Uber Trip", "12"),
    ];
    let mut b = a.clone();
    b.reverse();
    let wa = build_window(&a, d("2025-08-01"));
    let wb = build_window(&b, d("2025-08-01"));
    let ids_a: Vec<&str> = wa.transactions.iter().map(|t| t.transaction_id.as_str()).collect();
    let ids_b: Vec<&str> = wb.transactions.iter().map(|t| t.transaction_id.as_str()).collect();
    assert_eq!(ids_a, ids_b);
    assert_eq!(wa.labels, wb.labels);
    assert_eq!(wa.income, wb.income);
    assert_eq!(wa.expenses, wb.expenses);
}
