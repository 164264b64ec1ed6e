// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("User id")
}

fn days_arg() -> Arg {
    Arg::new("days")
        .long("days")
        .default_value("30")
        .value_parser(value_parser!(i64))
        .help("Lookback window in days")
}

pub fn build_cli() -> Command {
    Command::new("budgetmind")
        .about("BudgetMind: transaction classification, budget flags, and financial-vulnerability analytics")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("user")
                .about("Manage users, spending limits, and notes")
                .subcommand(
                    Command::new("add")
                        .about("Add a user")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("full-name").long("full-name"))
                        .arg(Arg::new("role").long("role")),
                )
                .subcommand(json_flags(Command::new("list").about("List users")))
                .subcommand(
                    Command::new("set-limit")
                        .about("Set a user's spending limit and re-evaluate the flag")
                        .arg(user_arg())
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(
                    Command::new("notes")
                        .about("Show a user's notes")
                        .arg(user_arg()),
                ),
        )
        .subcommand(
            Command::new("entry")
                .about("Manual ledger entries")
                .subcommand(
                    Command::new("add")
                        .about("Record a manual income/expense entry")
                        .arg(user_arg())
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .help("income or expense"),
                        )
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("Backdate the entry (YYYY-MM-DD); defaults to today"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List a user's entries")
                        .arg(user_arg()),
                )),
        )
        .subcommand(
            Command::new("account")
                .about("Bank account balance records")
                .subcommand(
                    Command::new("add")
                        .about("Add a bank account with its current balance")
                        .arg(user_arg())
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("balance")
                                .long("balance")
                                .default_value("0"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List a user's accounts")
                        .arg(user_arg()),
                )),
        )
        .subcommand(
            Command::new("import")
                .about("Import aggregator transaction records")
                .subcommand(
                    Command::new("transactions")
                        .about("Import transactions from a JSON or CSV file")
                        .arg(user_arg())
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("json")
                                .help("json or csv"),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregated views")
                .subcommand(json_flags(
                    Command::new("window")
                        .about("Daily income/expense series and category breakdown")
                        .arg(user_arg())
                        .arg(days_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("All-time ledger totals and expense categories")
                        .arg(user_arg()),
                )),
        )
        .subcommand(json_flags(
            Command::new("insight")
                .about("Compose the assistant context for a user's window")
                .arg(user_arg())
                .arg(days_arg()),
        ))
        .subcommand(
            Command::new("flags")
                .about("Spending-limit flags")
                .subcommand(
                    Command::new("recalc")
                        .about("Recompute a user's spending flag")
                        .arg(user_arg()),
                )
                .subcommand(json_flags(Command::new("list").about("List flagged users"))),
        )
        .subcommand(
            Command::new("advisor")
                .about("Advisor-client links")
                .subcommand(
                    Command::new("add")
                        .about("Request an advisor link for a user")
                        .arg(user_arg())
                        .arg(Arg::new("advisor").long("advisor").required(true)),
                )
                .subcommand(
                    Command::new("accept")
                        .about("Accept a pending advisor link")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List advisor links").arg(
                        Arg::new("user")
                            .long("user")
                            .value_parser(value_parser!(i64)),
                    ),
                )),
        )
        .subcommand(json_flags(
            Command::new("scan")
                .about("Run a financial-vulnerability scan over all users")
                .arg(days_arg()),
        ))
        .subcommand(Command::new("doctor").about("Check stored data for hygiene issues"))
}
