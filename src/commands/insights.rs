// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::insight::insight_context;
use crate::store::SqliteStore;
use crate::utils::maybe_print_json;
use crate::window::ledger_window;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let user_id = *m.get_one::<i64>("user").unwrap();
    let days = *m.get_one::<i64>("days").unwrap();

    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(days);
    let store = SqliteStore::new(conn);
    let win = ledger_window(&store, user_id, cutoff)?;
    let ctx = insight_context(&win);

    if !maybe_print_json(json_flag, jsonl_flag, &ctx)? {
        print!("{}", ctx.render_prompt());
    }
    Ok(())
}
