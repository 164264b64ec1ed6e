// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors surfaced by the engine and its storage layer.
///
/// Malformed *data* (unparseable dates, bad stored amounts) is not an error:
/// those rows are skipped where they are read. Only storage failures and
/// corruption of store-owned columns reach this enum.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("invalid decimal '{value}' in {context}")]
    InvalidDecimal { value: String, context: String },

    #[error("invalid timestamp '{0}' in snapshot")]
    InvalidTimestamp(String),

    #[error("unknown risk level '{0}'")]
    UnknownRiskLevel(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
