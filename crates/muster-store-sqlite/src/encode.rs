//! Encoding and decoding helpers between Rust domain types and the
//! plain-text/numeric representations stored in SQLite columns.
//!
//! Calendar dates are stored as ISO 8601 `YYYY-MM-DD` strings. Ledger values
//! are stored in the column affinity natural to their ledger (REAL for bank
//! amounts, INTEGER for levels) and surfaced back through [`LedgerKind`].

use chrono::{NaiveDate, Utc};
use muster_core::ledger::{
  AggregateRow, LedgerEntry, LedgerKind, LedgerValue,
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn today() -> NaiveDate { Utc::now().date_naive() }

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// Rebuild a typed value from the REAL-or-INTEGER column, based on which
/// ledger the row came from.
pub fn decode_value(kind: LedgerKind, raw: f64) -> LedgerValue {
  if kind.integer_valued() {
    LedgerValue::Level(raw as i64)
  } else {
    LedgerValue::Amount(raw)
  }
}

/// The SQLite parameter for a value, in the ledger's natural affinity.
pub fn encode_value(value: LedgerValue) -> rusqlite::types::Value {
  match value {
    LedgerValue::Level(l) => rusqlite::types::Value::Integer(l),
    LedgerValue::Amount(a) => rusqlite::types::Value::Real(a),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read from a ledger row (uniform across the four
/// tables; subject and note read as NULL where the table lacks them).
pub struct RawEntry {
  pub log_id:     i64,
  pub date:       String,
  pub member_id:  Option<i64>,
  pub subject_id: Option<i64>,
  pub value:      f64,
  pub note:       Option<String>,
}

impl RawEntry {
  pub fn into_entry(self, kind: LedgerKind) -> Result<LedgerEntry> {
    Ok(LedgerEntry {
      log_id:     self.log_id,
      date:       decode_date(&self.date)?,
      member_id:  self.member_id,
      subject_id: self.subject_id,
      value:      decode_value(kind, self.value),
      note:       self.note,
    })
  }

  pub fn into_aggregate(self, kind: LedgerKind) -> Result<AggregateRow> {
    Ok(AggregateRow {
      member_id:  self.member_id,
      subject_id: self.subject_id,
      value:      decode_value(kind, self.value),
      log_id:     self.log_id,
      date:       decode_date(&self.date)?,
    })
  }
}
