//! Typed coercion of named string arguments.
//!
//! Commands arrive with their arguments already split into a name → string
//! map; everything past that point is this module's job. A coercion failure
//! is always a [`CommandError::Validation`] whose message is the full
//! user-facing text.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::CommandError;

/// Borrowed view over one command's argument map.
#[derive(Clone, Copy)]
pub struct Args<'a>(&'a BTreeMap<String, String>);

impl<'a> Args<'a> {
  pub fn new(map: &'a BTreeMap<String, String>) -> Self {
    Self(map)
  }

  /// Raw string value, trimmed. Empty strings count as absent.
  pub fn get(&self, name: &str) -> Option<&'a str> {
    self
      .0
      .get(name)
      .map(|v| v.trim())
      .filter(|v| !v.is_empty())
  }

  pub fn require(&self, name: &str) -> Result<&'a str, CommandError> {
    self.get(name).ok_or_else(|| {
      CommandError::validation(format!("missing required argument `{name}`"))
    })
  }

  // ── Integers ──────────────────────────────────────────────────────────────

  pub fn integer(&self, name: &str) -> Result<i64, CommandError> {
    parse_integer(name, self.require(name)?)
  }

  pub fn integer_opt(&self, name: &str) -> Result<Option<i64>, CommandError> {
    self.get(name).map(|v| parse_integer(name, v)).transpose()
  }

  // ── Decimal amounts ───────────────────────────────────────────────────────

  pub fn amount(&self, name: &str) -> Result<f64, CommandError> {
    parse_amount(name, self.require(name)?)
  }

  pub fn amount_opt(&self, name: &str) -> Result<Option<f64>, CommandError> {
    self.get(name).map(|v| parse_amount(name, v)).transpose()
  }

  // ── Dates ─────────────────────────────────────────────────────────────────

  pub fn date_opt(&self, name: &str) -> Result<Option<NaiveDate>, CommandError> {
    self
      .get(name)
      .map(|v| {
        NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
          CommandError::validation(format!(
            "`{name}` must be a date in YYYY-MM-DD form, got \"{v}\""
          ))
        })
      })
      .transpose()
  }

  // ── Comma-separated lists ─────────────────────────────────────────────────

  pub fn id_list(&self, name: &str) -> Result<Vec<i64>, CommandError> {
    self
      .require(name)?
      .split(',')
      .map(|part| parse_integer(name, part.trim()))
      .collect()
  }

  pub fn name_list(&self, name: &str) -> Result<Vec<String>, CommandError> {
    let names: Vec<String> = self
      .require(name)?
      .split(',')
      .map(|part| part.trim().to_string())
      .collect();
    if names.iter().any(String::is_empty) {
      return Err(CommandError::validation(format!(
        "`{name}` contains an empty entry"
      )));
    }
    Ok(names)
  }

  // ── Result-set limits ─────────────────────────────────────────────────────

  /// Optional `limit` argument; must be a positive integer.
  pub fn limit(&self, default: usize) -> Result<usize, CommandError> {
    match self.integer_opt("limit")? {
      None => Ok(default),
      Some(n) if n > 0 => Ok(n as usize),
      Some(n) => Err(CommandError::validation(format!(
        "`limit` must be a positive integer, got {n}"
      ))),
    }
  }
}

fn parse_integer(name: &str, value: &str) -> Result<i64, CommandError> {
  value.parse().map_err(|_| {
    CommandError::validation(format!(
      "`{name}` must be an integer, got \"{value}\""
    ))
  })
}

fn parse_amount(name: &str, value: &str) -> Result<f64, CommandError> {
  value
    .parse::<f64>()
    .ok()
    .filter(|n| n.is_finite())
    .ok_or_else(|| {
      CommandError::validation(format!(
        "`{name}` must be a decimal number, got \"{value}\""
      ))
    })
}
