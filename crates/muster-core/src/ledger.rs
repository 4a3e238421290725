//! Ledger types — the dated numeric observations every command mutates or
//! queries.
//!
//! All four ledgers (bank, weapon level, skill level, character level) share
//! one row shape and one operation contract; [`LedgerKind`] carries the
//! per-ledger differences (table name, value column, optional subject
//! lookup, optional note column) so the storage layer can drive all four
//! with the same code.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{catalog::{LookupKind, SubjectId}, member::MemberId};

/// Auto-assigned sequential row ID within a single ledger table.
pub type LogId = i64;

/// The reserved bank row holding the opening balance. Seeded at first open,
/// updated in place by "set opening balance", never deletable.
pub const OPENING_BALANCE_LOG_ID: LogId = 0;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which ledger a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
  Bank,
  WeaponLevel,
  SkillLevel,
  CharacterLevel,
}

impl LedgerKind {
  pub fn table(self) -> &'static str {
    match self {
      Self::Bank => "bank_log",
      Self::WeaponLevel => "weapon_level_log",
      Self::SkillLevel => "skill_level_log",
      Self::CharacterLevel => "character_level_log",
    }
  }

  /// Name of the numeric value column.
  pub fn value_col(self) -> &'static str {
    match self {
      Self::Bank => "amount",
      _ => "level",
    }
  }

  /// The lookup table this ledger's subject column references, if any.
  pub fn subject(self) -> Option<LookupKind> {
    match self {
      Self::WeaponLevel => Some(LookupKind::Weapon),
      Self::SkillLevel => Some(LookupKind::Skill),
      Self::Bank | Self::CharacterLevel => None,
    }
  }

  pub fn subject_col(self) -> Option<&'static str> {
    match self {
      Self::WeaponLevel => Some("weapon_id"),
      Self::SkillLevel => Some("skill_id"),
      Self::Bank | Self::CharacterLevel => None,
    }
  }

  /// Only bank rows carry a free-text note.
  pub fn has_note(self) -> bool { matches!(self, Self::Bank) }

  /// Bank amounts are decimal currency; everything else is an integer level.
  pub fn integer_valued(self) -> bool { !matches!(self, Self::Bank) }

  /// Human label used in error messages ("no entry 7 in the bank log").
  pub fn label(self) -> &'static str {
    match self {
      Self::Bank => "bank log",
      Self::WeaponLevel => "weapon level log",
      Self::SkillLevel => "skill level log",
      Self::CharacterLevel => "character level log",
    }
  }
}

impl fmt::Display for LedgerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

// ─── Value ───────────────────────────────────────────────────────────────────

/// The numeric observation a ledger row records. Bank rows carry a currency
/// amount, the level ledgers an integer level. Neither is range-checked:
/// levels are not validated against game maxima and amounts may be negative
/// (withdrawals).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LedgerValue {
  Level(i64),
  Amount(f64),
}

impl LedgerValue {
  /// Numeric magnitude, used for ordering and aggregation.
  pub fn as_f64(self) -> f64 {
    match self {
      Self::Level(l) => l as f64,
      Self::Amount(a) => a,
    }
  }
}

impl fmt::Display for LedgerValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Level(l) => write!(f, "{l}"),
      Self::Amount(a) => write!(f, "{a:.2}"),
    }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One stored ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
  pub log_id:     LogId,
  pub date:       NaiveDate,
  /// `None` only for the reserved opening-balance bank row, which belongs to
  /// the guild rather than any member.
  pub member_id:  Option<MemberId>,
  pub subject_id: Option<SubjectId>,
  pub value:      LedgerValue,
  pub note:       Option<String>,
}

/// Input to [`crate::store::GuildStore::insert_entry`]. The `log_id` is
/// always assigned by the store; `date` defaults to today when omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
  pub member_id:  MemberId,
  pub subject_id: Option<SubjectId>,
  pub value:      LedgerValue,
  pub date:       Option<NaiveDate>,
  pub note:       Option<String>,
}

impl NewEntry {
  pub fn new(member_id: MemberId, value: LedgerValue) -> Self {
    Self { member_id, subject_id: None, value, date: None, note: None }
  }
}

/// Partial update applied to an existing row. `None` means "leave
/// unchanged"; a patch with every field `None` is a pure no-op and the store
/// must not issue a write for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
  pub subject_id: Option<SubjectId>,
  pub value:      Option<LedgerValue>,
  pub date:       Option<NaiveDate>,
  pub note:       Option<String>,
}

impl EntryPatch {
  pub fn is_empty(&self) -> bool {
    self.subject_id.is_none()
      && self.value.is_none()
      && self.date.is_none()
      && self.note.is_none()
  }
}

/// A write against a ledger, with create and patch statically distinct.
/// Callers decide the variant up front (a supplied log ID means patch); a
/// `Patch` naming a missing row is an error, never a fallback insert.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerWrite {
  Create(NewEntry),
  Patch { log_id: LogId, patch: EntryPatch },
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::GuildStore::recent_entries`].
///
/// Four filter cases fall out of which IDs are present: neither (global
/// recency), member only, subject only, or both. `best_per_member` only
/// applies to the subject-only case and switches it from recency to each
/// member's single highest-value row, ordered by value descending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentQuery {
  pub member_id:       Option<MemberId>,
  pub subject_id:      Option<SubjectId>,
  pub limit:           usize,
  pub best_per_member: bool,
}

impl RecentQuery {
  pub fn latest(limit: usize) -> Self {
    Self { limit, ..Self::default() }
  }
}

/// Parameters for [`crate::store::GuildStore::aggregate`].
///
/// Grouping follows from the filters: a member filter groups by subject
/// (that member's current level in each skill/weapon); a subject filter
/// groups by member (the leaderboard for that subject); neither groups by
/// member alone (used by the character ledger, which has no subject).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateQuery {
  pub member_id:  Option<MemberId>,
  pub subject_id: Option<SubjectId>,
  pub limit:      Option<usize>,
}

/// One group of an aggregate view: the row holding the group's maximum
/// value. Ties on value resolve to the lowest `log_id` so the result is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
  pub member_id:  Option<MemberId>,
  pub subject_id: Option<SubjectId>,
  pub value:      LedgerValue,
  pub log_id:     LogId,
  pub date:       NaiveDate,
}
