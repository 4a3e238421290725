//! SQL schema for the Muster SQLite store.
//!
//! Executed on every open; idempotent thanks to `CREATE TABLE IF NOT
//! EXISTS`. Catalog seeding lives in [`seed`], which is likewise a no-op
//! when the rows already exist.
//!
//! Foreign keys are declared for documentation and tooling but enforcement
//! is switched off explicitly (the bundled SQLite build defaults it to on):
//! deleting a member must leave their historical ledger rows in place as
//! soft-orphans, and reference checks on insert are done explicitly in the
//! store so a dangling ID surfaces as a typed error rather than an engine
//! constraint failure.

use muster_core::{
  catalog::{LookupKind, Skill, SkillCategory, Weapon, WeaponCategory},
  ledger::OPENING_BALANCE_LOG_ID,
};
use strum::IntoEnumIterator;

use crate::encode::{encode_date, today};

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = OFF;

CREATE TABLE IF NOT EXISTS members (
    member_id INTEGER PRIMARY KEY,   -- platform-assigned; never generated here
    name      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS weapon_categories (
    category_id INTEGER PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS weapons (
    weapon_id   INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL REFERENCES weapon_categories(category_id),
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS skill_categories (
    category_id INTEGER PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS skills (
    skill_id    INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL REFERENCES skill_categories(category_id),
    name        TEXT NOT NULL UNIQUE
);

-- member_id is NULL only on the reserved opening-balance row (log_id 0).
CREATE TABLE IF NOT EXISTS bank_log (
    log_id    INTEGER PRIMARY KEY,
    date      TEXT NOT NULL,          -- ISO 8601 calendar date
    member_id INTEGER REFERENCES members(member_id),
    amount    REAL NOT NULL,
    note      TEXT
);

CREATE TABLE IF NOT EXISTS weapon_level_log (
    log_id    INTEGER PRIMARY KEY,
    date      TEXT NOT NULL,
    member_id INTEGER NOT NULL REFERENCES members(member_id),
    weapon_id INTEGER NOT NULL REFERENCES weapons(weapon_id),
    level     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS skill_level_log (
    log_id    INTEGER PRIMARY KEY,
    date      TEXT NOT NULL,
    member_id INTEGER NOT NULL REFERENCES members(member_id),
    skill_id  INTEGER NOT NULL REFERENCES skills(skill_id),
    level     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS character_level_log (
    log_id    INTEGER PRIMARY KEY,
    date      TEXT NOT NULL,
    member_id INTEGER NOT NULL REFERENCES members(member_id),
    level     INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS bank_log_member_idx        ON bank_log(member_id);
CREATE INDEX IF NOT EXISTS weapon_level_member_idx    ON weapon_level_log(member_id);
CREATE INDEX IF NOT EXISTS weapon_level_weapon_idx    ON weapon_level_log(weapon_id);
CREATE INDEX IF NOT EXISTS skill_level_member_idx     ON skill_level_log(member_id);
CREATE INDEX IF NOT EXISTS skill_level_skill_idx      ON skill_level_log(skill_id);
CREATE INDEX IF NOT EXISTS character_level_member_idx ON character_level_log(member_id);

PRAGMA user_version = 1;
";

/// SQL-side names for a subject lookup table.
pub(crate) fn lookup_table(kind: LookupKind) -> &'static str {
  match kind {
    LookupKind::Weapon => "weapons",
    LookupKind::Skill => "skills",
  }
}

pub(crate) fn lookup_id_col(kind: LookupKind) -> &'static str {
  match kind {
    LookupKind::Weapon => "weapon_id",
    LookupKind::Skill => "skill_id",
  }
}

pub(crate) fn category_table(kind: LookupKind) -> &'static str {
  match kind {
    LookupKind::Weapon => "weapon_categories",
    LookupKind::Skill => "skill_categories",
  }
}

/// Seed the lookup tables from the in-memory catalog and the bank's
/// reserved opening-balance row. Insert-or-ignore throughout, so running
/// this on every open neither errors nor duplicates.
pub(crate) fn seed(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
  let tx = conn.transaction()?;

  for cat in WeaponCategory::iter() {
    tx.execute(
      "INSERT OR IGNORE INTO weapon_categories (category_id, name) VALUES (?1, ?2)",
      rusqlite::params![cat as i64, cat.to_string()],
    )?;
  }
  for weapon in Weapon::iter() {
    tx.execute(
      "INSERT OR IGNORE INTO weapons (weapon_id, category_id, name) VALUES (?1, ?2, ?3)",
      rusqlite::params![weapon.id(), weapon.category() as i64, weapon.to_string()],
    )?;
  }

  for cat in SkillCategory::iter() {
    tx.execute(
      "INSERT OR IGNORE INTO skill_categories (category_id, name) VALUES (?1, ?2)",
      rusqlite::params![cat as i64, cat.to_string()],
    )?;
  }
  for skill in Skill::iter() {
    tx.execute(
      "INSERT OR IGNORE INTO skills (skill_id, category_id, name) VALUES (?1, ?2, ?3)",
      rusqlite::params![skill.id(), skill.category() as i64, skill.to_string()],
    )?;
  }

  tx.execute(
    "INSERT OR IGNORE INTO bank_log (log_id, date, member_id, amount, note)
     VALUES (?1, ?2, NULL, 0.0, 'opening balance')",
    rusqlite::params![OPENING_BALANCE_LOG_ID, encode_date(today())],
  )?;

  tx.commit()
}
