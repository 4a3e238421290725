//! [`SqliteStore`] — the SQLite implementation of [`GuildStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use muster_core::{
  catalog::{LookupEntry, LookupKind, SubjectId},
  ledger::{
    AggregateQuery, AggregateRow, EntryPatch, LedgerEntry, LedgerKind,
    LogId, NewEntry, OPENING_BALANCE_LOG_ID, RecentQuery,
  },
  member::{Member, MemberId},
  store::GuildStore,
};

use crate::{
  encode::{RawEntry, encode_date, encode_value, today},
  schema::{SCHEMA, category_table, lookup_id_col, lookup_table, seed},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A guild ledger store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The handle
/// is opened once at process start and passed explicitly to every caller.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// `SELECT 1` existence probe for a single-ID predicate.
fn exists(
  conn: &rusqlite::Connection,
  sql: &str,
  id: i64,
) -> rusqlite::Result<bool> {
  conn
    .query_row(sql, rusqlite::params![id], |_| Ok(true))
    .optional()
    .map(|found| found.unwrap_or(false))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

/// The uniform SELECT list for a ledger table. Tables without a subject or
/// note column read NULL in that position.
fn entry_cols(kind: LedgerKind) -> String {
  let subject = kind.subject_col().unwrap_or("NULL");
  let note = if kind.has_note() { "note" } else { "NULL" };
  format!("log_id, date, member_id, {subject}, {}, {note}", kind.value_col())
}

fn map_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
  Ok(RawEntry {
    log_id:     row.get(0)?,
    date:       row.get(1)?,
    member_id:  row.get(2)?,
    subject_id: row.get(3)?,
    value:      row.get(4)?,
    note:       row.get(5)?,
  })
}

// Closure-to-caller outcomes: reference checks run inside the connection
// closure, but the typed errors are built outside it.

enum InsertOutcome {
  Inserted(LogId),
  NoMember,
  NoSubject(SubjectId),
}

enum PatchOutcome {
  Patched,
  NotFound,
  NoSubject(SubjectId),
}

enum AddOutcome {
  Added(SubjectId),
  NoCategory,
  NameTaken,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation and
  /// catalog seeding. A failure here is fatal to startup; nothing is
  /// swallowed beyond the expected already-exists conditions handled by
  /// `IF NOT EXISTS` / `INSERT OR IGNORE`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        seed(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── GuildStore impl ─────────────────────────────────────────────────────────

impl GuildStore for SqliteStore {
  type Error = Error;

  // ── Roster ────────────────────────────────────────────────────────────────

  async fn upsert_members(&self, roster: Vec<Member>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for member in &roster {
          tx.execute(
            "INSERT INTO members (member_id, name) VALUES (?1, ?2)
             ON CONFLICT(member_id) DO UPDATE SET name = excluded.name",
            rusqlite::params![member.member_id, member.name],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_member(&self, id: MemberId) -> Result<Option<Member>> {
    let member = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT member_id, name FROM members WHERE member_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(Member { member_id: row.get(0)?, name: row.get(1)? })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(member)
  }

  async fn list_members(&self) -> Result<Vec<Member>> {
    let members = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT member_id, name FROM members ORDER BY member_id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Member { member_id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(members)
  }

  async fn delete_member(&self, id: MemberId) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM members WHERE member_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::MemberNotFound(id));
    }
    Ok(())
  }

  // ── Lookup tables ─────────────────────────────────────────────────────────

  async fn list_subjects(&self, kind: LookupKind) -> Result<Vec<LookupEntry>> {
    let sql = format!(
      "SELECT {id}, category_id, name FROM {table} ORDER BY {id}",
      id = lookup_id_col(kind),
      table = lookup_table(kind),
    );

    let entries = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(LookupEntry {
              subject_id:  row.get(0)?,
              category_id: row.get(1)?,
              name:        row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(entries)
  }

  async fn add_subject(
    &self,
    kind: LookupKind,
    name: String,
    category_id: i64,
  ) -> Result<SubjectId> {
    let category_probe = format!(
      "SELECT 1 FROM {} WHERE category_id = ?1",
      category_table(kind)
    );
    let insert_sql = format!(
      "INSERT INTO {} (category_id, name) VALUES (?1, ?2)",
      lookup_table(kind)
    );
    let stored_name = name.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        if !exists(conn, &category_probe, category_id)? {
          return Ok(AddOutcome::NoCategory);
        }
        match conn
          .execute(&insert_sql, rusqlite::params![category_id, stored_name])
        {
          Ok(_) => Ok(AddOutcome::Added(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(AddOutcome::NameTaken),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match outcome {
      AddOutcome::Added(id) => Ok(id),
      AddOutcome::NoCategory => Err(Error::CategoryNotFound(kind, category_id)),
      AddOutcome::NameTaken => Err(Error::DuplicateName(kind, name)),
    }
  }

  // ── Ledgers ───────────────────────────────────────────────────────────────

  async fn insert_entry(
    &self,
    kind: LedgerKind,
    entry: NewEntry,
  ) -> Result<LedgerEntry> {
    if kind.subject_col().is_some() && entry.subject_id.is_none() {
      return Err(Error::SubjectRequired(kind));
    }

    let date = entry.date.unwrap_or_else(today);
    let date_str = encode_date(date);

    // Column list and parameters built together so they cannot drift.
    let mut cols: Vec<&'static str> = vec!["date", "member_id", kind.value_col()];
    let mut vals: Vec<rusqlite::types::Value> = vec![
      date_str.clone().into(),
      entry.member_id.into(),
      encode_value(entry.value),
    ];
    if let (Some(col), Some(subject_id)) = (kind.subject_col(), entry.subject_id)
    {
      cols.push(col);
      vals.push(subject_id.into());
    }
    if kind.has_note()
      && let Some(note) = entry.note.clone()
    {
      cols.push("note");
      vals.push(note.into());
    }

    let placeholders: Vec<String> =
      (1..=cols.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
      "INSERT INTO {} ({}) VALUES ({})",
      kind.table(),
      cols.join(", "),
      placeholders.join(", "),
    );

    let member_id = entry.member_id;
    let subject_id = entry.subject_id;
    let subject_probe = kind.subject().map(|lookup| {
      format!(
        "SELECT 1 FROM {} WHERE {} = ?1",
        lookup_table(lookup),
        lookup_id_col(lookup)
      )
    });

    let outcome = self
      .conn
      .call(move |conn| {
        if !exists(conn, "SELECT 1 FROM members WHERE member_id = ?1", member_id)?
        {
          return Ok(InsertOutcome::NoMember);
        }
        if let (Some(probe), Some(id)) = (&subject_probe, subject_id)
          && !exists(conn, probe, id)?
        {
          return Ok(InsertOutcome::NoSubject(id));
        }
        conn.execute(&sql, rusqlite::params_from_iter(vals))?;
        Ok(InsertOutcome::Inserted(conn.last_insert_rowid()))
      })
      .await?;

    match outcome {
      InsertOutcome::Inserted(log_id) => Ok(LedgerEntry {
        log_id,
        date,
        member_id: Some(entry.member_id),
        subject_id: if kind.subject_col().is_some() {
          entry.subject_id
        } else {
          None
        },
        value: entry.value,
        note: if kind.has_note() { entry.note } else { None },
      }),
      InsertOutcome::NoMember => Err(Error::MemberNotFound(entry.member_id)),
      InsertOutcome::NoSubject(id) => match kind.subject() {
        Some(lookup) => Err(Error::SubjectNotFound(lookup, id)),
        None => Err(Error::SubjectRequired(kind)),
      },
    }
  }

  async fn patch_entry(
    &self,
    kind: LedgerKind,
    log_id: LogId,
    patch: EntryPatch,
  ) -> Result<()> {
    if patch.is_empty() {
      // Pure no-op: no write, no existence check.
      return Ok(());
    }

    let mut assignments: Vec<String> = Vec::new();
    let mut vals: Vec<rusqlite::types::Value> = Vec::new();

    fn push(
      col: &str,
      val: rusqlite::types::Value,
      assignments: &mut Vec<String>,
      vals: &mut Vec<rusqlite::types::Value>,
    ) {
      vals.push(val);
      assignments.push(format!("{col} = ?{}", vals.len()));
    }

    if let (Some(col), Some(subject_id)) = (kind.subject_col(), patch.subject_id)
    {
      push(col, subject_id.into(), &mut assignments, &mut vals);
    }
    if let Some(value) = patch.value {
      push(kind.value_col(), encode_value(value), &mut assignments, &mut vals);
    }
    if let Some(date) = patch.date {
      push("date", encode_date(date).into(), &mut assignments, &mut vals);
    }
    if kind.has_note()
      && let Some(note) = patch.note.clone()
    {
      push("note", note.into(), &mut assignments, &mut vals);
    }

    if assignments.is_empty() {
      // Every supplied field was inapplicable to this ledger (e.g. a note
      // for a level log); nothing to write.
      return Ok(());
    }

    let sql = format!(
      "UPDATE {} SET {} WHERE log_id = ?{}",
      kind.table(),
      assignments.join(", "),
      vals.len() + 1,
    );
    vals.push(log_id.into());

    let subject_probe = kind.subject().map(|lookup| {
      format!(
        "SELECT 1 FROM {} WHERE {} = ?1",
        lookup_table(lookup),
        lookup_id_col(lookup)
      )
    });
    let patched_subject = patch.subject_id;

    let outcome = self
      .conn
      .call(move |conn| {
        if let (Some(probe), Some(id)) = (&subject_probe, patched_subject)
          && !exists(conn, probe, id)?
        {
          return Ok(PatchOutcome::NoSubject(id));
        }
        let n = conn.execute(&sql, rusqlite::params_from_iter(vals))?;
        Ok(if n == 0 { PatchOutcome::NotFound } else { PatchOutcome::Patched })
      })
      .await?;

    match outcome {
      PatchOutcome::Patched => Ok(()),
      PatchOutcome::NotFound => Err(Error::EntryNotFound(kind, log_id)),
      PatchOutcome::NoSubject(id) => match kind.subject() {
        Some(lookup) => Err(Error::SubjectNotFound(lookup, id)),
        None => Err(Error::SubjectRequired(kind)),
      },
    }
  }

  async fn get_entry(
    &self,
    kind: LedgerKind,
    log_id: LogId,
  ) -> Result<Option<LedgerEntry>> {
    let sql = format!(
      "SELECT {} FROM {} WHERE log_id = ?1",
      entry_cols(kind),
      kind.table()
    );

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![log_id], map_raw)
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_entry(kind)).transpose()
  }

  async fn delete_entry(&self, kind: LedgerKind, log_id: LogId) -> Result<()> {
    if kind == LedgerKind::Bank && log_id == OPENING_BALANCE_LOG_ID {
      return Err(Error::Reserved(log_id));
    }

    let sql = format!("DELETE FROM {} WHERE log_id = ?1", kind.table());
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![log_id])?))
      .await?;

    if deleted == 0 {
      return Err(Error::EntryNotFound(kind, log_id));
    }
    Ok(())
  }

  async fn recent_entries(
    &self,
    kind: LedgerKind,
    query: RecentQuery,
  ) -> Result<Vec<LedgerEntry>> {
    let cols = entry_cols(kind);
    let table = kind.table();
    let limit = query.limit as i64;

    let (sql, params): (String, Vec<rusqlite::types::Value>) =
      match (query.member_id, query.subject_id, kind.subject_col()) {
        // A subject filter can never match a ledger with no subject column.
        (_, Some(_), None) => return Ok(Vec::new()),
        (None, None, _) => (
          format!(
            "SELECT {cols} FROM {table}
             ORDER BY date DESC, log_id DESC LIMIT ?1"
          ),
          vec![limit.into()],
        ),
        (Some(member), None, _) => (
          format!(
            "SELECT {cols} FROM {table} WHERE member_id = ?1
             ORDER BY date DESC, log_id DESC LIMIT ?2"
          ),
          vec![member.into(), limit.into()],
        ),
        (Some(member), Some(subject), Some(sc)) => (
          format!(
            "SELECT {cols} FROM {table}
             WHERE member_id = ?1 AND {sc} = ?2
             ORDER BY date DESC, log_id DESC LIMIT ?3"
          ),
          vec![member.into(), subject.into(), limit.into()],
        ),
        (None, Some(subject), Some(sc)) if query.best_per_member => {
          // Each member's single highest-value row for this subject,
          // strongest first. Ties on value go to the earliest row.
          let vc = kind.value_col();
          (
            format!(
              "SELECT {cols} FROM {table} t1
               WHERE t1.{sc} = ?1 AND t1.log_id = (
                 SELECT t2.log_id FROM {table} t2
                 WHERE t2.{sc} = ?1 AND t2.member_id IS t1.member_id
                 ORDER BY t2.{vc} DESC, t2.log_id ASC LIMIT 1)
               ORDER BY {vc} DESC, log_id ASC LIMIT ?2"
            ),
            vec![subject.into(), limit.into()],
          )
        }
        (None, Some(subject), Some(sc)) => (
          format!(
            "SELECT {cols} FROM {table} WHERE {sc} = ?1
             ORDER BY date DESC, log_id DESC LIMIT ?2"
          ),
          vec![subject.into(), limit.into()],
        ),
      };

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), map_raw)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_entry(kind)).collect()
  }

  async fn aggregate(
    &self,
    kind: LedgerKind,
    query: AggregateQuery,
  ) -> Result<Vec<AggregateRow>> {
    let cols = entry_cols(kind);
    let table = kind.table();
    let vc = kind.value_col();
    let limit = query.limit.map(|l| l as i64).unwrap_or(-1);

    // Correlated-subquery selection of each group's maximum-value row; ties
    // on value resolve to the lowest log_id so results are deterministic.
    let subject_corr = kind
      .subject_col()
      .map(|sc| format!(" AND t2.{sc} IS t1.{sc}"))
      .unwrap_or_default();

    let (sql, params): (String, Vec<rusqlite::types::Value>) =
      match (query.member_id, query.subject_id, kind.subject_col()) {
        (_, Some(_), None) => return Ok(Vec::new()),
        // Current value per subject for one member.
        (Some(member), None, sc) => {
          let order = sc.unwrap_or("log_id");
          (
            format!(
              "SELECT {cols} FROM {table} t1
               WHERE t1.member_id = ?1 AND t1.log_id = (
                 SELECT t2.log_id FROM {table} t2
                 WHERE t2.member_id = ?1{subject_corr}
                 ORDER BY t2.{vc} DESC, t2.log_id ASC LIMIT 1)
               ORDER BY {order} ASC LIMIT ?2"
            ),
            vec![member.into(), limit.into()],
          )
        }
        // Leaderboard: current value per member for one subject.
        (None, Some(subject), Some(sc)) => (
          format!(
            "SELECT {cols} FROM {table} t1
             WHERE t1.{sc} = ?1 AND t1.log_id = (
               SELECT t2.log_id FROM {table} t2
               WHERE t2.{sc} = ?1 AND t2.member_id IS t1.member_id
               ORDER BY t2.{vc} DESC, t2.log_id ASC LIMIT 1)
             ORDER BY {vc} DESC, log_id ASC LIMIT ?2"
          ),
          vec![subject.into(), limit.into()],
        ),
        // One (member, subject) pair.
        (Some(member), Some(subject), Some(sc)) => (
          format!(
            "SELECT {cols} FROM {table}
             WHERE member_id = ?1 AND {sc} = ?2
             ORDER BY {vc} DESC, log_id ASC LIMIT 1"
          ),
          vec![member.into(), subject.into()],
        ),
        // Current value per (member, subject) group across the ledger.
        (None, None, _) => (
          format!(
            "SELECT {cols} FROM {table} t1
             WHERE t1.log_id = (
               SELECT t2.log_id FROM {table} t2
               WHERE t2.member_id IS t1.member_id{subject_corr}
               ORDER BY t2.{vc} DESC, t2.log_id ASC LIMIT 1)
             ORDER BY {vc} DESC, log_id ASC LIMIT ?1"
          ),
          vec![limit.into()],
        ),
      };

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), map_raw)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_aggregate(kind)).collect()
  }

  // ── Bank ──────────────────────────────────────────────────────────────────

  async fn balance(&self) -> Result<f64> {
    let total = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(amount), 0.0) FROM bank_log",
          [],
          |row| row.get::<_, f64>(0),
        )?)
      })
      .await?;
    Ok(total)
  }

  async fn set_opening_balance(&self, amount: f64) -> Result<()> {
    let date_str = encode_date(today());
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE bank_log SET amount = ?1, date = ?2 WHERE log_id = ?3",
          rusqlite::params![amount, date_str, OPENING_BALANCE_LOG_ID],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::EntryNotFound(
        LedgerKind::Bank,
        OPENING_BALANCE_LOG_ID,
      ));
    }
    Ok(())
  }
}
