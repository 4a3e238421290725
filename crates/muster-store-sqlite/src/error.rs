//! Error type for `muster-store-sqlite`.

use muster_core::{
  catalog::{LookupKind, SubjectId},
  ledger::{LedgerKind, LogId},
  member::MemberId,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A ledger write referenced a member that is not in the directory.
  #[error("member not found: {0}")]
  MemberNotFound(MemberId),

  /// A ledger write referenced a weapon/skill that is not in its lookup
  /// table.
  #[error("{0} not found: {1}")]
  SubjectNotFound(LookupKind, SubjectId),

  /// An administrative lookup addition named a missing category.
  #[error("{0} category not found: {1}")]
  CategoryNotFound(LookupKind, i64),

  /// A write against a subject ledger omitted the subject.
  #[error("an entry in the {0} requires a subject")]
  SubjectRequired(LedgerKind),

  /// An operation targeted a log ID that does not exist.
  #[error("no entry {1} in the {0}")]
  EntryNotFound(LedgerKind, LogId),

  /// An administrative lookup addition collided with the unique name column.
  #[error("a {0} named {1:?} already exists")]
  DuplicateName(LookupKind, String),

  /// The opening-balance row can be updated but never deleted.
  #[error("entry {0} is reserved and cannot be deleted")]
  Reserved(LogId),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
