//! The `GuildStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `muster-store-sqlite`).
//! Higher layers (`muster-commands`, `muster-gateway`) depend on this
//! abstraction, not on any concrete backend. The handle is passed explicitly
//! to every caller; there is no ambient global connection.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  catalog::{LookupEntry, LookupKind, SubjectId},
  ledger::{
    AggregateQuery, AggregateRow, EntryPatch, LedgerEntry, LedgerKind, LogId,
    NewEntry, RecentQuery,
  },
  member::{Member, MemberId},
};

/// Abstraction over a guild ledger store backend.
///
/// Every operation commits before its future resolves; serialisation of
/// concurrent commands is left to the engine's own locking.
pub trait GuildStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Roster ────────────────────────────────────────────────────────────

  /// Idempotent bulk write: insert each member, or overwrite the display
  /// name if the ID already exists.
  fn upsert_members(
    &self,
    roster: Vec<Member>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Look up a member by platform ID. Returns `None` if not found.
  fn get_member(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  /// The full directory, ordered by ID.
  fn list_members(
    &self,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Remove a member. Historical ledger rows referencing them are left in
  /// place as soft-orphans; they represent fact and stay in aggregates.
  fn delete_member(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Lookup tables ─────────────────────────────────────────────────────

  /// All rows of a subject lookup table, seeded catalog plus any
  /// administrative additions, ordered by ID.
  fn list_subjects(
    &self,
    kind: LookupKind,
  ) -> impl Future<Output = Result<Vec<LookupEntry>, Self::Error>> + Send + '_;

  /// Administrative addition of a weapon/skill beyond the seeded catalog.
  /// The new row's ID is assigned by the store.
  fn add_subject(
    &self,
    kind: LookupKind,
    name: String,
    category_id: i64,
  ) -> impl Future<Output = Result<SubjectId, Self::Error>> + Send + '_;

  // ── Ledgers ───────────────────────────────────────────────────────────

  /// Append a row. The date defaults to today when omitted; member and
  /// subject references are checked and a dangling one is a distinguishable
  /// error, never a silent insert.
  fn insert_entry(
    &self,
    kind: LedgerKind,
    entry: NewEntry,
  ) -> impl Future<Output = Result<LedgerEntry, Self::Error>> + Send + '_;

  /// Overwrite only the supplied fields of an existing row. An empty patch
  /// is a pure no-op (no write is issued); a missing `log_id` is an error.
  fn patch_entry(
    &self,
    kind: LedgerKind,
    log_id: LogId,
    patch: EntryPatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch a single row. Returns `None` if not found.
  fn get_entry(
    &self,
    kind: LedgerKind,
    log_id: LogId,
  ) -> impl Future<Output = Result<Option<LedgerEntry>, Self::Error>> + Send + '_;

  /// Unconditional removal; errors if the row is absent or reserved.
  fn delete_entry(
    &self,
    kind: LedgerKind,
    log_id: LogId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Rows ordered by date descending, newest first. See [`RecentQuery`] for
  /// the filter cases.
  fn recent_entries(
    &self,
    kind: LedgerKind,
    query: RecentQuery,
  ) -> impl Future<Output = Result<Vec<LedgerEntry>, Self::Error>> + Send + '_;

  /// Query-time aggregate view: per group, the row with the maximum value,
  /// ties broken by lowest `log_id`. See [`AggregateQuery`] for grouping.
  fn aggregate(
    &self,
    kind: LedgerKind,
    query: AggregateQuery,
  ) -> impl Future<Output = Result<Vec<AggregateRow>, Self::Error>> + Send + '_;

  // ── Bank ──────────────────────────────────────────────────────────────

  /// Running sum of all bank amounts, opening balance included.
  fn balance(
    &self,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + '_;

  /// Overwrite the reserved opening-balance row in place. Never creates a
  /// second seed row.
  fn set_opening_balance(
    &self,
    amount: f64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
