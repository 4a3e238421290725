//! Command dispatch for the guild ledgers.
//!
//! Commands arrive as already-parsed name/argument payloads carrying the
//! actor's external identity; this crate coerces the arguments, enforces
//! ownership and elevation rules, makes the store calls, and renders a
//! confirmation line or a column-aligned text table. Every failure becomes
//! user-visible text at [`dispatch`] — callers always get a message they can
//! post back to chat.

pub mod args;
pub mod bank;
pub mod error;
pub mod levels;
pub mod roster;
pub mod table;


use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use muster_core::{
  catalog::{LookupEntry, LookupKind, SubjectId},
  ledger::{LedgerEntry, LedgerKind, LedgerWrite, LogId},
  member::MemberId,
  store::GuildStore,
};

use args::Args;
pub use error::CommandError;
use error::store_err;

// ─── Request / response ──────────────────────────────────────────────────────

/// One incoming command, as delivered by the chat-platform integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
  /// Platform ID of the invoking user.
  pub actor:    MemberId,
  /// Whether the platform reports the actor holding the elevated role.
  #[serde(default)]
  pub elevated: bool,
  /// Command name, e.g. `bank-log`.
  pub name:     String,
  #[serde(default)]
  pub args:     BTreeMap<String, String>,
}

/// The rendered outcome of one command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
  /// Text to post back to chat: a confirmation line, a table, or an error
  /// message.
  pub text:     String,
  /// Set by the `close` command; the gateway drains and exits.
  #[serde(default)]
  pub shutdown: bool,
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Route one command to its handler and render the outcome.
///
/// Never returns an error: validation, permission, and store failures are all
/// rendered into the response text, mirroring chat semantics where the only
/// failure channel is a reply the user can read.
pub async fn dispatch<S: GuildStore>(
  store: &S,
  req: &CommandRequest,
) -> CommandResponse {
  tracing::info!(command = %req.name, actor = req.actor, "dispatching");

  if req.name == "close" {
    return CommandResponse {
      text:     "shutting down".to_string(),
      shutdown: true,
    };
  }

  match route(store, req).await {
    Ok(text) => CommandResponse { text, shutdown: false },
    Err(e) => {
      tracing::warn!(command = %req.name, error = %e, "command failed");
      CommandResponse { text: e.to_string(), shutdown: false }
    }
  }
}

async fn route<S: GuildStore>(
  store: &S,
  req: &CommandRequest,
) -> Result<String, CommandError> {
  use LedgerKind::{CharacterLevel, SkillLevel, WeaponLevel};

  let args = Args::new(&req.args);
  let actor = req.actor;
  let elevated = req.elevated;

  match req.name.as_str() {
    "roster-sync" => roster::sync(store, elevated, args).await,
    "roster-remove" => roster::remove(store, actor, elevated, args).await,
    "roster" => roster::list(store).await,

    "bank-log" => bank::log(store, actor, elevated, args).await,
    "bank-edit" => bank::edit(store, actor, elevated, args).await,
    "bank-remove" => bank::remove(store, actor, elevated, args).await,
    "bank-history" => bank::history(store, args).await,
    "bank-balance" => bank::balance(store).await,
    "bank-set-balance" => bank::set_balance(store, elevated, args).await,

    "weapon-log" => levels::log(store, WeaponLevel, actor, elevated, args).await,
    "weapon-edit" => levels::edit(store, WeaponLevel, actor, elevated, args).await,
    "weapon-remove" => {
      levels::remove(store, WeaponLevel, actor, elevated, args).await
    }
    "weapon-history" => levels::history(store, WeaponLevel, args).await,
    "weapon-levels" => levels::current(store, WeaponLevel, actor, args).await,
    "weapon-top" => levels::top(store, WeaponLevel, args).await,
    "weapon-add" => levels::add(store, LookupKind::Weapon, elevated, args).await,

    "skill-log" => levels::log(store, SkillLevel, actor, elevated, args).await,
    "skill-edit" => levels::edit(store, SkillLevel, actor, elevated, args).await,
    "skill-remove" => {
      levels::remove(store, SkillLevel, actor, elevated, args).await
    }
    "skill-history" => levels::history(store, SkillLevel, args).await,
    "skill-levels" => levels::current(store, SkillLevel, actor, args).await,
    "skill-top" => levels::top(store, SkillLevel, args).await,
    "skill-add" => levels::add(store, LookupKind::Skill, elevated, args).await,

    "level-log" => {
      levels::log(store, CharacterLevel, actor, elevated, args).await
    }
    "level-edit" => {
      levels::edit(store, CharacterLevel, actor, elevated, args).await
    }
    "level-remove" => {
      levels::remove(store, CharacterLevel, actor, elevated, args).await
    }
    "level-history" => levels::history(store, CharacterLevel, args).await,
    "level-top" => levels::top(store, CharacterLevel, args).await,

    other => Err(CommandError::validation(format!(
      "unknown command \"{other}\""
    ))),
  }
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

pub(crate) fn require_elevated(
  elevated: bool,
  command: &str,
) -> Result<(), CommandError> {
  if elevated {
    return Ok(());
  }
  Err(CommandError::permission(format!(
    "`{command}` requires the elevated role"
  )))
}

/// Ownership check for mutations of an existing ledger row. Elevated actors
/// bypass it; everyone else must own the row. The reserved guild row (its
/// member reference is NULL) is never owned by anyone.
pub(crate) async fn authorize_entry<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  log_id: LogId,
  actor: MemberId,
  elevated: bool,
) -> Result<(), CommandError> {
  if elevated {
    return Ok(());
  }
  let entry = store
    .get_entry(kind, log_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      CommandError::validation(format!("no entry {log_id} in the {kind}"))
    })?;

  match entry.member_id {
    Some(owner) if owner == actor => Ok(()),
    Some(owner) => {
      let name = member_name(store, owner).await?;
      Err(CommandError::permission(format!(
        "entry {log_id} belongs to {name}"
      )))
    }
    None => Err(CommandError::permission(format!(
      "entry {log_id} is the guild's reserved row"
    ))),
  }
}

/// What a [`LedgerWrite`] produced.
pub(crate) enum WriteReceipt {
  Created(LedgerEntry),
  Patched(LogId),
}

impl WriteReceipt {
  pub(crate) fn log_id(&self) -> LogId {
    match self {
      Self::Created(entry) => entry.log_id,
      Self::Patched(log_id) => *log_id,
    }
  }
}

/// Apply a [`LedgerWrite`]: the two paths are statically distinct, and a
/// patch naming a missing row is an error, never a fallback insert.
pub(crate) async fn apply_write<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  write: LedgerWrite,
) -> Result<WriteReceipt, CommandError> {
  match write {
    LedgerWrite::Create(entry) => store
      .insert_entry(kind, entry)
      .await
      .map(WriteReceipt::Created)
      .map_err(store_err),
    LedgerWrite::Patch { log_id, patch } => store
      .patch_entry(kind, log_id, patch)
      .await
      .map(|()| WriteReceipt::Patched(log_id))
      .map_err(store_err),
  }
}

// ─── Display-name resolution ─────────────────────────────────────────────────

pub(crate) async fn member_name<S: GuildStore>(
  store: &S,
  id: MemberId,
) -> Result<String, CommandError> {
  Ok(
    store
      .get_member(id)
      .await
      .map_err(store_err)?
      .map(|m| m.name)
      .unwrap_or_else(|| "unknown".to_string()),
  )
}

pub(crate) async fn member_names<S: GuildStore>(
  store: &S,
) -> Result<BTreeMap<MemberId, String>, CommandError> {
  Ok(
    store
      .list_members()
      .await
      .map_err(store_err)?
      .into_iter()
      .map(|m| (m.member_id, m.name))
      .collect(),
  )
}

/// Display name for a ledger row's member column. Rows whose member left the
/// roster show "unknown"; the reserved guild row shows "guild".
pub(crate) fn display_member(
  names: &BTreeMap<MemberId, String>,
  id: Option<MemberId>,
) -> String {
  match id {
    Some(id) => names.get(&id).cloned().unwrap_or_else(|| "unknown".into()),
    None => "guild".to_string(),
  }
}

pub(crate) async fn subject_names<S: GuildStore>(
  store: &S,
  kind: LookupKind,
) -> Result<BTreeMap<SubjectId, String>, CommandError> {
  Ok(
    store
      .list_subjects(kind)
      .await
      .map_err(store_err)?
      .into_iter()
      .map(|e| (e.subject_id, e.name))
      .collect(),
  )
}

pub(crate) fn display_subject(
  names: &BTreeMap<SubjectId, String>,
  id: Option<SubjectId>,
) -> String {
  match id {
    Some(id) => names.get(&id).cloned().unwrap_or_else(|| "unknown".into()),
    None => "-".to_string(),
  }
}

/// Resolve a weapon/skill argument given by name, case-insensitively,
/// against the lookup table (seeded catalog plus administrative additions).
pub(crate) async fn resolve_subject<S: GuildStore>(
  store: &S,
  kind: LookupKind,
  name: &str,
) -> Result<LookupEntry, CommandError> {
  let wanted = name.to_lowercase();
  store
    .list_subjects(kind)
    .await
    .map_err(store_err)?
    .into_iter()
    .find(|e| e.name == wanted)
    .ok_or_else(|| {
      CommandError::validation(format!("no {kind} named \"{name}\""))
    })
}
