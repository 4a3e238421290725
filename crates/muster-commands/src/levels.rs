//! Level-ledger commands, shared by the weapon, skill, and character
//! surfaces.
//!
//! Each handler takes the [`LedgerKind`] it operates on; the weapon and
//! skill ledgers additionally carry a subject argument (`weapon=rapier`,
//! `skill=smelting`) resolved by name against the lookup table. The
//! character ledger has no subject and skips those columns.

use strum::IntoEnumIterator as _;

use muster_core::{
  catalog::{LookupKind, SkillCategory, WeaponCategory},
  ledger::{
    AggregateQuery, EntryPatch, LedgerKind, LedgerValue, LedgerWrite,
    NewEntry, RecentQuery,
  },
  member::MemberId,
  store::GuildStore,
};

use crate::{
  CommandError, apply_write, args::Args, authorize_entry, display_member,
  display_subject, error::store_err, member_names, require_elevated,
  resolve_subject, subject_names, table::TextTable,
};

const HISTORY_LIMIT: usize = 10;
const TOP_LIMIT: usize = 10;

/// Resolve the ledger's subject argument, if the ledger has one.
async fn subject_arg<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  args: Args<'_>,
  required: bool,
) -> Result<Option<i64>, CommandError> {
  let Some(lookup) = kind.subject() else {
    return Ok(None);
  };
  let name = if required {
    Some(args.require(lookup.label())?)
  } else {
    args.get(lookup.label())
  };
  match name {
    Some(name) => {
      Ok(Some(resolve_subject(store, lookup, name).await?.subject_id))
    }
    None => Ok(None),
  }
}

/// `weapon-log` / `skill-log` / `level-log` — record a level. `member`
/// defaults to the actor; logging for someone else needs the elevated role.
pub async fn log<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  actor: MemberId,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let level = args.integer("level")?;
  let member = args.integer_opt("member")?.unwrap_or(actor);
  if member != actor {
    require_elevated(elevated, "logging for another member")?;
  }

  let entry = NewEntry {
    member_id:  member,
    subject_id: subject_arg(store, kind, args, true).await?,
    value:      LedgerValue::Level(level),
    date:       args.date_opt("date")?,
    note:       None,
  };
  let receipt = apply_write(store, kind, LedgerWrite::Create(entry)).await?;
  Ok(format!("logged level {level} as entry {}", receipt.log_id()))
}

/// `weapon-edit` / `skill-edit` / `level-edit` — patch an owned entry.
pub async fn edit<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  actor: MemberId,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let log_id = args.integer("id")?;
  authorize_entry(store, kind, log_id, actor, elevated).await?;

  let patch = EntryPatch {
    subject_id: subject_arg(store, kind, args, false).await?,
    value:      args.integer_opt("level")?.map(LedgerValue::Level),
    date:       args.date_opt("date")?,
    note:       None,
  };
  if patch.is_empty() {
    return Ok(format!("nothing to change on entry {log_id}"));
  }

  let receipt = apply_write(store, kind, LedgerWrite::Patch { log_id, patch })
    .await?;
  Ok(format!("updated entry {}", receipt.log_id()))
}

/// `weapon-remove` / `skill-remove` / `level-remove`.
pub async fn remove<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  actor: MemberId,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let log_id = args.integer("id")?;
  authorize_entry(store, kind, log_id, actor, elevated).await?;
  store.delete_entry(kind, log_id).await.map_err(store_err)?;
  Ok(format!("removed entry {log_id}"))
}

/// `weapon-history` / `skill-history` / `level-history` — raw entries,
/// newest first, optionally filtered by member and/or subject.
pub async fn history<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let query = RecentQuery {
    member_id:       args.integer_opt("member")?,
    subject_id:      subject_arg(store, kind, args, false).await?,
    limit:           args.limit(HISTORY_LIMIT)?,
    best_per_member: false,
  };
  let entries = store.recent_entries(kind, query).await.map_err(store_err)?;
  if entries.is_empty() {
    return Ok(format!("no entries in the {kind}"));
  }

  let names = member_names(store).await?;
  let table = match kind.subject() {
    Some(lookup) => {
      let subjects = subject_names(store, lookup).await?;
      let mut table =
        TextTable::new(["log", "date", "member", lookup.label(), "level"]);
      for entry in entries {
        table.row([
          entry.log_id.to_string(),
          entry.date.to_string(),
          display_member(&names, entry.member_id),
          display_subject(&subjects, entry.subject_id),
          entry.value.to_string(),
        ]);
      }
      table
    }
    None => {
      let mut table = TextTable::new(["log", "date", "member", "level"]);
      for entry in entries {
        table.row([
          entry.log_id.to_string(),
          entry.date.to_string(),
          display_member(&names, entry.member_id),
          entry.value.to_string(),
        ]);
      }
      table
    }
  };
  Ok(table.render())
}

/// `weapon-levels` / `skill-levels` — one member's current level in every
/// subject they have logged. `member` defaults to the actor.
pub async fn current<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  actor: MemberId,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let member = args.integer_opt("member")?.unwrap_or(actor);
  let rows = store
    .aggregate(kind, AggregateQuery {
      member_id: Some(member),
      ..Default::default()
    })
    .await
    .map_err(store_err)?;
  let member_name = crate::member_name(store, member).await?;
  if rows.is_empty() {
    return Ok(format!("no entries for {member_name} in the {kind}"));
  }

  // `current` is only routed for the weapon and skill surfaces.
  let Some(lookup) = kind.subject() else {
    return Err(CommandError::validation(format!(
      "the {kind} has no per-subject view"
    )));
  };
  let subjects = subject_names(store, lookup).await?;
  let mut table = TextTable::new([lookup.label(), "level", "date"]);
  for row in rows {
    table.row([
      display_subject(&subjects, row.subject_id),
      row.value.to_string(),
      row.date.to_string(),
    ]);
  }
  Ok(format!("current levels for {member_name}:\n{}", table.render()))
}

/// `weapon-top` / `skill-top` / `level-top` — leaderboard of current values.
/// The subject ledgers require their subject argument; the character ledger
/// ranks members directly.
pub async fn top<S: GuildStore>(
  store: &S,
  kind: LedgerKind,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let subject_id = subject_arg(store, kind, args, true).await?;
  let rows = store
    .aggregate(kind, AggregateQuery {
      member_id: None,
      subject_id,
      limit: Some(args.limit(TOP_LIMIT)?),
    })
    .await
    .map_err(store_err)?;
  if rows.is_empty() {
    return Ok(format!("no entries in the {kind}"));
  }

  let names = member_names(store).await?;
  let mut table = TextTable::new(["rank", "member", "level", "date"]);
  for (i, row) in rows.into_iter().enumerate() {
    table.row([
      (i + 1).to_string(),
      display_member(&names, row.member_id),
      row.value.to_string(),
      row.date.to_string(),
    ]);
  }
  Ok(table.render())
}

/// `weapon-add` / `skill-add` — administrative catalog addition. Elevated
/// only; the category is given by name.
pub async fn add<S: GuildStore>(
  store: &S,
  kind: LookupKind,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  require_elevated(elevated, "catalog additions")?;

  let name = args.require("name")?.to_lowercase();
  let category = args.require("category")?;
  let category_id = parse_category(kind, category)?;

  let id = store
    .add_subject(kind, name.clone(), category_id)
    .await
    .map_err(store_err)?;
  Ok(format!("added {kind} \"{name}\" with id {id}"))
}

fn parse_category(
  kind: LookupKind,
  value: &str,
) -> Result<i64, CommandError> {
  let lowered = value.to_lowercase();
  let parsed = match kind {
    LookupKind::Weapon => {
      lowered.parse::<WeaponCategory>().ok().map(|c| c as i64)
    }
    LookupKind::Skill => lowered.parse::<SkillCategory>().ok().map(|c| c as i64),
  };
  parsed.ok_or_else(|| {
    let valid = match kind {
      LookupKind::Weapon => WeaponCategory::iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", "),
      LookupKind::Skill => SkillCategory::iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", "),
    };
    CommandError::validation(format!(
      "no {kind} category \"{value}\" (valid: {valid})"
    ))
  })
}
