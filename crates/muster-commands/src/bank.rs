//! Bank commands: transaction log, history, and balance.
//!
//! Deposits are positive amounts, withdrawals negative. Nothing sign-checks
//! or range-checks an amount; the ledger records what members report.

use muster_core::{
  ledger::{
    EntryPatch, LedgerKind, LedgerValue, LedgerWrite, NewEntry, RecentQuery,
  },
  member::MemberId,
  store::GuildStore,
};

use crate::{
  CommandError, apply_write, args::Args, authorize_entry, display_member,
  error::store_err, member_names, require_elevated, table::TextTable,
};

const KIND: LedgerKind = LedgerKind::Bank;
const HISTORY_LIMIT: usize = 10;

/// `bank-log` — record a transaction. `member` defaults to the actor;
/// logging on someone else's behalf needs the elevated role.
pub async fn log<S: GuildStore>(
  store: &S,
  actor: MemberId,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let amount = args.amount("amount")?;
  let member = args.integer_opt("member")?.unwrap_or(actor);
  if member != actor {
    require_elevated(elevated, "bank-log")?;
  }

  let entry = NewEntry {
    member_id:  member,
    subject_id: None,
    value:      LedgerValue::Amount(amount),
    date:       args.date_opt("date")?,
    note:       args.get("note").map(str::to_string),
  };
  let receipt = apply_write(store, KIND, LedgerWrite::Create(entry)).await?;
  Ok(format!("logged {amount:.2} as entry {}", receipt.log_id()))
}

/// `bank-edit` — patch amount, date, or note of an owned entry.
pub async fn edit<S: GuildStore>(
  store: &S,
  actor: MemberId,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let log_id = args.integer("id")?;
  authorize_entry(store, KIND, log_id, actor, elevated).await?;

  let patch = EntryPatch {
    subject_id: None,
    value:      args.amount_opt("amount")?.map(LedgerValue::Amount),
    date:       args.date_opt("date")?,
    note:       args.get("note").map(str::to_string),
  };
  if patch.is_empty() {
    return Ok(format!("nothing to change on entry {log_id}"));
  }

  apply_write(store, KIND, LedgerWrite::Patch { log_id, patch }).await?;
  Ok(format!("updated entry {log_id}"))
}

/// `bank-remove` — delete an owned entry. The reserved opening-balance row
/// is refused by the store regardless of role.
pub async fn remove<S: GuildStore>(
  store: &S,
  actor: MemberId,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let log_id = args.integer("id")?;
  authorize_entry(store, KIND, log_id, actor, elevated).await?;
  store.delete_entry(KIND, log_id).await.map_err(store_err)?;
  Ok(format!("removed entry {log_id}"))
}

/// `bank-history` — most recent transactions, optionally for one member.
pub async fn history<S: GuildStore>(
  store: &S,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let query = RecentQuery {
    member_id: args.integer_opt("member")?,
    limit: args.limit(HISTORY_LIMIT)?,
    ..Default::default()
  };
  let entries = store.recent_entries(KIND, query).await.map_err(store_err)?;
  if entries.is_empty() {
    return Ok("no bank entries found".to_string());
  }

  let names = member_names(store).await?;
  let mut table = TextTable::new(["log", "date", "member", "amount", "note"]);
  for entry in entries {
    table.row([
      entry.log_id.to_string(),
      entry.date.to_string(),
      display_member(&names, entry.member_id),
      entry.value.to_string(),
      entry.note.unwrap_or_default(),
    ]);
  }
  Ok(table.render())
}

/// `bank-balance` — the running sum, opening balance included.
pub async fn balance<S: GuildStore>(store: &S) -> Result<String, CommandError> {
  let total = store.balance().await.map_err(store_err)?;
  Ok(format!("bank balance: {total:.2}"))
}

/// `bank-set-balance` — overwrite the reserved opening-balance row. Elevated
/// only.
pub async fn set_balance<S: GuildStore>(
  store: &S,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  require_elevated(elevated, "bank-set-balance")?;
  let amount = args.amount("amount")?;
  store.set_opening_balance(amount).await.map_err(store_err)?;
  Ok(format!("opening balance set to {amount:.2}"))
}
