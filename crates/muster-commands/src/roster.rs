//! Roster commands: `roster-sync`, `roster-remove`, `roster`.

use muster_core::{
  member::{Member, MemberId},
  store::GuildStore,
};

use crate::{
  CommandError, args::Args, error::store_err, require_elevated,
  table::TextTable,
};

/// `roster-sync` — bulk upsert from paired `ids` / `names` lists. Elevated
/// only; this rewrites other members' display names.
pub async fn sync<S: GuildStore>(
  store: &S,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  require_elevated(elevated, "roster-sync")?;

  let ids = args.id_list("ids")?;
  let names = args.name_list("names")?;
  if ids.len() != names.len() {
    return Err(CommandError::validation(format!(
      "`ids` and `names` must pair up, got {} ids and {} names",
      ids.len(),
      names.len(),
    )));
  }

  let count = ids.len();
  let roster = ids
    .into_iter()
    .zip(names)
    .map(|(id, name)| Member::new(id, name))
    .collect();
  store.upsert_members(roster).await.map_err(store_err)?;

  Ok(format!("roster synced: {count} members"))
}

/// `roster-remove` — drop one member. Members may remove themselves;
/// removing anyone else needs the elevated role. Their ledger history stays.
pub async fn remove<S: GuildStore>(
  store: &S,
  actor: MemberId,
  elevated: bool,
  args: Args<'_>,
) -> Result<String, CommandError> {
  let id = args.integer("id")?;
  if id != actor {
    require_elevated(elevated, "roster-remove")?;
  }

  let name = crate::member_name(store, id).await?;
  store.delete_member(id).await.map_err(store_err)?;
  Ok(format!("removed {name} from the roster"))
}

/// `roster` — the member directory as a table.
pub async fn list<S: GuildStore>(store: &S) -> Result<String, CommandError> {
  let members = store.list_members().await.map_err(store_err)?;
  if members.is_empty() {
    return Ok("the roster is empty".to_string());
  }

  let mut table = TextTable::new(["id", "name"]);
  for member in members {
    table.row([member.member_id.to_string(), member.name]);
  }
  Ok(table.render())
}
