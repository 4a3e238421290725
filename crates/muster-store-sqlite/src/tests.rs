//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use muster_core::{
  catalog::{LookupKind, Skill, Weapon, WeaponCategory},
  ledger::{
    AggregateQuery, EntryPatch, LedgerKind, LedgerValue, NewEntry,
    OPENING_BALANCE_LOG_ID, RecentQuery,
  },
  member::Member,
  store::GuildStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Store with members 1 "alona", 2 "bram", 7 "greta" already on the roster.
async fn store_with_roster() -> SqliteStore {
  let s = store().await;
  s.upsert_members(vec![
    Member::new(1, "alona"),
    Member::new(2, "bram"),
    Member::new(7, "greta"),
  ])
  .await
  .unwrap();
  s
}

fn day(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn skill_entry(member: i64, skill: Skill, level: i64, date: &str) -> NewEntry {
  NewEntry {
    member_id:  member,
    subject_id: Some(skill.id()),
    value:      LedgerValue::Level(level),
    date:       Some(day(date)),
    note:       None,
  }
}

fn bank_entry(member: i64, amount: f64) -> NewEntry {
  NewEntry {
    member_id:  member,
    subject_id: None,
    value:      LedgerValue::Amount(amount),
    date:       None,
    note:       None,
  }
}

// ─── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn roster_upsert_and_read_back() {
  let s = store().await;
  s.upsert_members(vec![Member::new(10, "ada"), Member::new(11, "brin")])
    .await
    .unwrap();

  let members = s.list_members().await.unwrap();
  assert_eq!(members, vec![Member::new(10, "ada"), Member::new(11, "brin")]);
}

#[tokio::test]
async fn roster_resync_overwrites_names() {
  let s = store().await;
  s.upsert_members(vec![Member::new(10, "ada")]).await.unwrap();
  s.upsert_members(vec![Member::new(10, "ada the brave"), Member::new(11, "brin")])
    .await
    .unwrap();

  let members = s.list_members().await.unwrap();
  assert_eq!(members.len(), 2);
  assert_eq!(members[0].name, "ada the brave");
}

#[tokio::test]
async fn repeated_id_in_one_sync_takes_latest_name() {
  let s = store().await;
  s.upsert_members(vec![Member::new(10, "old"), Member::new(10, "new")])
    .await
    .unwrap();

  let member = s.get_member(10).await.unwrap().unwrap();
  assert_eq!(member.name, "new");
}

#[tokio::test]
async fn delete_member_missing_errors() {
  let s = store().await;
  let err = s.delete_member(404).await.unwrap_err();
  assert!(matches!(err, Error::MemberNotFound(404)));
}

#[tokio::test]
async fn delete_member_leaves_ledger_rows() {
  let s = store_with_roster().await;
  let entry = s
    .insert_entry(LedgerKind::SkillLevel, skill_entry(1, Skill::Mining, 30, "2026-01-05"))
    .await
    .unwrap();
  s.insert_entry(LedgerKind::Bank, bank_entry(1, 75.0)).await.unwrap();

  // Declared foreign keys must not block this: the rows become soft-orphans.
  s.delete_member(1).await.unwrap();
  assert!(s.get_member(1).await.unwrap().is_none());

  // The historical row survives as a soft-orphan and stays in aggregates.
  let kept = s
    .get_entry(LedgerKind::SkillLevel, entry.log_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(kept.member_id, Some(1));

  let rows = s
    .aggregate(
      LedgerKind::SkillLevel,
      AggregateQuery { subject_id: Some(Skill::Mining.id()), ..Default::default() },
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
}

// ─── Lookup seeding ──────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_seeded_once() {
  let s = store().await;
  assert_eq!(s.list_subjects(LookupKind::Weapon).await.unwrap().len(), 17);
  assert_eq!(s.list_subjects(LookupKind::Skill).await.unwrap().len(), 17);

  let skills = s.list_subjects(LookupKind::Skill).await.unwrap();
  assert_eq!(skills[7].subject_id, Skill::Smelting.id());
  assert_eq!(skills[7].name, "smelting");
}

#[tokio::test]
async fn reopening_does_not_duplicate_seed_rows() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("muster.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.set_opening_balance(500.0).await.unwrap();
    assert_eq!(s.list_subjects(LookupKind::Weapon).await.unwrap().len(), 17);
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.list_subjects(LookupKind::Weapon).await.unwrap().len(), 17);
  assert_eq!(s.list_subjects(LookupKind::Skill).await.unwrap().len(), 17);
  // Re-seeding must not clobber the opening balance either.
  assert!((s.balance().await.unwrap() - 500.0).abs() < 1e-9);
}

#[tokio::test]
async fn add_subject_beyond_catalog() {
  let s = store().await;
  let id = s
    .add_subject(
      LookupKind::Weapon,
      "greatsword".into(),
      WeaponCategory::TwoHanded as i64,
    )
    .await
    .unwrap();
  assert!(id > Weapon::Pistol.id());

  let weapons = s.list_subjects(LookupKind::Weapon).await.unwrap();
  assert_eq!(weapons.len(), 18);
  assert_eq!(weapons.last().unwrap().name, "greatsword");
}

#[tokio::test]
async fn add_subject_duplicate_name_errors() {
  let s = store().await;
  let err = s
    .add_subject(LookupKind::Skill, "smelting".into(), 1)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateName(LookupKind::Skill, ref n) if n == "smelting"));
}

#[tokio::test]
async fn add_subject_missing_category_errors() {
  let s = store().await;
  let err = s
    .add_subject(LookupKind::Weapon, "chair leg".into(), 99)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CategoryNotFound(LookupKind::Weapon, 99)));
}

// ─── Ledger writes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_then_recent_returns_the_row() {
  let s = store_with_roster().await;
  let inserted = s
    .insert_entry(LedgerKind::SkillLevel, skill_entry(1, Skill::Smelting, 12, "2026-02-01"))
    .await
    .unwrap();

  let rows = s
    .recent_entries(LedgerKind::SkillLevel, RecentQuery::latest(1))
    .await
    .unwrap();
  assert_eq!(rows, vec![inserted]);
  assert_eq!(rows[0].value, LedgerValue::Level(12));
  assert_eq!(rows[0].subject_id, Some(Skill::Smelting.id()));
}

#[tokio::test]
async fn insert_defaults_date_to_today() {
  let s = store_with_roster().await;
  let entry = s
    .insert_entry(
      LedgerKind::CharacterLevel,
      NewEntry::new(1, LedgerValue::Level(60)),
    )
    .await
    .unwrap();
  assert_eq!(entry.date, chrono::Utc::now().date_naive());
}

#[tokio::test]
async fn insert_unknown_member_errors() {
  let s = store().await;
  let err = s
    .insert_entry(LedgerKind::CharacterLevel, NewEntry::new(404, LedgerValue::Level(1)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MemberNotFound(404)));
}

#[tokio::test]
async fn insert_unknown_subject_errors() {
  let s = store_with_roster().await;
  let mut entry = NewEntry::new(1, LedgerValue::Level(5));
  entry.subject_id = Some(999);
  let err = s.insert_entry(LedgerKind::WeaponLevel, entry).await.unwrap_err();
  assert!(matches!(err, Error::SubjectNotFound(LookupKind::Weapon, 999)));
}

#[tokio::test]
async fn insert_without_subject_on_subject_ledger_errors() {
  let s = store_with_roster().await;
  let err = s
    .insert_entry(LedgerKind::WeaponLevel, NewEntry::new(1, LedgerValue::Level(5)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubjectRequired(LedgerKind::WeaponLevel)));
}

#[tokio::test]
async fn empty_patch_is_a_noop() {
  let s = store_with_roster().await;
  let entry = s
    .insert_entry(LedgerKind::SkillLevel, skill_entry(1, Skill::Cooking, 7, "2026-03-01"))
    .await
    .unwrap();

  s.patch_entry(LedgerKind::SkillLevel, entry.log_id, EntryPatch::default())
    .await
    .unwrap();
  // An empty patch on a missing row is also fine: no write, no check.
  s.patch_entry(LedgerKind::SkillLevel, 9999, EntryPatch::default())
    .await
    .unwrap();

  let unchanged = s
    .get_entry(LedgerKind::SkillLevel, entry.log_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(unchanged, entry);
}

#[tokio::test]
async fn patch_overwrites_only_supplied_fields() {
  let s = store_with_roster().await;
  let entry = s
    .insert_entry(LedgerKind::SkillLevel, skill_entry(1, Skill::Fishing, 20, "2026-03-01"))
    .await
    .unwrap();

  s.patch_entry(
    LedgerKind::SkillLevel,
    entry.log_id,
    EntryPatch { value: Some(LedgerValue::Level(25)), ..Default::default() },
  )
  .await
  .unwrap();

  let patched = s
    .get_entry(LedgerKind::SkillLevel, entry.log_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(patched.value, LedgerValue::Level(25));
  assert_eq!(patched.date, entry.date);
  assert_eq!(patched.subject_id, entry.subject_id);
}

#[tokio::test]
async fn patch_missing_row_errors() {
  let s = store_with_roster().await;
  let err = s
    .patch_entry(
      LedgerKind::CharacterLevel,
      404,
      EntryPatch { value: Some(LedgerValue::Level(1)), ..Default::default() },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EntryNotFound(LedgerKind::CharacterLevel, 404)));
}

#[tokio::test]
async fn delete_then_everything_reports_not_found() {
  let s = store_with_roster().await;
  let entry = s
    .insert_entry(LedgerKind::CharacterLevel, NewEntry::new(2, LedgerValue::Level(44)))
    .await
    .unwrap();

  s.delete_entry(LedgerKind::CharacterLevel, entry.log_id).await.unwrap();

  assert!(s
    .get_entry(LedgerKind::CharacterLevel, entry.log_id)
    .await
    .unwrap()
    .is_none());
  let err = s
    .delete_entry(LedgerKind::CharacterLevel, entry.log_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EntryNotFound(LedgerKind::CharacterLevel, _)));
}

#[tokio::test]
async fn opening_balance_row_cannot_be_deleted() {
  let s = store().await;
  let err = s
    .delete_entry(LedgerKind::Bank, OPENING_BALANCE_LOG_ID)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Reserved(OPENING_BALANCE_LOG_ID)));
}

// ─── Bank ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn balance_is_a_running_sum_over_the_seed_row() {
  let s = store_with_roster().await;
  s.set_opening_balance(28500.13).await.unwrap();
  s.insert_entry(LedgerKind::Bank, bank_entry(1, 100.0)).await.unwrap();
  s.insert_entry(LedgerKind::Bank, bank_entry(2, -50.0)).await.unwrap();

  let balance = s.balance().await.unwrap();
  assert!((balance - 28550.13).abs() < 1e-9, "balance was {balance}");
}

#[tokio::test]
async fn set_opening_balance_updates_in_place() {
  let s = store().await;
  s.set_opening_balance(1000.0).await.unwrap();
  s.set_opening_balance(2000.0).await.unwrap();

  let seed = s
    .get_entry(LedgerKind::Bank, OPENING_BALANCE_LOG_ID)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(seed.value, LedgerValue::Amount(2000.0));
  assert_eq!(seed.member_id, None);
  assert!((s.balance().await.unwrap() - 2000.0).abs() < 1e-9);
}

#[tokio::test]
async fn bank_note_round_trips() {
  let s = store_with_roster().await;
  let mut entry = bank_entry(1, -320.5);
  entry.note = Some("war supplies".into());
  let inserted = s.insert_entry(LedgerKind::Bank, entry).await.unwrap();

  let fetched = s
    .get_entry(LedgerKind::Bank, inserted.log_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.note.as_deref(), Some("war supplies"));
  assert_eq!(fetched.value, LedgerValue::Amount(-320.5));
}

// ─── Recent queries ──────────────────────────────────────────────────────────

async fn seeded_skill_rows(s: &SqliteStore) {
  // member 1: smelting 10 then 15; member 2: smelting 12; member 7: mining 40
  for entry in [
    skill_entry(1, Skill::Smelting, 10, "2026-01-01"),
    skill_entry(1, Skill::Smelting, 15, "2026-01-08"),
    skill_entry(2, Skill::Smelting, 12, "2026-01-05"),
    skill_entry(7, Skill::Mining, 40, "2026-01-03"),
  ] {
    s.insert_entry(LedgerKind::SkillLevel, entry).await.unwrap();
  }
}

#[tokio::test]
async fn recent_global_is_ordered_by_date_descending() {
  let s = store_with_roster().await;
  seeded_skill_rows(&s).await;

  let rows = s
    .recent_entries(LedgerKind::SkillLevel, RecentQuery::latest(10))
    .await
    .unwrap();
  assert_eq!(rows.len(), 4);
  let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
  let mut sorted = dates.clone();
  sorted.sort_by(|a, b| b.cmp(a));
  assert_eq!(dates, sorted);
  assert_eq!(rows[0].value, LedgerValue::Level(15));
}

#[tokio::test]
async fn recent_member_and_pair_filters() {
  let s = store_with_roster().await;
  seeded_skill_rows(&s).await;

  let member_only = s
    .recent_entries(
      LedgerKind::SkillLevel,
      RecentQuery { member_id: Some(1), limit: 10, ..Default::default() },
    )
    .await
    .unwrap();
  assert_eq!(member_only.len(), 2);
  assert!(member_only.iter().all(|r| r.member_id == Some(1)));

  let pair = s
    .recent_entries(
      LedgerKind::SkillLevel,
      RecentQuery {
        member_id:  Some(1),
        subject_id: Some(Skill::Smelting.id()),
        limit:      1,
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(pair.len(), 1);
  assert_eq!(pair[0].value, LedgerValue::Level(15));
}

#[tokio::test]
async fn recent_best_per_member_ranks_by_value() {
  let s = store_with_roster().await;
  seeded_skill_rows(&s).await;

  let best = s
    .recent_entries(
      LedgerKind::SkillLevel,
      RecentQuery {
        subject_id:      Some(Skill::Smelting.id()),
        limit:           10,
        best_per_member: true,
        ..Default::default()
      },
    )
    .await
    .unwrap();

  // One row per member, strongest first; member 1's lower row is dropped.
  assert_eq!(best.len(), 2);
  assert_eq!(best[0].member_id, Some(1));
  assert_eq!(best[0].value, LedgerValue::Level(15));
  assert_eq!(best[1].member_id, Some(2));
}

#[tokio::test]
async fn subject_filter_on_subjectless_ledger_is_empty() {
  let s = store_with_roster().await;
  s.insert_entry(LedgerKind::CharacterLevel, NewEntry::new(1, LedgerValue::Level(3)))
    .await
    .unwrap();

  let rows = s
    .recent_entries(
      LedgerKind::CharacterLevel,
      RecentQuery { subject_id: Some(1), limit: 10, ..Default::default() },
    )
    .await
    .unwrap();
  assert!(rows.is_empty());
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn aggregate_returns_current_level_for_a_pair() {
  let s = store_with_roster().await;
  s.insert_entry(LedgerKind::SkillLevel, skill_entry(7, Skill::Smelting, 10, "2026-01-01"))
    .await
    .unwrap();
  s.insert_entry(LedgerKind::SkillLevel, skill_entry(7, Skill::Smelting, 15, "2026-01-09"))
    .await
    .unwrap();

  let rows = s
    .aggregate(
      LedgerKind::SkillLevel,
      AggregateQuery {
        member_id:  Some(7),
        subject_id: Some(Skill::Smelting.id()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].value, LedgerValue::Level(15));
}

#[tokio::test]
async fn aggregate_per_subject_for_one_member() {
  let s = store_with_roster().await;
  seeded_skill_rows(&s).await;
  s.insert_entry(LedgerKind::SkillLevel, skill_entry(1, Skill::Mining, 8, "2026-01-02"))
    .await
    .unwrap();

  let rows = s
    .aggregate(
      LedgerKind::SkillLevel,
      AggregateQuery { member_id: Some(1), ..Default::default() },
    )
    .await
    .unwrap();

  // One row per skill the member has logged, in subject order.
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].subject_id, Some(Skill::Smelting.id()));
  assert_eq!(rows[0].value, LedgerValue::Level(15));
  assert_eq!(rows[1].subject_id, Some(Skill::Mining.id()));
  assert_eq!(rows[1].value, LedgerValue::Level(8));
}

#[tokio::test]
async fn aggregate_leaderboard_orders_and_limits() {
  let s = store_with_roster().await;
  seeded_skill_rows(&s).await;

  let rows = s
    .aggregate(
      LedgerKind::SkillLevel,
      AggregateQuery {
        subject_id: Some(Skill::Smelting.id()),
        limit:      Some(1),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].member_id, Some(1));
  assert_eq!(rows[0].value, LedgerValue::Level(15));
}

#[tokio::test]
async fn aggregate_ties_resolve_to_lowest_log_id() {
  let s = store_with_roster().await;
  let first = s
    .insert_entry(LedgerKind::SkillLevel, skill_entry(1, Skill::Weaving, 30, "2026-01-01"))
    .await
    .unwrap();
  s.insert_entry(LedgerKind::SkillLevel, skill_entry(1, Skill::Weaving, 30, "2026-01-20"))
    .await
    .unwrap();

  let rows = s
    .aggregate(
      LedgerKind::SkillLevel,
      AggregateQuery {
        member_id:  Some(1),
        subject_id: Some(Skill::Weaving.id()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].log_id, first.log_id);
}
