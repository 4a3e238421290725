//! The fixed game-content catalog: weapon and skill lookup enumerations.
//!
//! These enums are the source of truth for the lookup tables. The store
//! seeds its `weapons` / `skills` / `*_categories` tables from them at every
//! open (insert-or-ignore, so re-seeding is a no-op), and the subject →
//! category mapping is a plain method here — immutable configuration, not
//! data. Discriminants are the row IDs; they must never be renumbered once a
//! database exists.
//!
//! Administrative additions beyond the catalog (a new weapon patched into
//! the game) go through [`crate::store::GuildStore::add_subject`] and get
//! IDs above the catalog range.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr};

/// Row ID in a lookup table (weapon or skill).
pub type SubjectId = i64;

/// Which of the two subject lookup tables a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
  Weapon,
  Skill,
}

impl LookupKind {
  /// Human label used in error messages and table headers.
  pub fn label(self) -> &'static str {
    match self {
      Self::Weapon => "weapon",
      Self::Skill => "skill",
    }
  }
}

impl std::fmt::Display for LookupKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

// ─── Weapons ─────────────────────────────────────────────────────────────────

/// Broad handling class of a weapon.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumIter, EnumString, FromRepr,
)]
#[repr(i64)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WeaponCategory {
  OneHanded = 1,
  TwoHanded = 2,
  Ranged    = 3,
  Magic     = 4,
}

/// Every weapon currently in the game.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumIter, EnumString, FromRepr,
)]
#[repr(i64)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Weapon {
  Rapier       = 1,
  Sword        = 2,
  Hatchet      = 3,
  WarHammer    = 4,
  BattleAxe    = 5,
  Spear        = 6,
  Bow          = 7,
  Musket       = 8,
  FireStaff    = 9,
  LifeStaff    = 10,
  IceGauntlet  = 11,
  VoidGauntlet = 12,
  Blunderbuss  = 13,
  Dagger       = 14,
  Club         = 15,
  GreatClub    = 16,
  Pistol       = 17,
}

impl Weapon {
  pub fn id(self) -> SubjectId { self as SubjectId }

  pub fn category(self) -> WeaponCategory {
    use Weapon::*;
    match self {
      Rapier | Sword | Hatchet | Club | Dagger => WeaponCategory::OneHanded,
      WarHammer | BattleAxe | Spear | GreatClub => WeaponCategory::TwoHanded,
      Bow | Musket | Blunderbuss | Pistol => WeaponCategory::Ranged,
      FireStaff | LifeStaff | IceGauntlet | VoidGauntlet => {
        WeaponCategory::Magic
      }
    }
  }
}

// ─── Skills ──────────────────────────────────────────────────────────────────

/// Broad class of a trade skill.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumIter, EnumString, FromRepr,
)]
#[repr(i64)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SkillCategory {
  Refining  = 1,
  Gathering = 2,
  Crafting  = 3,
}

/// Every trade skill currently in the game.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumIter, EnumString, FromRepr,
)]
#[repr(i64)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Skill {
  Weaponsmithing = 1,
  Armoring       = 2,
  Engineering    = 3,
  Jewelcrafting  = 4,
  Arcana         = 5,
  Cooking        = 6,
  Furnishing     = 7,
  Smelting       = 8,
  Woodworking    = 9,
  Leatherworking = 10,
  Weaving        = 11,
  Stonecutting   = 12,
  Logging        = 13,
  Mining         = 14,
  Fishing        = 15,
  Harvesting     = 16,
  Tracking       = 17,
}

impl Skill {
  pub fn id(self) -> SubjectId { self as SubjectId }

  pub fn category(self) -> SkillCategory {
    use Skill::*;
    match self {
      Smelting | Woodworking | Leatherworking | Weaving | Stonecutting => {
        SkillCategory::Refining
      }
      Logging | Mining | Fishing | Harvesting | Tracking => {
        SkillCategory::Gathering
      }
      Weaponsmithing | Armoring | Engineering | Jewelcrafting | Arcana
      | Cooking | Furnishing => SkillCategory::Crafting,
    }
  }
}

// ─── Lookup rows ─────────────────────────────────────────────────────────────

/// One row of a subject lookup table as stored. Covers both seeded catalog
/// entries and administrative additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
  pub subject_id:  SubjectId,
  pub category_id: i64,
  pub name:        String,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn every_weapon_has_a_category() {
    // Exhaustiveness is enforced by the match; this pins the counts so a
    // catalog edit that renumbers rows is caught loudly.
    assert_eq!(Weapon::iter().count(), 17);
    assert_eq!(WeaponCategory::iter().count(), 4);
    for w in Weapon::iter() {
      let _ = w.category();
    }
  }

  #[test]
  fn every_skill_has_a_category() {
    assert_eq!(Skill::iter().count(), 17);
    assert_eq!(SkillCategory::iter().count(), 3);
    assert_eq!(
      Skill::iter()
        .filter(|s| s.category() == SkillCategory::Refining)
        .count(),
      5
    );
    assert_eq!(
      Skill::iter()
        .filter(|s| s.category() == SkillCategory::Gathering)
        .count(),
      5
    );
    assert_eq!(
      Skill::iter()
        .filter(|s| s.category() == SkillCategory::Crafting)
        .count(),
      7
    );
  }

  #[test]
  fn ids_are_stable_and_dense() {
    let ids: Vec<i64> = Skill::iter().map(Skill::id).collect();
    assert_eq!(ids, (1..=17).collect::<Vec<_>>());
    assert_eq!(Weapon::from_repr(4), Some(Weapon::WarHammer));
    assert_eq!(Weapon::from_repr(99), None);
  }

  #[test]
  fn names_parse_back() {
    assert_eq!("smelting".parse::<Skill>().unwrap(), Skill::Smelting);
    assert_eq!("fire-staff".parse::<Weapon>().unwrap(), Weapon::FireStaff);
    assert_eq!(Weapon::VoidGauntlet.to_string(), "void-gauntlet");
    assert!("axe".parse::<Weapon>().is_err());
  }
}
