//! Member — the guild roster entry every ledger row hangs off.
//!
//! Identity is assigned by the chat platform, not by this system. The roster
//! is synced in bulk, so members are modelled as idempotent upserts keyed by
//! that external ID.

use serde::{Deserialize, Serialize};

/// Externally assigned chat-platform user ID. Stable for the life of the
/// account; used as the primary key everywhere.
pub type MemberId = i64;

/// One roster entry. The display name is overwritten on every re-sync; the
/// ID never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub member_id: MemberId,
  pub name:      String,
}

impl Member {
  pub fn new(member_id: MemberId, name: impl Into<String>) -> Self {
    Self { member_id, name: name.into() }
  }
}
