//! HTTP boundary for the guild ledgers.
//!
//! Exposes an axum [`Router`] with one command endpoint backed by any
//! [`GuildStore`]. The chat-platform integration POSTs already-parsed
//! commands here; transport concerns (bearer token, guild allow-list) are
//! the only failures that surface as HTTP errors — everything past them is a
//! 200 whose text mirrors what a chat reply would say.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::State,
  http::HeaderMap,
  routing::{get, post},
};
use muster_commands::CommandRequest;
use muster_core::store::GuildStore;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use auth::verify_bearer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` plus the
/// `MUSTER_*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Shared secret the chat integration presents as a bearer token.
  pub auth_token: String,
  /// Guilds this instance serves; commands for any other guild are refused.
  pub guild_ids:  Vec<i64>,
  pub store_path: PathBuf,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the axum handlers.
#[derive(Clone)]
pub struct AppState<S: GuildStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  /// Flipped by the `close` command; the binary drains and exits.
  pub shutdown: watch::Sender<bool>,
}

// ─── Wire shapes ─────────────────────────────────────────────────────────────

/// Body of `POST /v1/command`.
#[derive(Debug, Deserialize)]
pub struct CommandEnvelope {
  pub guild_id: i64,
  #[serde(flatten)]
  pub command:  CommandRequest,
}

/// Body of every authorized command response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandReply {
  pub text: String,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the gateway [`Router`] for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: GuildStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/healthz", get(healthz))
    .route("/v1/command", post(command::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn healthz() -> &'static str {
  "ok"
}

/// `POST /v1/command` — authenticate, check the guild allow-list, dispatch.
async fn command<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(envelope): Json<CommandEnvelope>,
) -> Result<Json<CommandReply>, Error>
where
  S: GuildStore + Clone + Send + Sync + 'static,
{
  verify_bearer(&headers, &state.config.auth_token)?;
  if !state.config.guild_ids.contains(&envelope.guild_id) {
    return Err(Error::UnknownGuild(envelope.guild_id));
  }

  let response =
    muster_commands::dispatch(state.store.as_ref(), &envelope.command).await;
  if response.shutdown {
    // Nobody listening means the binary is not serving; nothing to drain.
    let _ = state.shutdown.send(true);
  }
  Ok(Json(CommandReply { text: response.text }))
}

// ─── Integration tests ───────────────────────────────────────────────────────
