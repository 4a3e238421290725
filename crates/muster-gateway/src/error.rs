//! Gateway error type and [`axum::response::IntoResponse`] implementation.
//!
//! Only transport-level rejections live here. Once a request is
//! authenticated and its guild accepted, every command outcome — including
//! validation and permission failures — is a 200 with user-visible text.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing or invalid bearer token")]
  Unauthorized,

  #[error("guild {0} is not on the allow-list")]
  UnknownGuild(i64),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match self {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::UnknownGuild(_) => StatusCode::FORBIDDEN,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
