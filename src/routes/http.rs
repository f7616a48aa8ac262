//! HTTP endpoint handlers. These are thin wrappers that forward to the session layer.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::ModuleId;
use crate::error::CoreError;
use crate::logic::dispatch;
use crate::protocol::*;
use crate::state::AppState;

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
  (status, Json(ErrorOut { error: error.into() })).into_response()
}

fn status_for(e: &CoreError) -> StatusCode {
  match e {
    CoreError::UnknownModule(_) | CoreError::UnknownMode { .. } => StatusCode::BAD_REQUEST,
    CoreError::NoActiveQuestion | CoreError::EmptyPool { .. } => StatusCode::CONFLICT,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_modules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let modules: Vec<ModuleOut> = ModuleId::ALL
    .iter()
    .map(|&module| {
      let profile = module.profile();
      let questions = profile.modes.iter().map(|m| state.library.pool(module, m.key).len()).sum();
      ModuleOut {
        module,
        settings_key: profile.settings_key,
        modes: profile.modes.iter().map(|m| ModeOut { key: m.key, kind: m.kind }).collect(),
        mastery_streak: profile.mastery.streak,
        mastery_min_attempts: profile.mastery.min_attempts,
        questions,
      }
    })
    .collect();
  info!(target: "ligand_trainer", count = modules.len(), "HTTP modules listed");
  Json(modules)
}

#[instrument(level = "info", skip(state, body), fields(module = %body.module))]
pub async fn http_open_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<OpenSessionIn>,
) -> Response {
  match state.open_session(&body.module).await {
    Ok((session_id, events)) => {
      info!(target: "session", %session_id, events = events.len(), "HTTP session opened");
      (StatusCode::CREATED, Json(OpenSessionOut { session_id, events })).into_response()
    }
    Err(e) => {
      warn!(target: "session", error = %e, "HTTP session open rejected");
      error_response(status_for(&e), e.to_string())
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_session_snapshot(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Response {
  match state.snapshot(id).await {
    Some(snapshot) => Json(snapshot).into_response(),
    None => error_response(StatusCode::NOT_FOUND, format!("unknown session: {id}")),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_close_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Response {
  if state.close_session(id).await {
    StatusCode::NO_CONTENT.into_response()
  } else {
    error_response(StatusCode::NOT_FOUND, format!("unknown session: {id}"))
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_session_action(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  Json(action): Json<ClientAction>,
) -> Response {
  match state.with_session(id, |session| dispatch(session, action)).await {
    None => error_response(StatusCode::NOT_FOUND, format!("unknown session: {id}")),
    Some(Ok(reply)) => Json(reply).into_response(),
    Some(Err(e)) => {
      warn!(target: "session", %id, error = %e, "HTTP action rejected");
      error_response(status_for(&e), e.to_string())
    }
  }
}
