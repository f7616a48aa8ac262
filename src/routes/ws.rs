//! WebSocket upgrade + message loop. Each connection owns one practice session;
//! every client message is parsed as a `ClientAction` and we reply with a single
//! JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    Query, State, WebSocketUpgrade,
  },
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::ModuleId;
use crate::logic::dispatch_or_error;
use crate::protocol::{ClientAction, ErrorOut, ServerMessage, WsParams};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state), fields(module = ?params.module))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
  Query(params): Query<WsParams>,
) -> Response {
  let module = match params.module.as_deref().map(ModuleId::parse) {
    None => ModuleId::Naming,
    Some(Ok(m)) => m,
    Some(Err(e)) => {
      warn!(target: "ligand_trainer", error = %e, "WebSocket upgrade rejected");
      return (StatusCode::BAD_REQUEST, Json(ErrorOut { error: e.to_string() })).into_response();
    }
  };
  info!(target: "ligand_trainer", %module, "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, module))
}

fn encode(msg: &ServerMessage) -> String {
  serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, module: ModuleId) {
  info!(target: "ligand_trainer", "WebSocket connected");
  let mut session = state.new_session(module);

  let opening = ServerMessage::Events { events: session.next_question() };
  if let Err(e) = socket.send(Message::Text(encode(&opening))).await {
    error!(target: "ligand_trainer", error = %e, "WS send error");
    return;
  }

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientAction>(&txt) {
          Ok(action) => {
            debug!(target: "session", "WS received: {:?}", &action);
            dispatch_or_error(&mut session, action)
          }
          Err(e) => ServerMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        if let Err(e) = socket.send(Message::Text(encode(&reply_msg))).await {
          error!(target: "ligand_trainer", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "ligand_trainer", score = ?session.score(), "WebSocket disconnected");
}
