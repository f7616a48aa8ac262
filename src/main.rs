//! Ligand Trainer · coordination chemistry practice backend
//!
//! - Axum HTTP + WebSocket API over six practice modules
//!   (naming, coordination, bonding, isomerism, reactions, solids)
//! - Crystal-field orbital builder with high/low-spin grading
//! - Adaptive remediation and a sticky mastery gate per module
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   CONTENT_PATH  : path to a TOML question bank merged over the built-in seeds
//!   SETTINGS_DIR  : directory for per-module settings snapshots (default ./.settings)
//!   MAX_SESSIONS  : open HTTP sessions kept before the least recently used is evicted (default 1024)
//!   LOG_LEVEL     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT    : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use ligand_trainer::routes::build_router;
use ligand_trainer::state::AppState;
use ligand_trainer::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let state = Arc::new(AppState::new());
  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "ligand_trainer", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
