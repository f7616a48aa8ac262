//! Core behaviors shared by both HTTP and WebSocket handlers: mapping a
//! client action onto the session operation that implements it.

use rand::Rng;
use tracing::{debug, instrument};

use crate::error::CoreError;
use crate::protocol::{ClientAction, ServerMessage};
use crate::session::Session;

/// Apply one learner action. `Ping` never touches the session.
#[instrument(level = "debug", skip(session), fields(module = %session.module()))]
pub fn dispatch<R: Rng>(session: &mut Session<R>, action: ClientAction) -> Result<ServerMessage, CoreError> {
  let events = match action {
    ClientAction::Ping => return Ok(ServerMessage::Pong),
    ClientAction::Next => session.next_question(),
    ClientAction::SetMode { mode } => session.set_mode(&mode)?,
    ClientAction::SetDifficulty { difficulty } => session.set_difficulty(&difficulty),
    ClientAction::PlaceElectron { token, orbital, slot } => session.place_electron(&token, &orbital, slot),
    ClientAction::RemoveElectron { token } => session.remove_electron(&token),
    ClientAction::MoveItemUp { index } => session.move_in_order(index),
    ClientAction::Submit { answer } => session.submit(answer)?,
    ClientAction::Skip => session.skip(),
    ClientAction::Reset => session.reset(),
    ClientAction::ToggleAdaptive => session.toggle_adaptive(),
    ClientAction::SetRigor { enabled } => session.set_rigor(enabled),
    ClientAction::ToggleLabels => session.toggle_scaffold(),
    ClientAction::CycleColorMode => session.cycle_color_mode(),
    ClientAction::ToggleOverlap => session.toggle_overlap(),
  };
  debug!(target: "session", count = events.len(), "Action produced events");
  Ok(ServerMessage::Events { events })
}

/// Same as `dispatch` but folds errors into an error message for the wire.
pub fn dispatch_or_error<R: Rng>(session: &mut Session<R>, action: ClientAction) -> ServerMessage {
  dispatch(session, action).unwrap_or_else(|e| ServerMessage::Error { message: e.to_string() })
}
