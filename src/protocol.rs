//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagram::DiagramView;
use crate::domain::{AnswerKind, ModuleId};
use crate::electrons::SpinSlot;
use crate::score::ScoreState;
use crate::session::{LearnerAnswer, QuestionView, SessionEvent};
use crate::settings::ModuleSettings;

/// Learner actions, shared by `POST /api/v1/sessions/:id/actions` and the WebSocket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    Ping,
    Next,
    SetMode {
        mode: String,
    },
    SetDifficulty {
        difficulty: String,
    },
    PlaceElectron {
        token: String,
        orbital: String,
        slot: SpinSlot,
    },
    RemoveElectron {
        token: String,
    },
    /// Move the ordering item at `index` one place earlier.
    MoveItemUp {
        index: usize,
    },
    Submit {
        answer: LearnerAnswer,
    },
    Skip,
    Reset,
    ToggleAdaptive,
    SetRigor {
        enabled: bool,
    },
    ToggleLabels,
    CycleColorMode,
    ToggleOverlap,
}

/// Messages the server sends back over WebSocket (and as action responses).
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Pong,
    Events { events: Vec<SessionEvent> },
    Error { message: String },
}

#[derive(Debug, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    pub module: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ModeOut {
    pub key: &'static str,
    pub kind: AnswerKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOut {
    pub module: ModuleId,
    pub settings_key: &'static str,
    pub modes: Vec<ModeOut>,
    pub mastery_streak: u32,
    pub mastery_min_attempts: u32,
    pub questions: usize,
}

#[derive(Debug, Deserialize)]
pub struct OpenSessionIn {
    pub module: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionOut {
    pub session_id: Uuid,
    pub events: Vec<SessionEvent>,
}

#[derive(Debug, Serialize)]
pub struct EventsOut {
    pub events: Vec<SessionEvent>,
}

/// Current state of a session, for reconnecting clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub module: ModuleId,
    pub mode: String,
    pub settings: ModuleSettings,
    pub score: ScoreState,
    pub locked: bool,
    pub question: Option<QuestionView>,
    pub diagram: Option<DiagramView>,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}
