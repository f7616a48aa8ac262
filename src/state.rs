//! Application state: the shared content library, the settings store, and the
//! in-memory table of open HTTP sessions.
//!
//! This module owns:
//!   - the content library (geometry registry + question pools), read-only
//!   - the settings store every session writes through to
//!   - sessions opened over HTTP, keyed by a random id; at most `max_sessions`
//!     are kept, the least recently used one is evicted to make room
//!
//! WebSocket connections own their session directly and never register here.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::content::ContentLibrary;
use crate::domain::ModuleId;
use crate::error::CoreError;
use crate::protocol::SessionSnapshot;
use crate::session::{Session, SessionEvent};
use crate::settings::{FileSettingsStore, SettingsStore};

pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// A registered HTTP session and the tick of its last use.
pub struct SessionEntry {
    pub session: Session<StdRng>,
    touched: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<ContentLibrary>,
    pub store: Arc<dyn SettingsStore>,
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    pub max_sessions: usize,
    clock: Arc<AtomicU64>,
}

impl AppState {
    /// Build state from env: content bank, settings directory.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let library = ContentLibrary::from_env();
        let store = FileSettingsStore::from_env();
        info!(
            target: "ligand_trainer",
            questions = library.len(),
            geometries = ?library.registry().names(),
            settings_dir = %store.dir().display(),
            "Application state ready"
        );
        let max_sessions = std::env::var("MAX_SESSIONS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_SESSIONS);
        Self::with_parts(library, Arc::new(store)).with_max_sessions(max_sessions)
    }

    pub fn with_parts(library: ContentLibrary, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            library: Arc::new(library),
            store,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: DEFAULT_MAX_SESSIONS,
            clock: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max.max(1);
        self
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// A fresh session with an entropy-seeded random source.
    pub fn new_session(&self, module: ModuleId) -> Session<StdRng> {
        Session::open(
            module,
            Arc::clone(&self.library),
            Arc::clone(&self.store),
            StdRng::from_entropy(),
        )
    }

    /// Open a session, present its first question and register it.
    #[instrument(level = "info", skip(self))]
    pub async fn open_session(&self, module: &str) -> Result<(Uuid, Vec<SessionEvent>), CoreError> {
        let module = ModuleId::parse(module)?;
        let mut session = self.new_session(module);
        let events = session.next_question();
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions.iter().min_by_key(|(_, e)| e.touched).map(|(k, _)| *k) else {
                break;
            };
            sessions.remove(&oldest);
            info!(target: "session", id = %oldest, "Least recently used session evicted");
        }
        sessions.insert(id, SessionEntry { session, touched: self.tick() });
        info!(target: "session", %id, %module, open = sessions.len(), "Session registered");
        Ok((id, events))
    }

    /// Run `f` against a registered session. `None` if the id is unknown.
    pub async fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut Session<StdRng>) -> T) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(entry) => {
                entry.touched = self.tick();
                Some(f(&mut entry.session))
            }
            None => {
                warn!(target: "session", %id, "Unknown session id");
                None
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn snapshot(&self, id: Uuid) -> Option<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        let s = &sessions.get(&id)?.session;
        Some(SessionSnapshot {
            session_id: id,
            module: s.module(),
            mode: s.mode().to_string(),
            settings: s.settings().clone(),
            score: s.score(),
            locked: s.gate().is_locked(),
            question: s.question_view(),
            diagram: s.diagram(),
        })
    }

    #[instrument(level = "info", skip(self))]
    pub async fn close_session(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(target: "session", %id, "Session closed");
        }
        removed
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
