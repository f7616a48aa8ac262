//! Error types for the trainer core.
//!
//! Grading never fails: an incorrect answer is an outcome, not an error. The
//! variants here cover content-authoring mistakes, lookups into the content
//! library and the settings store.

use thiserror::Error;

/// Errors surfaced by the core components.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// The geometry has no crystal-field model registered.
    #[error("no crystal-field model registered for geometry '{0}'")]
    UnknownGeometry(String),

    /// The active module/mode has no questions.
    #[error("question pool is empty for {module}/{mode}")]
    EmptyPool { module: String, mode: String },

    /// Persisted settings could not be parsed.
    #[error("malformed settings: {0}")]
    MalformedSettings(String),

    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("unknown mode '{mode}' for module '{module}'")]
    UnknownMode { module: String, mode: String },

    /// A content record could not be turned into a question.
    #[error("invalid question '{id}': {reason}")]
    InvalidContent { id: String, reason: String },

    /// A geometry description violates the registry invariants.
    #[error("invalid geometry config '{geometry}': {reason}")]
    InvalidGeometryConfig { geometry: String, reason: String },

    /// An operation needs a presented question but none is active.
    #[error("no active question")]
    NoActiveQuestion,
}

impl CoreError {
    /// Content errors are authoring mistakes and are not recoverable at runtime.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            CoreError::UnknownGeometry(_)
                | CoreError::InvalidContent { .. }
                | CoreError::InvalidGeometryConfig { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_geometry_is_a_content_error() {
        assert!(CoreError::UnknownGeometry("trigonal prismatic".into()).is_content_error());
        assert!(!CoreError::NoActiveQuestion.is_content_error());
    }

    #[test]
    fn empty_pool_message_names_module_and_mode() {
        let e = CoreError::EmptyPool {
            module: "bonding".into(),
            mode: "mo".into(),
        };
        assert_eq!(e.to_string(), "question pool is empty for bonding/mo");
    }
}
