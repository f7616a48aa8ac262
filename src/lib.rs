//! Coordination chemistry practice engine: content, grading, crystal-field
//! orbital filling, adaptive scheduling and the axum transport around them.

pub mod config;
pub mod content;
pub mod diagram;
pub mod domain;
pub mod electrons;
pub mod error;
pub mod geometry;
pub mod grader;
pub mod logic;
pub mod mastery;
pub mod protocol;
pub mod routes;
pub mod scheduler;
pub mod score;
pub mod seeds;
pub mod session;
pub mod settings;
pub mod state;
pub mod tagging;
pub mod telemetry;
pub mod util;
