//! Session runtime for the timeline engine.
//!
//! This crate owns the pieces that sit around the pure rules in
//! `echoes-core`: a [`GameSession`] that holds the shared timeline and the
//! character roster and drives them frame by frame, `tracing` observers, and
//! save repositories that persist [`SessionSnapshot`]s.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the session context and frame loop
//! - [`config`] reads host settings from the environment
//! - [`observers`] forwards notifications to `tracing`
//! - [`repository`] provides checksummed save slots on disk or in memory
pub mod config;
pub mod error;
pub mod observers;
pub mod repository;
pub mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use observers::{TracingClassObserver, TracingTimelineListener};
pub use repository::{
    FileSaveRepository, MemorySaveRepository, RepositoryError, SAVE_FORMAT_VERSION, SaveEnvelope,
    SaveRepository, SessionSnapshot,
};
pub use session::GameSession;
