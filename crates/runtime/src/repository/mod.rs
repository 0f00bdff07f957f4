//! Repository layer for saved sessions.
//!
//! Repositories persist [`SessionSnapshot`]s by slot name. Static content
//! (tunables, class templates) comes from `echoes-content`, never from saves.

mod error;
mod file;
mod memory;
mod snapshot;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSaveRepository;
pub use memory::MemorySaveRepository;
pub use snapshot::{SAVE_FORMAT_VERSION, SaveEnvelope, SessionSnapshot};
pub use traits::SaveRepository;
