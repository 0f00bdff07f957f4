//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod clean;
mod read_save;
mod simulate;

pub use clean::Clean;
pub use read_save::ReadSave;
pub use simulate::Simulate;
