//! CLI command handlers, one file per command.

mod index;
mod peel;

pub use index::run_index;
pub use peel::run_peel;
