//! CLI command implementations.

pub mod new;
pub mod sync;

pub use new::NewCommand;
pub use sync::SyncCommand;
