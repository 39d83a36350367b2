//! phrase-sync - keeps design-file text layers in sync with remote phrases
//!
//! The engine is split across a message bridge, Elm style: the sandbox side
//! owns the design file and applies every change through [`update`], the UI
//! side owns credentials and all network I/O. Neither side shares state with
//! the other.

pub mod api;
pub mod bridge;
pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod credentials;
pub mod diff;
pub mod host;
pub mod link;
pub mod messages;
pub mod model;
pub mod runtime;
pub mod selection;
pub mod store;
pub mod sync;
pub mod tracing;
pub mod ui;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::SyncConfig;
pub use messages::{SandboxMsg, UiMsg};
pub use model::SandboxModel;
pub use runtime::Session;
pub use ui::UiController;
