//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after a sandbox
//! update: posting to the UI, showing a notification, persisting the file.

use std::time::Duration;

use crate::messages::UiMsg;

/// A transient notification shown by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub error: bool,
    pub timeout: Duration,
}

impl Notification {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: true,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Side effects requested by the sandbox update function
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Send a message across the bridge to the UI
    PostToUi(UiMsg),
    /// Show a transient notification
    Notify(Notification),
    /// Persist the design file
    SaveDocument,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        Cmd::Batch(cmds)
    }

    pub fn notify(message: impl Into<String>) -> Self {
        Cmd::Notify(Notification::info(message))
    }

    pub fn notify_error(message: impl Into<String>) -> Self {
        Cmd::Notify(Notification::error(message))
    }

    /// Flatten nested batches into a plain list, dropping `None`
    pub fn flatten(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::flatten).collect(),
            other => vec![other],
        }
    }
}
