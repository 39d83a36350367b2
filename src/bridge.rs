//! Bridge between the sandbox and the UI
//!
//! Two ports over a pair of channels. Each side posts to the other and drains
//! its own inbox from its single dispatcher; nothing else is shared.
//! Messages can also be encoded as JSON for hosts where the two sides live
//! in separate script contexts.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::messages::{SandboxMsg, UiMsg};

/// Sandbox end: receives [`SandboxMsg`], sends [`UiMsg`]
pub struct SandboxPort {
    inbox: Receiver<SandboxMsg>,
    to_ui: Sender<UiMsg>,
}

/// UI end: receives [`UiMsg`], sends [`SandboxMsg`]
pub struct UiPort {
    inbox: Receiver<UiMsg>,
    to_sandbox: Sender<SandboxMsg>,
}

/// Create a connected pair of ports
pub fn channel() -> (SandboxPort, UiPort) {
    let (to_sandbox, sandbox_inbox) = mpsc::channel();
    let (to_ui, ui_inbox) = mpsc::channel();
    (
        SandboxPort {
            inbox: sandbox_inbox,
            to_ui,
        },
        UiPort {
            inbox: ui_inbox,
            to_sandbox,
        },
    )
}

impl SandboxPort {
    pub fn post(&self, msg: UiMsg) {
        if self.to_ui.send(msg).is_err() {
            tracing::warn!("UI side of the bridge is gone, dropping message");
        }
    }

    /// Take every pending message, in arrival order
    pub fn drain(&self) -> Vec<SandboxMsg> {
        self.inbox.try_iter().collect()
    }
}

impl UiPort {
    pub fn post(&self, msg: SandboxMsg) {
        let kind = msg.kind();
        if self.to_sandbox.send(msg).is_err() {
            tracing::warn!("Sandbox side of the bridge is gone, dropping {}", kind);
        }
    }

    /// Take every pending message, in arrival order
    pub fn drain(&self) -> Vec<UiMsg> {
        self.inbox.try_iter().collect()
    }
}

pub fn encode_sandbox_msg(msg: &SandboxMsg) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

pub fn decode_sandbox_msg(raw: &str) -> Result<SandboxMsg, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn encode_ui_msg(msg: &UiMsg) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

pub fn decode_ui_msg(raw: &str) -> Result<UiMsg, serde_json::Error> {
    serde_json::from_str(raw)
}
