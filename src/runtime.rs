//! In-process runtime
//!
//! A [`Session`] hosts both sides of the bridge in one process: the sandbox
//! model with its update function, and the UI controller. Host events (page
//! switches, selection changes) go straight into the sandbox dispatcher; UI
//! actions go through the controller and their results cross the bridge.
//! [`Session::pump`] delivers messages in both directions until neither inbox
//! has anything left.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::{PhraseApi, TextItem};
use crate::bridge::{self, SandboxPort};
use crate::commands::Cmd;
use crate::config::SyncConfig;
use crate::credentials::Credential;
use crate::host::{ClientStorage, NodeId};
use crate::messages::SandboxMsg;
use crate::model::SandboxModel;
use crate::ui::{PushSummary, UiController};
use crate::update::update;

/// Upper bound on bridge round trips per pump; a ping-pong between the two
/// dispatchers never legitimately needs more
const MAX_PUMP_ROUNDS: usize = 64;

pub struct Session<A: PhraseApi> {
    pub model: SandboxModel,
    pub ui: UiController<A>,
    port: SandboxPort,
    save_path: Option<PathBuf>,
    notification_timeout: Duration,
    saves: usize,
}

impl<A: PhraseApi> Session<A> {
    pub fn new(
        model: SandboxModel,
        storage: Box<dyn ClientStorage>,
        make_api: impl Fn(&Credential) -> A + 'static,
        config: &SyncConfig,
    ) -> Self {
        let (port, ui_port) = bridge::channel();
        Self {
            model,
            ui: UiController::new(ui_port, storage, make_api),
            port,
            save_path: None,
            notification_timeout: Duration::from_millis(config.notification_timeout_ms),
            saves: 0,
        }
    }

    /// Persist the design file to `path` whenever the sandbox asks for it
    pub fn with_save_path(mut self, path: PathBuf) -> Self {
        self.save_path = Some(path);
        self
    }

    /// Number of document saves performed so far
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Start the UI: loads the binding and resolves credentials
    pub fn open(&mut self) -> Result<()> {
        self.ui.open_file();
        self.pump()
    }

    /// Host event: the current page changed
    pub fn switch_page(&mut self, page_node_id: &str) -> Result<()> {
        self.dispatch(SandboxMsg::CurrentPageChanged {
            page_node_id: page_node_id.to_string(),
        })?;
        self.pump()
    }

    /// Host event: the selection changed
    pub fn select(&mut self, selection: Vec<NodeId>) -> Result<()> {
        self.dispatch(SandboxMsg::SelectionChanged { selection })?;
        self.pump()
    }

    /// Select every top-level node of the current page
    pub fn select_page(&mut self) -> Result<()> {
        let selection = self
            .model
            .page()
            .map(|page| page.children.iter().map(|node| node.id.clone()).collect())
            .unwrap_or_default();
        self.select(selection)
    }

    pub async fn pull(&mut self) -> Result<bool> {
        let pulled = self.ui.pull_current_page().await;
        self.pump()?;
        Ok(pulled)
    }

    pub async fn push(&mut self) -> Result<PushSummary> {
        let summary = self.ui.push_selected().await;
        self.pump()?;
        Ok(summary)
    }

    pub async fn create(&mut self, phrase_key: Option<String>) -> Result<usize> {
        let created = self.ui.create_selected(phrase_key).await;
        self.pump()?;
        Ok(created)
    }

    pub fn connect(&mut self, item: TextItem) -> Result<bool> {
        let posted = self.ui.connect_selected(item);
        self.pump()?;
        Ok(posted)
    }

    pub fn unlink_selected(&mut self) -> Result<usize> {
        let count = self.ui.unlink_selected();
        self.pump()?;
        Ok(count)
    }

    pub fn configure_file(
        &mut self,
        file_id: &str,
        language_id: Option<String>,
        revision_id: Option<String>,
    ) -> Result<()> {
        self.ui
            .configure_file(file_id, language_id, revision_id)
            .context("File configuration refused")?;
        self.pump()
    }

    pub fn unlink_file(&mut self) -> Result<()> {
        self.ui.unlink_file();
        self.pump()
    }

    /// Deliver messages across the bridge until both inboxes are empty
    pub fn pump(&mut self) -> Result<()> {
        for _ in 0..MAX_PUMP_ROUNDS {
            let to_sandbox = self.port.drain();
            let to_ui = self.ui.port().drain();
            if to_sandbox.is_empty() && to_ui.is_empty() {
                return Ok(());
            }

            for msg in to_ui {
                self.ui.handle(msg);
            }
            for msg in to_sandbox {
                self.dispatch(msg)?;
            }
        }
        anyhow::bail!("Bridge did not settle after {} rounds", MAX_PUMP_ROUNDS)
    }

    fn dispatch(&mut self, msg: SandboxMsg) -> Result<()> {
        match update(&mut self.model, msg) {
            Some(cmd) => self.process_cmd(cmd),
            None => Ok(()),
        }
    }

    fn process_cmd(&mut self, cmd: Cmd) -> Result<()> {
        for cmd in cmd.flatten() {
            self.perform(cmd)?;
        }
        Ok(())
    }

    fn perform(&mut self, cmd: Cmd) -> Result<()> {
        match cmd {
            Cmd::None | Cmd::Batch(_) => {}
            Cmd::PostToUi(msg) => self.port.post(msg),
            Cmd::Notify(mut notification) => {
                notification.timeout = self.notification_timeout;
                if notification.error {
                    tracing::warn!("{}", notification.message);
                } else {
                    tracing::info!("{}", notification.message);
                }
                self.model.notifications.push(notification);
            }
            Cmd::SaveDocument => {
                if let Some(path) = &self.save_path {
                    self.model
                        .document
                        .save(path)
                        .map_err(anyhow::Error::msg)
                        .with_context(|| format!("Saving {}", path.display()))?;
                }
                self.saves += 1;
            }
        }
        Ok(())
    }
}
