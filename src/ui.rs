//! UI side of the bridge
//!
//! Owns the user's credentials, the resolved API client and every network
//! call. It never touches the design file: results are posted to the sandbox
//! as messages and the sandbox answers with a fresh selection view.
//!
//! One logical operation runs at a time per user action. A pull that is
//! superseded by a newer pull of the same page is not cancelled; its result
//! is dropped when it arrives.

use chrono::{DateTime, Utc};

use crate::api::{ApiError, PhraseApi, TextItem};
use crate::bridge::UiPort;
use crate::credentials::{
    self, check_selection, Credential, CredentialError, Resolution, UserCredentialSet,
    ValidationReport,
};
use crate::host::ClientStorage;
use crate::link::{LinkState, TextLeaf};
use crate::messages::{SandboxMsg, UiMsg};
use crate::store::FileBinding;
use crate::sync::{self, PullTicket, PullTracker, PulledPage, PushOutcome, TextDraft};

/// Summary of a push over the selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub pushed: usize,
    pub demoted: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// A pull that has been started but not yet applied
#[derive(Debug, Clone)]
pub struct PullJob {
    ticket: PullTicket,
    binding: FileBinding,
}

impl PullJob {
    pub fn page_node_id(&self) -> &str {
        &self.ticket.page_node_id
    }

    /// Fetch every page of the listing
    pub async fn run<A: PhraseApi + ?Sized>(&self, api: &A) -> Result<PulledPage, ApiError> {
        sync::pull_page(api, &self.binding, &self.ticket.page_node_id).await
    }
}

type ApiFactory<A> = Box<dyn Fn(&Credential) -> A>;

pub struct UiController<A: PhraseApi> {
    port: UiPort,
    storage: Box<dyn ClientStorage>,
    make_api: ApiFactory<A>,
    credentials: UserCredentialSet,
    resolution: Resolution,
    active: Option<(Credential, A)>,
    binding: Option<FileBinding>,
    page_node_id: String,
    selection: Vec<TextLeaf>,
    last_synced_at: Option<DateTime<Utc>>,
    pulls: PullTracker,
}

impl<A: PhraseApi> UiController<A> {
    pub fn new(
        port: UiPort,
        storage: Box<dyn ClientStorage>,
        make_api: impl Fn(&Credential) -> A + 'static,
    ) -> Self {
        let credentials = UserCredentialSet::load(storage.as_ref());
        Self {
            port,
            storage,
            make_api: Box::new(make_api),
            credentials,
            resolution: Resolution::Onboarding,
            active: None,
            binding: None,
            page_node_id: String::new(),
            selection: Vec::new(),
            last_synced_at: None,
            pulls: PullTracker::default(),
        }
    }

    /// Ask the sandbox for the file state; resolution follows on reply
    pub fn open_file(&self) {
        self.port.post(SandboxMsg::UiReady);
    }

    pub fn port(&self) -> &UiPort {
        &self.port
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn credentials(&self) -> &UserCredentialSet {
        &self.credentials
    }

    pub fn active_credential(&self) -> Option<&Credential> {
        self.active.as_ref().map(|(credential, _)| credential)
    }

    pub fn binding(&self) -> Option<&FileBinding> {
        self.binding.as_ref()
    }

    pub fn selection(&self) -> &[TextLeaf] {
        &self.selection
    }

    pub fn page_node_id(&self) -> &str {
        &self.page_node_id
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    /// Dispatcher for messages arriving from the sandbox
    pub fn handle(&mut self, msg: UiMsg) {
        match msg {
            UiMsg::FileConfigLoaded { binding } => {
                self.binding = binding;
                self.resolve();
            }
            UiMsg::SelectionTexts {
                page_node_id,
                leaves,
                last_synced_at,
                ..
            } => {
                self.page_node_id = page_node_id;
                self.selection = leaves;
                self.last_synced_at = last_synced_at;
            }
            UiMsg::TextsApplied {
                page_node_id,
                report,
            } => {
                tracing::debug!("Sandbox applied texts on {:?}: {:?}", page_node_id, report);
            }
            UiMsg::FileUnlinked { cleared } => {
                tracing::info!("File unlinked, {} links cleared", cleared);
                self.binding = None;
                self.resolve();
            }
        }
    }

    fn notify(&self, message: impl Into<String>, error: bool) {
        self.port.post(SandboxMsg::NotificationRequested {
            message: message.into(),
            error,
        });
    }

    /// Re-evaluate which credential applies to the file
    pub fn resolve(&mut self) -> &Resolution {
        self.resolution = credentials::resolve(&self.credentials, self.binding.as_ref());
        self.active = match &self.resolution {
            Resolution::Resolved(credential) => {
                Some((credential.clone(), (self.make_api)(credential)))
            }
            _ => None,
        };
        tracing::debug!("Credential resolution: {:?}", self.resolution_name());
        &self.resolution
    }

    fn resolution_name(&self) -> &'static str {
        match self.resolution {
            Resolution::Onboarding => "onboarding",
            Resolution::Resolved(_) => "resolved",
            Resolution::SelectionRequired(_) => "selection-required",
            Resolution::InvalidForFile { .. } => "invalid-for-file",
        }
    }

    /// Explicitly pick one of the stored credentials
    pub fn choose_credential(&mut self, index: usize) -> Result<(), CredentialError> {
        let Some(credential) = self.credentials.get(index).cloned() else {
            return Err(CredentialError::UnknownIndex(index));
        };
        if let Err(e) = check_selection(&credential, self.binding.as_ref()) {
            self.notify("These credentials are invalid for this file", true);
            return Err(e);
        }
        let api = (self.make_api)(&credential);
        self.resolution = Resolution::Resolved(credential.clone());
        self.active = Some((credential, api));
        Ok(())
    }

    /// Validate and store new credentials
    ///
    /// Candidates are validated concurrently. Nothing is stored unless every
    /// candidate passes; the report flags the failing ones.
    pub async fn add_credentials(&mut self, candidates: Vec<Credential>) -> ValidationReport {
        let report = credentials::validate_all(&candidates, |c| (self.make_api)(c)).await;

        for (index, error) in report.failing() {
            tracing::info!("Credential #{} rejected: {}", index, error);
        }
        let Some(valid) = report.clone().into_valid() else {
            self.notify("Some credentials could not be verified", true);
            return report;
        };

        for credential in valid {
            if self.credentials.add(credential) {
                tracing::debug!("Replaced credential for an existing workspace");
            }
        }
        if let Err(e) = self.credentials.save(self.storage.as_mut()) {
            tracing::error!("Failed to persist credentials: {}", e);
            self.notify("Could not save credentials", true);
        }
        self.resolve();
        report
    }

    pub fn remove_credential(&mut self, index: usize) -> Option<Credential> {
        let removed = self.credentials.remove(index)?;
        if let Err(e) = self.credentials.save(self.storage.as_mut()) {
            tracing::error!("Failed to persist credentials: {}", e);
        }
        self.resolve();
        Some(removed)
    }

    /// Bind the file to the active credential's workspace
    pub fn configure_file(
        &mut self,
        file_id: &str,
        language_id: Option<String>,
        revision_id: Option<String>,
    ) -> Result<FileBinding, CredentialError> {
        let Some((credential, _)) = &self.active else {
            let error = match &self.resolution {
                Resolution::InvalidForFile { binding } => CredentialError::BindingMismatch {
                    expected: binding.workspace_id.clone(),
                    found: self
                        .credentials
                        .entries()
                        .iter()
                        .map(|c| c.workspace_id.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                },
                _ if self.credentials.is_empty() => CredentialError::NoCredentials,
                _ => CredentialError::SelectionRequired(self.credentials.len()),
            };
            self.notify("Choose credentials before configuring the file", true);
            return Err(error);
        };
        let binding = FileBinding {
            id: file_id.to_string(),
            language_id,
            revision_id,
            workspace_id: credential.workspace_id.clone(),
            workspace_key: credential.workspace_key.clone(),
            custom_origin: credential.custom_origin.clone(),
        };
        self.port.post(SandboxMsg::FileConfigSet {
            binding: binding.clone(),
        });
        Ok(binding)
    }

    /// Ask the sandbox to clear the binding and every link
    pub fn unlink_file(&self) {
        self.port.post(SandboxMsg::FileConfigResetRequested);
    }

    /// API client and binding, only when the credential agrees with the file
    fn sync_target(&self) -> Option<(&A, &FileBinding)> {
        let binding = match &self.binding {
            Some(binding) => binding,
            None => {
                self.notify("This file is not configured yet", true);
                return None;
            }
        };
        match &self.active {
            Some((credential, api)) if credential.matches(binding) => Some((api, binding)),
            _ => {
                self.notify("Credentials are invalid for this file", true);
                None
            }
        }
    }

    fn report_api_error(&self, action: &str, error: &ApiError) {
        tracing::warn!("{} failed: {}", action, error);
        let message = match error {
            ApiError::Unauthorized => format!("{} failed: invalid API key", action),
            ApiError::Transport(_) => format!("{} failed: server unreachable", action),
            other => format!("{} failed: {}", action, other),
        };
        self.notify(message, true);
    }

    /// Create remote phrases for every unlinked text in the selection
    ///
    /// `phrase_key` is only used when exactly one text is created.
    pub async fn create_selected(&mut self, phrase_key: Option<String>) -> usize {
        let Some((api, binding)) = self.sync_target() else {
            return 0;
        };

        let unlinked: Vec<&TextLeaf> = self.selection.iter().filter(|l| !l.is_linked()).collect();
        let single = unlinked.len() == 1;
        let drafts: Vec<TextDraft> = unlinked
            .into_iter()
            .map(|leaf| TextDraft {
                text_node_id: leaf.figma_node_id.clone(),
                page_node_id: leaf.figma_page_id.clone(),
                content: leaf.figma_content.clone(),
                phrase_key: if single { phrase_key.clone() } else { None },
            })
            .collect();
        if drafts.is_empty() {
            self.notify("Nothing to create: every selected text is linked", false);
            return 0;
        }

        match sync::create_texts(api, binding, &drafts).await {
            Ok(items) => {
                let created = items.len();
                self.port.post(SandboxMsg::TextsCreated { items });
                created
            }
            Err(e) => {
                self.report_api_error("Creating phrases", &e);
                0
            }
        }
    }

    /// Push every locally-ahead linked text in the selection, one at a time
    pub async fn push_selected(&mut self) -> PushSummary {
        let mut summary = PushSummary::default();
        let Some((api, binding)) = self.sync_target() else {
            return summary;
        };

        for leaf in &self.selection {
            let Some(link) = &leaf.app_link else {
                summary.skipped += 1;
                continue;
            };
            if leaf.state() != LinkState::LocallyAhead {
                summary.skipped += 1;
                continue;
            }

            match sync::push_text(api, binding, link, &leaf.figma_content).await {
                Ok(PushOutcome::Pushed(item)) => {
                    summary.pushed += 1;
                    self.port.post(SandboxMsg::TextPushed {
                        text_node_id: leaf.figma_node_id.clone(),
                        item,
                        content: leaf.figma_content.clone(),
                    });
                }
                Ok(PushOutcome::RemoteMissing) => {
                    summary.demoted += 1;
                    self.port.post(SandboxMsg::TextRemoteMissing {
                        text_node_id: leaf.figma_node_id.clone(),
                    });
                }
                Err(e) => {
                    summary.failed += 1;
                    self.report_api_error("Pushing text", &e);
                }
            }
        }

        if summary.pushed > 0 {
            self.notify(format!("Pushed {} text(s)", summary.pushed), false);
        }
        summary
    }

    /// Link the selected text to an existing remote text
    pub fn connect_selected(&self, item: TextItem) -> bool {
        match self.selection.as_slice() {
            [leaf] => {
                self.port.post(SandboxMsg::TextConnectRequested {
                    text_node_id: leaf.figma_node_id.clone(),
                    item,
                });
                true
            }
            _ => {
                self.notify("Select exactly one text to connect", true);
                false
            }
        }
    }

    pub fn unlink_selected(&self) -> usize {
        let mut count = 0;
        for leaf in self.selection.iter().filter(|l| l.is_linked()) {
            self.port.post(SandboxMsg::TextUnlinkRequested {
                text_node_id: leaf.figma_node_id.clone(),
            });
            count += 1;
        }
        count
    }

    /// Start a pull of `page_node_id`, superseding any pull already running
    pub fn begin_pull(&mut self, page_node_id: &str) -> Option<PullJob> {
        let binding = self.sync_target()?.1.clone();
        Some(PullJob {
            ticket: self.pulls.begin(page_node_id),
            binding,
        })
    }

    /// Deliver a pull result to the sandbox unless it has been superseded
    pub fn finish_pull(&mut self, job: PullJob, result: Result<PulledPage, ApiError>) -> bool {
        if !self.pulls.finish(&job.ticket) {
            tracing::debug!("Dropping superseded pull of {}", job.page_node_id());
            return false;
        }
        match result {
            Ok(pulled) => {
                tracing::info!(
                    "Pulled {} texts over {} page(s) for {}",
                    pulled.items.len(),
                    pulled.pages_fetched,
                    pulled.page_node_id
                );
                self.port.post(SandboxMsg::TextsSyncReceived {
                    page_node_id: pulled.page_node_id,
                    items: pulled.items,
                    synced_at: Utc::now(),
                });
                true
            }
            Err(e) => {
                self.report_api_error("Sync", &e);
                false
            }
        }
    }

    /// Full pull of the current page
    pub async fn pull_current_page(&mut self) -> bool {
        let page_node_id = self.page_node_id.clone();
        let Some(job) = self.begin_pull(&page_node_id) else {
            return false;
        };
        let result = match &self.active {
            Some((_, api)) => job.run(api).await,
            None => return false,
        };
        self.finish_pull(job, result)
    }
}
