//! Credential resolution
//!
//! A user may hold API keys for several accounts/workspaces. On file open the
//! resolver decides which one applies to the file, or which prompt the UI
//! has to show instead.

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, Me, PhraseApi};
use crate::host::ClientStorage;
use crate::store::FileBinding;

/// Client storage key holding the JSON credential list
pub const KEY_CREDENTIALS: &str = "credentials";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub api_key: String,
    #[serde(default)]
    pub custom_origin: Option<String>,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub workspace_key: String,
}

impl Credential {
    /// True when this credential points at the same origin + workspace as
    /// the file binding
    pub fn matches(&self, binding: &FileBinding) -> bool {
        self.custom_origin == binding.custom_origin && self.workspace_id == binding.workspace_id
    }

    fn same_slot(&self, other: &Credential) -> bool {
        self.custom_origin == other.custom_origin && self.workspace_id == other.workspace_id
    }
}

/// Ordered list of credentials known to the current user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserCredentialSet {
    entries: Vec<Credential>,
}

impl UserCredentialSet {
    pub fn new(entries: Vec<Credential>) -> Self {
        let mut set = Self::default();
        for entry in entries {
            set.add(entry);
        }
        set
    }

    /// Load the set from client storage. Malformed JSON reads as empty.
    pub fn load(storage: &dyn ClientStorage) -> Self {
        let Some(raw) = storage.get(KEY_CREDENTIALS) else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<Credential>>(&raw) {
            Ok(entries) => Self::new(entries),
            Err(e) => {
                tracing::warn!("Ignoring malformed stored credentials: {}", e);
                Self::default()
            }
        }
    }

    /// Replace the stored set as a whole
    pub fn save(&self, storage: &mut dyn ClientStorage) -> Result<(), String> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| format!("Failed to serialize credentials: {}", e))?;
        storage.set(KEY_CREDENTIALS, json)
    }

    /// Add a credential; an entry for the same origin + workspace is
    /// replaced in place. Returns true when an existing entry was replaced.
    pub fn add(&mut self, credential: Credential) -> bool {
        match self.entries.iter_mut().find(|c| c.same_slot(&credential)) {
            Some(existing) => {
                *existing = credential;
                true
            }
            None => {
                self.entries.push(credential);
                false
            }
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<Credential> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn entries(&self) -> &[Credential] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Credential> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the UI must do after evaluating credentials for a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No credentials at all: first-run onboarding
    Onboarding,
    /// A credential was selected without prompting
    Resolved(Credential),
    /// The user must pick one of these (or add a new one)
    SelectionRequired(Vec<Credential>),
    /// The file is bound to a workspace none of the credentials belong to
    InvalidForFile { binding: FileBinding },
}

/// Evaluate the stored credentials against the file binding
pub fn resolve(credentials: &UserCredentialSet, binding: Option<&FileBinding>) -> Resolution {
    if credentials.is_empty() {
        return Resolution::Onboarding;
    }

    match binding {
        None if credentials.len() == 1 => Resolution::Resolved(credentials.entries[0].clone()),
        None => Resolution::SelectionRequired(credentials.entries.clone()),
        Some(binding) => match credentials.entries.iter().find(|c| c.matches(binding)) {
            Some(credential) => Resolution::Resolved(credential.clone()),
            None => Resolution::InvalidForFile {
                binding: binding.clone(),
            },
        },
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("invalid API key")]
    InvalidApiKey,
    #[error("invalid or unreachable origin: {0}")]
    InvalidOrigin(String),
    #[error("credentials belong to workspace {found}, file is bound to {expected}")]
    BindingMismatch { expected: String, found: String },
    #[error("no stored credential at index {0}")]
    UnknownIndex(usize),
    #[error("no credentials stored")]
    NoCredentials,
    #[error("{0} credentials stored, choose one first")]
    SelectionRequired(usize),
}

impl From<ApiError> for CredentialError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Unauthorized => CredentialError::InvalidApiKey,
            other => CredentialError::InvalidOrigin(other.to_string()),
        }
    }
}

/// Refuse a credential whose workspace disagrees with the file binding
pub fn check_selection(
    credential: &Credential,
    binding: Option<&FileBinding>,
) -> Result<(), CredentialError> {
    match binding {
        Some(binding) if !credential.matches(binding) => Err(CredentialError::BindingMismatch {
            expected: binding.workspace_id.clone(),
            found: credential.workspace_id.clone(),
        }),
        _ => Ok(()),
    }
}

/// Per-candidate results of validating a credential form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub results: Vec<Result<Credential, CredentialError>>,
}

impl ValidationReport {
    pub fn all_valid(&self) -> bool {
        self.results.iter().all(Result::is_ok)
    }

    /// Indices of the candidates that failed, for flagging in the form
    pub fn failing(&self) -> Vec<(usize, CredentialError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e.clone())))
            .collect()
    }

    /// Validated credentials, only if every candidate passed
    pub fn into_valid(self) -> Option<Vec<Credential>> {
        self.results.into_iter().collect::<Result<Vec<_>, _>>().ok()
    }
}

/// Confirm one candidate via `GET /me`, filling in its workspace
pub async fn validate<A: PhraseApi>(api: &A, candidate: &Credential) -> Result<Credential, CredentialError> {
    let me: Me = api.me().await.map_err(CredentialError::from)?;
    tracing::debug!(
        "Credential validated for workspace {} ({} {})",
        me.workspace.key,
        me.first_name,
        me.last_name
    );
    Ok(Credential {
        workspace_id: me.workspace.id,
        workspace_key: me.workspace.key,
        ..candidate.clone()
    })
}

/// Validate every candidate concurrently; one API client per candidate
pub async fn validate_all<A, F>(candidates: &[Credential], make_api: F) -> ValidationReport
where
    A: PhraseApi,
    F: Fn(&Credential) -> A,
{
    let apis: Vec<A> = candidates.iter().map(&make_api).collect();
    let results = join_all(
        apis.iter()
            .zip(candidates)
            .map(|(api, candidate)| validate(api, candidate)),
    )
    .await;
    ValidationReport { results }
}
