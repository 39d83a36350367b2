//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use phrase_sync::api::{
    ApiError, CreateTextItem, Me, Pagination, PhraseApi, TextItem, TextPage, Workspace,
};
use phrase_sync::credentials::{Credential, UserCredentialSet};
use phrase_sync::host::{
    ClientStorage, DesignDocument, FontName, FontRegistry, MemoryClientStorage, Page, SceneNode,
};
use phrase_sync::{SandboxModel, Session, SyncConfig};

/// A request the mock API received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { count: usize },
    Update { text_id: String, content: String },
    List { page_node_id: String, page: u32 },
    Me,
}

#[derive(Debug, Default)]
pub struct MockState {
    /// Server-side listing per page node: one entry per result page
    pub pages: HashMap<String, Vec<Vec<TextItem>>>,
    /// Remote texts by id; updates to unknown ids answer 404
    pub texts: HashMap<String, TextItem>,
    pub calls: Vec<Call>,
    /// Answer this listing page with a server error
    pub fail_page: Option<u32>,
    pub unauthorized: bool,
    /// Workspace reported by `/me`
    pub workspace_id: String,
    next_id: u64,
}

/// In-memory phrase API recording every call; clones share state
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub fn new(workspace_id: &str) -> Self {
        let api = Self::default();
        api.state().workspace_id = workspace_id.to_string();
        api
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Serve `pages` as the paginated listing of `page_node_id`
    pub fn serve_pages(&self, page_node_id: &str, pages: Vec<Vec<TextItem>>) {
        let mut state = self.state();
        for item in pages.iter().flatten() {
            state.texts.insert(item.id.clone(), item.clone());
        }
        state.pages.insert(page_node_id.to_string(), pages);
    }

    pub fn delete_text(&self, id: &str) {
        self.state().texts.remove(id);
    }

    pub fn list_calls(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List { page, .. } => Some(page),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PhraseApi for MockApi {
    async fn create_texts(
        &self,
        _file_id: &str,
        items: Vec<CreateTextItem>,
    ) -> Result<Vec<TextItem>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::Create { count: items.len() });
        if state.unauthorized {
            return Err(ApiError::Unauthorized);
        }

        let mut created = Vec::new();
        for item in items {
            state.next_id += 1;
            let id = format!("t{}", state.next_id);
            let text = TextItem {
                id: id.clone(),
                phrase_id: format!("p{}", state.next_id),
                phrase_key: item
                    .phrase_key
                    .unwrap_or_else(|| format!("key.{}", state.next_id)),
                content: item.content,
                text_node_id: Some(item.text_node_id),
                page_node_id: Some(item.page_node_id),
            };
            state.texts.insert(id, text.clone());
            created.push(text);
        }
        Ok(created)
    }

    async fn update_text(
        &self,
        _file_id: &str,
        text_id: &str,
        content: &str,
    ) -> Result<TextItem, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::Update {
            text_id: text_id.to_string(),
            content: content.to_string(),
        });
        if state.unauthorized {
            return Err(ApiError::Unauthorized);
        }
        match state.texts.get_mut(text_id) {
            Some(text) => {
                text.content = content.to_string();
                Ok(text.clone())
            }
            None => Err(ApiError::NotFound),
        }
    }

    async fn list_texts(
        &self,
        _file_id: &str,
        page_node_id: &str,
        page: u32,
    ) -> Result<TextPage, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::List {
            page_node_id: page_node_id.to_string(),
            page,
        });
        if state.unauthorized {
            return Err(ApiError::Unauthorized);
        }
        if state.fail_page == Some(page) {
            return Err(ApiError::Status(500, "boom".into()));
        }

        let pages = state.pages.get(page_node_id).cloned().unwrap_or_default();
        let items = pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        Ok(TextPage {
            items,
            pagination: Pagination {
                pages_count: pages.len() as u32,
                page: Some(page),
                total: None,
            },
        })
    }

    async fn me(&self) -> Result<Me, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::Me);
        if state.unauthorized {
            return Err(ApiError::Unauthorized);
        }
        Ok(Me {
            workspace: Workspace {
                id: state.workspace_id.clone(),
                key: format!("ws-{}", state.workspace_id),
            },
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        })
    }
}

pub fn inter() -> FontName {
    FontName::new("Inter", "Regular")
}

/// Two pages; the login page holds a frame with two texts and an instance
pub fn document() -> DesignDocument {
    DesignDocument::new(
        "design",
        "App",
        vec![
            Page::new(
                "0:1",
                "Login",
                vec![SceneNode::frame(
                    "1:0",
                    vec![
                        SceneNode::text("1:1", "Sign in", vec![inter()]),
                        SceneNode::text("1:2", "Forgot password?", vec![inter()]),
                        SceneNode::instance(
                            "1:3",
                            vec![SceneNode::text("1:4", "Button", vec![inter()])],
                        ),
                    ],
                )],
            ),
            Page::new(
                "0:2",
                "Home",
                vec![SceneNode::text("2:1", "Welcome", vec![inter()])],
            ),
        ],
    )
}

pub fn credential(workspace_id: &str) -> Credential {
    Credential {
        api_key: format!("key-{}", workspace_id),
        custom_origin: None,
        workspace_id: workspace_id.to_string(),
        workspace_key: format!("ws-{}", workspace_id),
    }
}

pub fn remote(id: &str, node: &str, content: &str) -> TextItem {
    TextItem {
        id: id.to_string(),
        phrase_id: format!("p-{}", id),
        phrase_key: format!("key.{}", id),
        content: content.to_string(),
        text_node_id: Some(node.to_string()),
        page_node_id: Some("0:1".to_string()),
    }
}

pub fn storage_with(credentials: Vec<Credential>) -> Box<dyn ClientStorage> {
    let mut storage = MemoryClientStorage::new();
    UserCredentialSet::new(credentials)
        .save(&mut storage)
        .unwrap();
    Box::new(storage)
}

/// Session over `document` where every credential talks to `api`
pub fn session_with(
    document: DesignDocument,
    fonts: FontRegistry,
    api: &MockApi,
    credentials: Vec<Credential>,
) -> Session<MockApi> {
    let api = api.clone();
    Session::new(
        SandboxModel::new(document, fonts),
        storage_with(credentials),
        move |_: &Credential| api.clone(),
        &SyncConfig::default(),
    )
}

/// Opened session with one credential, whole login page selected
pub fn session(api: &MockApi) -> Session<MockApi> {
    let mut session = session_with(
        document(),
        FontRegistry::new([inter()]),
        api,
        vec![credential("1")],
    );
    session.open().unwrap();
    session.select_page().unwrap();
    session
}

/// Opened and configured session with one credential
pub fn configured_session(api: &MockApi) -> Session<MockApi> {
    let mut session = session(api);
    session.configure_file("file-1", Some("en".into()), None).unwrap();
    session
}

/// Overwrite a text node's characters, as a designer edit would
pub fn edit_text(session: &mut Session<MockApi>, node_id: &str, characters: &str) {
    let text = session
        .model
        .document
        .pages
        .iter_mut()
        .find_map(|page| page.find_node_mut(node_id))
        .and_then(|node| node.as_text_mut())
        .unwrap();
    text.characters = characters.to_string();
}

pub fn notification_messages(session: &Session<MockApi>) -> Vec<String> {
    session
        .model
        .notifications
        .iter()
        .map(|n| n.message.clone())
        .collect()
}

pub fn error_messages(session: &Session<MockApi>) -> Vec<String> {
    session
        .model
        .notifications
        .iter()
        .filter(|n| n.error)
        .map(|n| n.message.clone())
        .collect()
}
