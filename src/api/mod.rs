//! Phrase API contract
//!
//! The remote CMS is consumed through a fixed set of endpoints. [`PhraseApi`]
//! is the seam: [`HttpApi`] talks to the real server, tests plug in a
//! recording fake.

mod http;
pub mod types;

use async_trait::async_trait;

pub use http::HttpApi;
pub use types::{CreateTextItem, Me, Pagination, TextItem, TextPage, Workspace};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("server responded with {0}: {1}")]
    Status(u16, String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound,
            _ => ApiError::Status(status, body),
        }
    }
}

#[async_trait]
pub trait PhraseApi: Send + Sync {
    /// `POST /figma-files/{id}/texts`
    async fn create_texts(
        &self,
        file_id: &str,
        items: Vec<CreateTextItem>,
    ) -> Result<Vec<TextItem>, ApiError>;

    /// `PATCH /figma-files/{id}/texts/{textId}`
    async fn update_text(
        &self,
        file_id: &str,
        text_id: &str,
        content: &str,
    ) -> Result<TextItem, ApiError>;

    /// `GET /figma-files/{id}/texts?pageNodeId=&page=` (1-based pages)
    async fn list_texts(
        &self,
        file_id: &str,
        page_node_id: &str,
        page: u32,
    ) -> Result<TextPage, ApiError>;

    /// `GET /me`
    async fn me(&self) -> Result<Me, ApiError>;
}
