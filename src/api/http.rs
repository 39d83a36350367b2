use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::{CreateTextsRequest, TextItems, UpdateTextRequest};
use super::{ApiError, CreateTextItem, Me, PhraseApi, TextItem, TextPage};
use crate::config::SyncConfig;
use crate::credentials::Credential;

const API_KEY_HEADER: &str = "x-api-key";

/// reqwest-backed client for one credential
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpApi {
    pub fn new(credential: &Credential, config: &SyncConfig) -> Self {
        let origin = credential
            .custom_origin
            .as_deref()
            .unwrap_or(config.default_origin.as_str());
        Self {
            client: reqwest::Client::new(),
            base_url: format!(
                "{}{}",
                origin.trim_end_matches('/'),
                config.api_prefix.trim_end_matches('/')
            ),
            api_key: credential.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn texts_url(&self, file_id: &str) -> String {
        format!("{}/figma-files/{}/texts", self.base_url, file_id)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Phrase API responded {}: {}", status, body);
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PhraseApi for HttpApi {
    async fn create_texts(
        &self,
        file_id: &str,
        items: Vec<CreateTextItem>,
    ) -> Result<Vec<TextItem>, ApiError> {
        let body = CreateTextsRequest { items };
        let created: TextItems = self
            .send(self.client.post(self.texts_url(file_id)).json(&body))
            .await?;
        Ok(created.items)
    }

    async fn update_text(
        &self,
        file_id: &str,
        text_id: &str,
        content: &str,
    ) -> Result<TextItem, ApiError> {
        let url = format!("{}/{}", self.texts_url(file_id), text_id);
        let body = UpdateTextRequest {
            content: content.to_string(),
        };
        self.send(self.client.patch(url).json(&body)).await
    }

    async fn list_texts(
        &self,
        file_id: &str,
        page_node_id: &str,
        page: u32,
    ) -> Result<TextPage, ApiError> {
        let request = self
            .client
            .get(self.texts_url(file_id))
            .query(&[("pageNodeId", page_node_id.to_string()), ("page", page.to_string())]);
        self.send(request).await
    }

    async fn me(&self) -> Result<Me, ApiError> {
        self.send(self.client.get(format!("{}/me", self.base_url)))
            .await
    }
}
