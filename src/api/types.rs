//! Request and response bodies of the phrase API

use serde::{Deserialize, Deserializer, Serialize};

/// One text to create remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTextItem {
    pub phrase_key: Option<String>,
    pub content: String,
    pub text_node_id: String,
    pub page_node_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTextsRequest {
    pub items: Vec<CreateTextItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTextRequest {
    pub content: String,
}

/// A text as the remote knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub phrase_id: String,
    #[serde(default)]
    pub phrase_key: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub text_node_id: Option<String>,
    #[serde(default)]
    pub page_node_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextItems {
    pub items: Vec<TextItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub pages_count: u32,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One page of the text listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPage {
    pub items: Vec<TextItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub key: String,
}

/// Body of `GET /me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub workspace: Workspace,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// The API hands out numeric ids in some places and strings in others
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_item_accepts_numeric_ids() {
        let item: TextItem = serde_json::from_str(
            r#"{"id": 12, "phraseId": "340", "phraseKey": "home.title", "content": "Welcome"}"#,
        )
        .unwrap();
        assert_eq!(item.id, "12");
        assert_eq!(item.phrase_id, "340");
        assert_eq!(item.text_node_id, None);
    }

    #[test]
    fn test_create_request_shape() {
        let body = CreateTextsRequest {
            items: vec![CreateTextItem {
                phrase_key: None,
                content: "Welcome".into(),
                text_node_id: "1:2".into(),
                page_node_id: "0:1".into(),
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["items"][0]["phraseKey"], serde_json::Value::Null);
        assert_eq!(json["items"][0]["textNodeId"], "1:2");
        assert_eq!(json["items"][0]["pageNodeId"], "0:1");
    }

    #[test]
    fn test_text_page_pagination() {
        let page: TextPage = serde_json::from_str(
            r#"{"items": [], "pagination": {"pagesCount": 3, "page": 1, "total": 250}}"#,
        )
        .unwrap();
        assert_eq!(page.pagination.pages_count, 3);
    }

    #[test]
    fn test_me_body() {
        let me: Me = serde_json::from_str(
            r#"{"workspace": {"id": 5, "key": "acme"}, "firstName": "Ada", "lastName": "L"}"#,
        )
        .unwrap();
        assert_eq!(me.workspace.id, "5");
        assert_eq!(me.workspace.key, "acme");
    }
}
