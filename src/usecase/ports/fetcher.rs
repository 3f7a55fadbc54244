use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::entities::page::{PageRequest, PageResponse};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Server { status: u16, message: Option<String> },
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Filter parameters resolved by the backend instead of locally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterQuery {
    pub filters: Map<String, Value>,
    pub search: Option<String>,
}

impl FilterQuery {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.search.is_none()
    }

    pub fn to_body(&self, page: Option<PageRequest>) -> Value {
        let mut body = self.filters.clone();
        if let Some(search) = &self.search {
            body.insert("search".to_string(), Value::String(search.clone()));
        }
        if let Some(page) = page {
            body.insert("page".to_string(), Value::from(page.page_index));
            body.insert("size".to_string(), Value::from(page.page_size));
        }
        Value::Object(body)
    }
}

/// One fetch: a single server page, or the whole collection when `page` is `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchRequest {
    pub page: Option<PageRequest>,
    pub query: FilterQuery,
}

#[async_trait]
pub trait EntityFetcher: Send + Sync {
    /// Retrieves a page (or the whole collection). Must not retry and must
    /// not touch shared state beyond the transport.
    async fn fetch(&self, request: &FetchRequest) -> Result<PageResponse, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_error_display_includes_message() {
        let err = FetchError::Server {
            status: 403,
            message: Some("forbidden".into()),
        };
        assert_eq!(err.to_string(), "server error 403: forbidden");

        let bare = FetchError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(bare.to_string(), "server error 500");
    }

    #[test]
    fn query_body_merges_filters_search_and_page() {
        let mut query = FilterQuery::default();
        query
            .filters
            .insert("studentGender".into(), Value::String("Female".into()));
        query.search = Some("adm".into());

        let body = query.to_body(Some(PageRequest {
            page_index: 2,
            page_size: 50,
        }));

        assert_eq!(
            body,
            json!({"studentGender": "Female", "search": "adm", "page": 2, "size": 50})
        );
    }
}
