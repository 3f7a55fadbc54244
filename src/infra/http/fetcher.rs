use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::domain::entities::page::PageResponse;
use crate::domain::entities::resource::ResourceKind;
use crate::domain::entities::session::Session;
use crate::infra::http::decode::decode_response;
use crate::usecase::ports::fetcher::{EntityFetcher, FetchError, FetchRequest};

const API_PREFIX: &str = "/api/v1";

/// REST fetcher for one resource collection.
pub struct HttpEntityFetcher {
    client: Client,
    base_url: String,
    resource: ResourceKind,
    session: Option<Arc<Session>>,
}

impl HttpEntityFetcher {
    pub fn new(
        base_url: &str,
        resource: ResourceKind,
        session: Option<Arc<Session>>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            resource,
            session,
        })
    }

    /// `GET .../get` for plain listings, `POST .../<filtered-query>` when
    /// the backend resolves filters.
    pub fn endpoint(&self, request: &FetchRequest) -> String {
        let action = if request.query.is_empty() {
            "get"
        } else {
            self.resource.filtered_query_path()
        };
        format!(
            "{}{API_PREFIX}/{}/{action}",
            self.base_url,
            self.resource.path()
        )
    }

    fn build(&self, request: &FetchRequest) -> RequestBuilder {
        let url = self.endpoint(request);
        let builder = if request.query.is_empty() {
            let builder = self.client.get(&url);
            match request.page {
                Some(page) => builder.query(&[("page", page.page_index), ("size", page.page_size)]),
                None => builder,
            }
        } else {
            self.client
                .post(&url)
                .body(request.query.to_body(request.page).to_string())
        };
        let builder = builder.header(CONTENT_TYPE, "application/json");
        match &self.session {
            Some(session) => builder.header(AUTHORIZATION, session.bearer()),
            None => builder,
        }
    }
}

#[async_trait]
impl EntityFetcher for HttpEntityFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<PageResponse, FetchError> {
        debug!(
            resource = self.resource.path(),
            page = ?request.page,
            filtered = !request.query.is_empty(),
            "fetching collection"
        );
        let response = self
            .build(request)
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;

        decode_response(status, &body, request, self.resource.id_field())
    }
}
