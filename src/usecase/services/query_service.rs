use std::sync::Arc;

use crate::domain::entities::page::PageResponse;
use crate::usecase::ports::fetcher::{EntityFetcher, FetchError};
use crate::usecase::services::collection_controller::FetchTicket;

/// Runs controller tickets against a resource's fetcher.
#[derive(Clone)]
pub struct QueryService {
    fetcher: Arc<dyn EntityFetcher>,
}

impl QueryService {
    pub fn new(fetcher: Arc<dyn EntityFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn run(&self, ticket: &FetchTicket) -> Result<PageResponse, FetchError> {
        self.fetcher.fetch(&ticket.request).await
    }
}
