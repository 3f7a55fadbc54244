use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::entities::entity::Entity;
use crate::domain::entities::filter::{FilterSet, FilterValue};
use crate::domain::entities::page::{ClientViewState, PageResponse};
use crate::domain::entities::resource::ResourceKind;
use crate::domain::entities::search::SearchState;
use crate::usecase::ports::fetcher::{EntityFetcher, FetchError, FetchRequest, FilterQuery};
use crate::usecase::services::pagination::{PageSource, PaginationCoordinator, PaginationState};

/// Where filter and search predicates are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Client,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub source: PageSource,
    pub client_page_size: usize,
    pub filter_mode: FilterMode,
}

/// Handle for one issued fetch. Feed the outcome back through
/// [`CollectionController::complete`] with the same generation.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: u64,
    pub request: FetchRequest,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingFetch {
    generation: u64,
    request: FetchRequest,
    client_page: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionView {
    pub items: Vec<Entity>,
    pub client_page: usize,
    pub total_pages: usize,
    pub total_elements: usize,
    pub is_loading: bool,
    pub error: Option<FetchError>,
}

/// Filtered, searched, paginated view over one remote collection.
///
/// Operations never block: those that need data return a [`FetchTicket`],
/// and the caller runs the fetch and reports back. Only the most recently
/// issued ticket is applied; older completions are dropped.
#[derive(Debug, Clone)]
pub struct CollectionController {
    filter_mode: FilterMode,
    coordinator: PaginationCoordinator,
    filters: FilterSet,
    search: SearchState,
    loaded: Option<PageResponse>,
    loaded_query: Option<FilterQuery>,
    client_page: usize,
    generation: u64,
    pending: Option<PendingFetch>,
    failed: Option<PendingFetch>,
    error: Option<FetchError>,
    resized: bool,
}

impl CollectionController {
    pub fn new(config: ControllerConfig, filters: FilterSet, search: SearchState) -> Self {
        Self {
            filter_mode: config.filter_mode,
            coordinator: PaginationCoordinator::new(config.source, config.client_page_size),
            filters,
            search,
            loaded: None,
            loaded_query: None,
            client_page: 1,
            generation: 0,
            pending: None,
            failed: None,
            error: None,
            resized: false,
        }
    }

    pub fn for_resource(kind: ResourceKind, config: ControllerConfig) -> Self {
        Self::new(config, kind.default_filters(), kind.default_search())
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn coordinator(&self) -> &PaginationCoordinator {
        &self.coordinator
    }

    pub fn client_state(&self) -> ClientViewState {
        ClientViewState {
            client_page: self.client_page,
            client_page_size: self.coordinator.client_page_size(),
        }
    }

    /// Initial fetch for a freshly mounted screen.
    pub fn load(&mut self) -> FetchTicket {
        let request = self.request_for(1);
        self.issue(request, 1)
    }

    pub fn set_filter(&mut self, field: &str, value: FilterValue) -> Option<FetchTicket> {
        self.filters.set(field, value);
        self.navigate(1)
    }

    /// Like [`set_filter`](Self::set_filter), parsing raw input for the field's kind.
    pub fn set_filter_input(&mut self, field: &str, raw: &str) -> Option<FetchTicket> {
        let value = match self.filters.get(field) {
            Some(spec) => FilterValue::parse(spec.kind, raw),
            None if raw.trim().is_empty() => FilterValue::Unset,
            None => FilterValue::Text(raw.trim().to_string()),
        };
        self.set_filter(field, value)
    }

    pub fn set_search(&mut self, term: &str) -> Option<FetchTicket> {
        self.search.term = term.to_string();
        self.navigate(1)
    }

    pub fn go_to_page(&mut self, page: i64) -> Option<FetchTicket> {
        let target = self.coordinator.clamp(page, self.total_elements());
        self.navigate(target)
    }

    pub fn reset(&mut self) -> FetchTicket {
        self.filters.reset();
        self.search.term.clear();
        self.failed = None;
        let request = self.request_for(1);
        self.issue(request, 1)
    }

    /// Re-issues the request that last failed, if any.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        let failed = self.failed.take()?;
        Some(self.issue(failed.request, failed.client_page))
    }

    /// After the backend shrank its page size, the page just received may
    /// not hold the current client page. Fetches the one that does, once.
    pub fn refill(&mut self) -> Option<FetchTicket> {
        if !std::mem::take(&mut self.resized) || self.pending.is_some() || self.loaded.is_none() {
            return None;
        }
        self.navigate(self.client_page)
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Applies a fetch outcome. Returns `false` when the ticket was
    /// superseded and the outcome was discarded.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<PageResponse, FetchError>,
    ) -> bool {
        let Some(pending) = self.pending.take_if(|p| p.generation == generation) else {
            debug!(generation, latest = self.generation, "discarding stale fetch result");
            return false;
        };

        match result {
            Ok(response) => {
                if let (PageSource::Paged { .. }, Some(requested)) =
                    (self.coordinator.source(), pending.request.page)
                {
                    let capped =
                        response.page_size > 0 && response.page_size < requested.page_size;
                    let page_size = if capped {
                        debug!(
                            requested = requested.page_size,
                            served = response.page_size,
                            "backend capped page size"
                        );
                        self.coordinator.adopt_server_page_size(response.page_size);
                        self.resized = true;
                        response.page_size
                    } else {
                        requested.page_size
                    };
                    self.coordinator
                        .mark_loaded(response.page_index, page_size, response.data.len());
                }
                debug!(
                    generation,
                    page_index = response.page_index,
                    received = response.data.len(),
                    total = response.total_elements,
                    "fetch applied"
                );
                self.loaded = Some(response);
                self.loaded_query = Some(pending.request.query);
                self.failed = None;
                self.error = None;
                let target = i64::try_from(pending.client_page).unwrap_or(i64::MAX);
                self.client_page = self.coordinator.clamp(target, self.total_elements());
            }
            Err(err) => {
                warn!(generation, error = %err, "fetch failed, keeping last view");
                self.error = Some(err);
                self.failed = Some(pending);
            }
        }
        true
    }

    /// Runs `ticket` against `fetcher` and applies the outcome.
    pub async fn run<F>(&mut self, fetcher: &F, ticket: FetchTicket) -> bool
    where
        F: EntityFetcher + ?Sized,
    {
        let result = fetcher.fetch(&ticket.request).await;
        self.complete(ticket.generation, result)
    }

    pub fn view(&self) -> CollectionView {
        let items = match &self.loaded {
            Some(response) => self.visible_items(response),
            None => Vec::new(),
        };
        let total_elements = self.total_elements();
        CollectionView {
            items,
            client_page: self.client_page,
            total_pages: self.coordinator.total_pages(total_elements),
            total_elements,
            is_loading: self.pending.is_some(),
            error: self.error.clone(),
        }
    }

    /// Every locally held entity that passes the active filters and search.
    pub fn working_set(&self) -> Vec<Entity> {
        let Some(response) = &self.loaded else {
            return Vec::new();
        };
        match self.filter_mode {
            FilterMode::Client => self.search.apply(&self.filters.apply(&response.data)),
            FilterMode::Server => response.data.clone(),
        }
    }

    /// Predicates are evaluated over the held rows, and pages are cut from
    /// what passes.
    fn filters_locally(&self) -> bool {
        match (self.coordinator.source(), self.filter_mode) {
            (_, FilterMode::Server) => false,
            (PageSource::Unpaged, FilterMode::Client) => true,
            (PageSource::Paged { .. }, FilterMode::Client) => {
                self.filters.has_active() || !self.search.is_empty()
            }
        }
    }

    fn total_elements(&self) -> usize {
        let Some(response) = &self.loaded else {
            return 0;
        };
        if self.filters_locally() {
            return response
                .data
                .iter()
                .filter(|entity| self.passes(entity))
                .count();
        }
        match self.coordinator.source() {
            PageSource::Unpaged => response.data.len(),
            PageSource::Paged { .. } => response.total_elements,
        }
    }

    fn passes(&self, entity: &Entity) -> bool {
        self.filters.matches(entity) && self.search.matches(entity)
    }

    fn visible_items(&self, response: &PageResponse) -> Vec<Entity> {
        if self.filters_locally() {
            let working = self.working_set();
            let range = local_range(
                self.client_page,
                self.coordinator.client_page_size(),
                working.len(),
            );
            return working[range].to_vec();
        }
        let range = match self.coordinator.source() {
            PageSource::Unpaged => local_range(
                self.client_page,
                self.coordinator.client_page_size(),
                response.data.len(),
            ),
            PageSource::Paged { .. } => self
                .coordinator
                .slice_range(self.client_page, response.data.len()),
        };
        response.data[range].to_vec()
    }

    fn server_query(&self) -> FilterQuery {
        match self.filter_mode {
            FilterMode::Client => FilterQuery::default(),
            FilterMode::Server => FilterQuery {
                filters: self.filters.to_query(),
                search: Some(self.search.term.clone()).filter(|t| !t.is_empty()),
            },
        }
    }

    fn request_for(&self, client_page: usize) -> FetchRequest {
        FetchRequest {
            page: self.coordinator.request_for(client_page),
            query: self.server_query(),
        }
    }

    fn navigate(&mut self, target: usize) -> Option<FetchTicket> {
        let request = self.request_for(target);

        if let Some(pending) = self.pending.as_mut() {
            if pending.request == request {
                pending.client_page = target;
                return None;
            }
        }

        let same_query = self.loaded_query.as_ref() == Some(&request.query);
        let served_locally = same_query
            && (self.filters_locally()
                || match self.coordinator.resolve(target) {
                    PaginationState::Local | PaginationState::RemoteAligned { .. } => true,
                    PaginationState::RemoteFetchRequired(_) => false,
                });

        if served_locally {
            if let Some(superseded) = self.pending.take() {
                debug!(
                    generation = superseded.generation,
                    "in-flight fetch superseded by local navigation"
                );
            }
            self.client_page = target;
            return None;
        }

        Some(self.issue(request, target))
    }

    fn issue(&mut self, request: FetchRequest, client_page: usize) -> FetchTicket {
        self.generation += 1;
        debug!(
            generation = self.generation,
            page = ?request.page,
            client_page,
            "issuing fetch"
        );
        self.pending = Some(PendingFetch {
            generation: self.generation,
            request: request.clone(),
            client_page,
        });
        FetchTicket {
            generation: self.generation,
            request,
        }
    }
}

fn local_range(client_page: usize, client_page_size: usize, held_len: usize) -> Range<usize> {
    let start = (client_page.saturating_sub(1) * client_page_size).min(held_len);
    start..(start + client_page_size).min(held_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::entity::AttrValue;
    use crate::domain::entities::page::PageRequest;

    fn entities(count: usize) -> Vec<Entity> {
        (1..=count)
            .map(|n| Entity::new(n.to_string()).with("n", AttrValue::Number(n as f64)))
            .collect()
    }

    fn local_controller(page_size: usize) -> CollectionController {
        CollectionController::new(
            ControllerConfig {
                source: PageSource::Unpaged,
                client_page_size: page_size,
                filter_mode: FilterMode::Client,
            },
            FilterSet::default(),
            SearchState::new(&["n"]),
        )
    }

    #[test]
    fn load_requests_whole_collection_when_unpaged() {
        let mut controller = local_controller(10);
        let ticket = controller.load();

        assert_eq!(ticket.request.page, None);
        assert!(controller.view().is_loading);

        assert!(controller.complete(ticket.generation, Ok(PageResponse::unpaged(entities(3)))));
        let view = controller.view();
        assert!(!view.is_loading);
        assert_eq!(view.items.len(), 3);
    }

    #[test]
    fn search_change_during_initial_load_does_not_refetch() {
        let mut controller = local_controller(10);
        let ticket = controller.load();

        assert!(controller.set_search("1").is_none());
        assert!(controller.complete(ticket.generation, Ok(PageResponse::unpaged(entities(12)))));

        let ids: Vec<String> = controller.view().items.iter().map(|e| e.id.0.clone()).collect();
        assert_eq!(ids, vec!["1", "10", "11", "12"]);
    }

    #[test]
    fn local_navigation_supersedes_in_flight_fetch() {
        let mut controller = CollectionController::new(
            ControllerConfig {
                source: PageSource::Paged {
                    server_page_size: 20,
                },
                client_page_size: 10,
                filter_mode: FilterMode::Client,
            },
            FilterSet::default(),
            SearchState::default(),
        );
        let first = controller.load();
        controller.complete(
            first.generation,
            Ok(PageResponse::paged(
                entities(20),
                PageRequest {
                    page_index: 0,
                    page_size: 20,
                },
                60,
            )),
        );

        let away = controller.go_to_page(5).expect("page 5 lives on server page 2");
        assert!(controller.go_to_page(2).is_none());
        assert!(!controller.complete(away.generation, Ok(PageResponse::unpaged(vec![]))));

        let view = controller.view();
        assert_eq!(view.client_page, 2);
        assert_eq!(view.items.first().map(|e| e.id.0.as_str()), Some("11"));
    }

    #[test]
    fn retry_reissues_failed_request() {
        let mut controller = local_controller(10);
        let ticket = controller.load();
        controller.complete(ticket.generation, Err(FetchError::Network("refused".into())));

        assert!(controller.view().error.is_some());
        let retry = controller.retry().expect("failed request should be retryable");
        assert_eq!(retry.request, ticket.request);
        assert!(controller.retry().is_none());

        controller.complete(retry.generation, Ok(PageResponse::unpaged(entities(2))));
        assert_eq!(controller.view().error, None);
    }

    #[test]
    fn server_mode_sends_filters_and_search() {
        let mut controller = CollectionController::for_resource(
            ResourceKind::Students,
            ControllerConfig {
                source: PageSource::Paged {
                    server_page_size: 50,
                },
                client_page_size: 10,
                filter_mode: FilterMode::Server,
            },
        );
        let first = controller.load();
        controller.complete(
            first.generation,
            Ok(PageResponse::paged(
                entities(50),
                PageRequest {
                    page_index: 0,
                    page_size: 50,
                },
                50,
            )),
        );

        let ticket = controller
            .set_filter_input("studentGender", "Female")
            .expect("server-side filter change refetches");

        assert_eq!(
            ticket.request.query.filters.get("studentGender"),
            Some(&serde_json::Value::String("Female".into()))
        );
        assert_eq!(ticket.request.page.map(|p| p.page_index), Some(0));
    }

    #[test]
    fn dismiss_error_clears_banner() {
        let mut controller = local_controller(5);
        let ticket = controller.load();
        controller.complete(ticket.generation, Err(FetchError::Decode("eof".into())));
        controller.dismiss_error();
        assert_eq!(controller.view().error, None);
    }
}
