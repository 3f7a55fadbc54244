use std::ops::Range;

use crate::domain::entities::page::{total_pages, PageRequest};

/// How the backend delivers a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Unpaged,
    Paged { server_page_size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// Whole collection held; slice in memory.
    Local,
    /// Loaded server page holds the client page starting at `offset`.
    RemoteAligned { offset: usize },
    /// Client page lives on a server page that is not loaded.
    RemoteFetchRequired(PageRequest),
}

/// Items of the collection actually held from the last server page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedWindow {
    pub page_index: usize,
    pub page_size: usize,
    pub len: usize,
}

impl LoadedWindow {
    fn start(&self) -> usize {
        self.page_index * self.page_size
    }

    fn end(&self) -> usize {
        self.start() + self.len
    }

    /// A short page is the collection's last one, so a client page cut off
    /// by its end is still whole.
    fn holds(&self, first_item: usize, client_page_size: usize) -> bool {
        first_item >= self.start()
            && first_item < self.end()
            && (first_item + client_page_size <= self.end() || self.len < self.page_size)
    }
}

/// Maps one-based client pages onto zero-based server pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCoordinator {
    source: PageSource,
    client_page_size: usize,
    loaded: Option<LoadedWindow>,
}

/// Server page size rounded down to whole client pages, never below one.
pub fn align_server_page_size(server_page_size: usize, client_page_size: usize) -> usize {
    let client_page_size = client_page_size.max(1);
    if server_page_size <= client_page_size {
        client_page_size
    } else {
        server_page_size - server_page_size % client_page_size
    }
}

impl PaginationCoordinator {
    pub fn new(source: PageSource, client_page_size: usize) -> Self {
        let client_page_size = client_page_size.max(1);
        let source = match source {
            PageSource::Unpaged => PageSource::Unpaged,
            PageSource::Paged { server_page_size } => PageSource::Paged {
                server_page_size: align_server_page_size(server_page_size, client_page_size),
            },
        };
        Self {
            source,
            client_page_size,
            loaded: None,
        }
    }

    pub fn source(&self) -> PageSource {
        self.source
    }

    pub fn client_page_size(&self) -> usize {
        self.client_page_size
    }

    /// Records the server page now held. `page_size` is the size the page
    /// was cut with, `len` the rows actually received.
    pub fn mark_loaded(&mut self, page_index: usize, page_size: usize, len: usize) {
        self.loaded = Some(LoadedWindow {
            page_index,
            page_size: page_size.max(1),
            len,
        });
    }

    /// Switches to a smaller page size the backend imposed. Later requests
    /// use it, rounded down to whole client pages.
    pub fn adopt_server_page_size(&mut self, server_page_size: usize) {
        if let PageSource::Paged { .. } = self.source {
            self.source = PageSource::Paged {
                server_page_size: align_server_page_size(server_page_size, self.client_page_size),
            };
        }
    }

    pub fn total_pages(&self, total_elements: usize) -> usize {
        total_pages(total_elements, self.client_page_size)
    }

    /// Clamps any requested page into `[1, max(1, total_pages)]`.
    pub fn clamp(&self, requested: i64, total_elements: usize) -> usize {
        let last = self.total_pages(total_elements).max(1);
        if requested < 1 {
            1
        } else {
            usize::try_from(requested).map_or(last, |page| page.min(last))
        }
    }

    /// Server page request that covers `client_page`; `None` when unpaged.
    pub fn request_for(&self, client_page: usize) -> Option<PageRequest> {
        match self.source {
            PageSource::Unpaged => None,
            PageSource::Paged { server_page_size } => {
                let first_item = client_page.saturating_sub(1) * self.client_page_size;
                Some(PageRequest {
                    page_index: first_item / server_page_size,
                    page_size: server_page_size,
                })
            }
        }
    }

    pub fn resolve(&self, client_page: usize) -> PaginationState {
        let Some(request) = self.request_for(client_page) else {
            return PaginationState::Local;
        };
        let first_item = client_page.saturating_sub(1) * self.client_page_size;
        match self.loaded {
            Some(window) if window.holds(first_item, self.client_page_size) => {
                PaginationState::RemoteAligned {
                    offset: first_item - window.start(),
                }
            }
            _ => PaginationState::RemoteFetchRequired(request),
        }
    }

    /// Index range of `client_page` within the `held_len` items held locally.
    pub fn slice_range(&self, client_page: usize, held_len: usize) -> Range<usize> {
        let start = match self.resolve(client_page) {
            PaginationState::Local => client_page.saturating_sub(1) * self.client_page_size,
            PaginationState::RemoteAligned { offset } => offset,
            PaginationState::RemoteFetchRequired(_) => return 0..0,
        };
        let start = start.min(held_len);
        let end = (start + self.client_page_size).min(held_len);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(server: usize, client: usize) -> PaginationCoordinator {
        PaginationCoordinator::new(
            PageSource::Paged {
                server_page_size: server,
            },
            client,
        )
    }

    #[test]
    fn server_page_size_aligns_to_client_pages() {
        assert_eq!(align_server_page_size(100, 10), 100);
        assert_eq!(align_server_page_size(100, 30), 90);
        assert_eq!(align_server_page_size(5, 10), 10);
        assert_eq!(
            paged(25, 10).source(),
            PageSource::Paged {
                server_page_size: 20
            }
        );
    }

    #[test]
    fn clamp_bounds_any_request() {
        let coordinator = PaginationCoordinator::new(PageSource::Unpaged, 10);
        assert_eq!(coordinator.clamp(-4, 25), 1);
        assert_eq!(coordinator.clamp(0, 25), 1);
        assert_eq!(coordinator.clamp(2, 25), 2);
        assert_eq!(coordinator.clamp(99, 25), 3);
        assert_eq!(coordinator.clamp(5, 0), 1);
        assert_eq!(coordinator.clamp(i64::MAX, 25), 3);
    }

    #[test]
    fn resolve_requires_fetch_across_server_boundary() {
        let mut coordinator = paged(100, 10);
        assert_eq!(
            coordinator.resolve(1),
            PaginationState::RemoteFetchRequired(PageRequest {
                page_index: 0,
                page_size: 100
            })
        );

        coordinator.mark_loaded(0, 100, 100);
        assert_eq!(
            coordinator.resolve(2),
            PaginationState::RemoteAligned { offset: 10 }
        );
        assert_eq!(
            coordinator.resolve(10),
            PaginationState::RemoteAligned { offset: 90 }
        );
        assert_eq!(
            coordinator.resolve(11),
            PaginationState::RemoteFetchRequired(PageRequest {
                page_index: 1,
                page_size: 100
            })
        );
    }

    #[test]
    fn slice_range_stops_at_held_items() {
        let local = PaginationCoordinator::new(PageSource::Unpaged, 10);
        assert_eq!(local.slice_range(3, 25), 20..25);
        assert_eq!(local.slice_range(4, 25), 25..25);

        let mut remote = paged(100, 10);
        remote.mark_loaded(1, 100, 35);
        assert_eq!(remote.slice_range(12, 35), 10..20);
        assert_eq!(remote.slice_range(14, 35), 30..35);
        assert_eq!(remote.slice_range(1, 35), 0..0);
    }

    #[test]
    fn rows_beyond_a_capped_server_page_need_a_fetch() {
        let mut coordinator = paged(100, 10);
        coordinator.mark_loaded(0, 50, 50);

        assert_eq!(
            coordinator.resolve(5),
            PaginationState::RemoteAligned { offset: 40 }
        );
        assert!(matches!(
            coordinator.resolve(6),
            PaginationState::RemoteFetchRequired(_)
        ));
        assert_eq!(coordinator.slice_range(6, 50), 0..0);

        coordinator.adopt_server_page_size(50);
        assert_eq!(
            coordinator.request_for(6),
            Some(PageRequest {
                page_index: 1,
                page_size: 50
            })
        );
    }

    #[test]
    fn unaligned_window_never_yields_a_partial_client_page() {
        let mut coordinator = paged(100, 10);
        coordinator.mark_loaded(0, 25, 25);

        assert_eq!(
            coordinator.resolve(2),
            PaginationState::RemoteAligned { offset: 10 }
        );
        assert!(matches!(
            coordinator.resolve(3),
            PaginationState::RemoteFetchRequired(_)
        ));
    }
}
