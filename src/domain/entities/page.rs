use crate::domain::entities::entity::Entity;

/// Zero-based server page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub data: Vec<Entity>,
    pub page_index: usize,
    pub page_size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl PageResponse {
    /// Whole collection delivered as one page.
    pub fn unpaged(data: Vec<Entity>) -> Self {
        let total_elements = data.len();
        Self {
            data,
            page_index: 0,
            page_size: total_elements,
            total_elements,
            total_pages: 1,
        }
    }

    pub fn paged(data: Vec<Entity>, request: PageRequest, total_elements: usize) -> Self {
        Self {
            data,
            page_index: request.page_index,
            page_size: request.page_size,
            total_elements,
            total_pages: total_pages(total_elements, request.page_size),
        }
    }
}

/// One-based page position as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientViewState {
    pub client_page: usize,
    pub client_page_size: usize,
}

pub fn total_pages(total_elements: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_elements.div_ceil(page_size)
}
