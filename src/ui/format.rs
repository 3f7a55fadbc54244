use crate::domain::entities::entity::{AttrValue, Entity};
use crate::usecase::services::collection_controller::CollectionView;

/// "Showing 21–25 of 25" line under a table.
pub fn showing_label(view: &CollectionView, page_size: usize) -> String {
    if view.total_elements == 0 {
        return "No records".to_string();
    }
    let first = (view.client_page.saturating_sub(1)) * page_size + 1;
    let last = (first + view.items.len()).saturating_sub(1).max(first);
    format!("Showing {first}–{last} of {}", view.total_elements)
}

pub fn cell_text(entity: &Entity, field: &str) -> String {
    match entity.get(field) {
        Some(AttrValue::Bool(true)) => "Yes".to_string(),
        Some(AttrValue::Bool(false)) => "No".to_string(),
        Some(value) => value.as_text(),
        None => "—".to_string(),
    }
}

pub fn table_container_style() -> &'static str {
    "flex: 1; min-height: 0; overflow: auto; border: 1px solid #ddd; border-radius: 6px;"
}

pub fn table_header_cell_style() -> &'static str {
    "position: sticky; top: 0; background: #f5f7fa; text-align: left; padding: 6px 10px; border-bottom: 1px solid #ddd; z-index: 1;"
}
