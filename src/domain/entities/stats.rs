use std::collections::BTreeMap;

use crate::domain::entities::entity::Entity;

pub const MISSING_LABEL: &str = "(unspecified)";

/// Counts entities per distinct value of `field`.
pub fn count_by(entities: &[Entity], field: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entity in entities {
        let value = entity.text(field);
        let key = if value.trim().is_empty() {
            MISSING_LABEL.to_string()
        } else {
            value
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}
