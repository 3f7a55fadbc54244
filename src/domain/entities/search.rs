use crate::domain::entities::entity::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    pub term: String,
    pub fields: Vec<String>,
}

impl SearchState {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            term: String::new(),
            fields: fields.iter().map(|field| field.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        let term = self.term.to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.fields
            .iter()
            .any(|field| entity.text(field).to_lowercase().contains(&term))
    }

    pub fn apply(&self, entities: &[Entity]) -> Vec<Entity> {
        entities
            .iter()
            .filter(|entity| self.matches(entity))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::entity::AttrValue;

    fn entity(id: &str, admission: &str) -> Entity {
        Entity::new(id).with(
            "studentAdmissionNumber",
            AttrValue::Text(admission.to_string()),
        )
    }

    #[test]
    fn matches_case_insensitively_across_fields() {
        let mut search = SearchState::new(&["studentName", "studentAdmissionNumber"]);
        search.term = "adm1".to_string();

        assert!(search.matches(&entity("1", "ADM1001")));
        assert!(!search.matches(&entity("2", "ADM2001")));
    }

    #[test]
    fn missing_search_field_reads_as_empty() {
        let mut search = SearchState::new(&["nowhere"]);
        search.term = "x".to_string();
        assert!(!search.matches(&entity("1", "x")));

        search.term.clear();
        assert!(search.matches(&entity("1", "x")));
    }

    #[test]
    fn whitespace_in_term_is_significant() {
        let mut search = SearchState::new(&["studentAdmissionNumber"]);
        search.term = " ".to_string();
        assert!(!search.is_empty());
        assert!(!search.matches(&entity("1", "ADM1001")));
        assert!(search.matches(&entity("2", "ADM 1001")));

        search.term = "ADM 1".to_string();
        assert!(!search.matches(&entity("1", "ADM1001")));
    }
}
