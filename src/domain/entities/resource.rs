use crate::domain::entities::filter::{FilterKind, FilterSet, FilterSpec};
use crate::domain::entities::search::SearchState;

/// Collections shown on the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Students,
    Programs,
    Institutions,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub label: &'static str,
}

const fn column(field: &'static str, label: &'static str) -> Column {
    Column { field, label }
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Institutions,
        ResourceKind::Programs,
        ResourceKind::Staff,
        ResourceKind::Students,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Students => "Students",
            ResourceKind::Programs => "Programs",
            ResourceKind::Institutions => "Institutions",
            ResourceKind::Staff => "Staff",
        }
    }

    /// Path segment under `/api/v1/`.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Students => "students",
            ResourceKind::Programs => "programs",
            ResourceKind::Institutions => "institutions",
            ResourceKind::Staff => "staff",
        }
    }

    pub fn filtered_query_path(self) -> &'static str {
        "filter"
    }

    pub fn id_field(self) -> &'static str {
        match self {
            ResourceKind::Students => "studentId",
            ResourceKind::Programs => "programId",
            ResourceKind::Institutions => "institutionId",
            ResourceKind::Staff => "staffId",
        }
    }

    pub fn search_fields(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Students => &[
                "studentFirstName",
                "studentLastName",
                "studentAdmissionNumber",
            ],
            ResourceKind::Programs => &["programName", "programCode"],
            ResourceKind::Institutions => &["institutionName", "institutionRegistrationNumber"],
            ResourceKind::Staff => &["staffFirstName", "staffLastName", "staffEmail"],
        }
    }

    pub fn default_search(self) -> SearchState {
        SearchState::new(self.search_fields())
    }

    pub fn default_filters(self) -> FilterSet {
        let exact = FilterKind::Equality {
            case_sensitive: true,
        };
        let loose = FilterKind::Equality {
            case_sensitive: false,
        };
        let specs = match self {
            ResourceKind::Students => vec![
                FilterSpec::new("studentGender", exact),
                FilterSpec::new("programName", FilterKind::Substring),
                FilterSpec::new("institutionName", loose),
                FilterSpec::new("isGraduated", FilterKind::Boolean),
                FilterSpec::new("studentAge", FilterKind::NumericRange),
                FilterSpec::new("enrollmentDate", FilterKind::DateRange),
            ],
            ResourceKind::Programs => vec![
                FilterSpec::new("programLevel", loose),
                FilterSpec::new("isAccredited", FilterKind::Boolean),
                FilterSpec::new("programDuration", FilterKind::NumericRange),
            ],
            ResourceKind::Institutions => vec![
                FilterSpec::new("institutionType", loose),
                FilterSpec::new("region", loose),
                FilterSpec::new("isActive", FilterKind::Boolean),
            ],
            ResourceKind::Staff => vec![
                FilterSpec::new("staffGender", exact),
                FilterSpec::new("staffRole", loose),
                FilterSpec::new("employmentDate", FilterKind::DateRange),
            ],
        };
        FilterSet::new(specs)
    }

    pub fn columns(self) -> &'static [Column] {
        const STUDENTS: &[Column] = &[
            column("studentAdmissionNumber", "Admission No."),
            column("studentFirstName", "First name"),
            column("studentLastName", "Last name"),
            column("studentGender", "Gender"),
            column("programName", "Program"),
            column("institutionName", "Institution"),
        ];
        const PROGRAMS: &[Column] = &[
            column("programCode", "Code"),
            column("programName", "Program"),
            column("programLevel", "Level"),
            column("programDuration", "Duration"),
            column("isAccredited", "Accredited"),
        ];
        const INSTITUTIONS: &[Column] = &[
            column("institutionRegistrationNumber", "Reg. No."),
            column("institutionName", "Institution"),
            column("institutionType", "Type"),
            column("region", "Region"),
            column("isActive", "Active"),
        ];
        const STAFF: &[Column] = &[
            column("staffFirstName", "First name"),
            column("staffLastName", "Last name"),
            column("staffEmail", "Email"),
            column("staffRole", "Role"),
            column("employmentDate", "Employed"),
        ];
        match self {
            ResourceKind::Students => STUDENTS,
            ResourceKind::Programs => PROGRAMS,
            ResourceKind::Institutions => INSTITUTIONS,
            ResourceKind::Staff => STAFF,
        }
    }

    /// Field whose distribution is shown as summary cards.
    pub fn summary_field(self) -> &'static str {
        match self {
            ResourceKind::Students => "studentGender",
            ResourceKind::Programs => "programLevel",
            ResourceKind::Institutions => "institutionType",
            ResourceKind::Staff => "staffRole",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_start_unset() {
        for kind in ResourceKind::ALL {
            let filters = kind.default_filters();
            assert!(!filters.has_active(), "{kind:?} should start unfiltered");
            assert!(!kind.search_fields().is_empty());
        }
    }
}
