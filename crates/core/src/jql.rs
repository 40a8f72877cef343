//! Filter criteria to JQL
//!
//! Turns the shorthand flags of `jtm list` into a single JQL query. The
//! builder never returns an unconstrained query: with no criteria it falls
//! back to the issues assigned to the current user.

use serde::{Deserialize, Serialize};

const CURRENT_ASSIGNEE: &str = "assignee = currentUser()";
const CURRENT_REPORTER: &str = "reporter = currentUser()";

/// Independent, optionally combined filter criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub assignee_is_current_user: bool,
    pub reporter_is_current_user: bool,
    pub project: Option<String>,
    pub include_statuses: Vec<String>,
    pub exclude_statuses: Vec<String>,
    pub labels: Vec<String>,
    /// Raw JQL that replaces every other criterion when non-empty
    pub raw_override: Option<String>,
}

/// Field used by the trailing `ORDER BY ... DESC` directive
///
/// Deserialized through [`FromStr`](std::str::FromStr), so config files and
/// CLI flags accept the same spellings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SortField {
    #[default]
    Created,
    Updated,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Created => "created",
            SortField::Updated => "updated",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            other => Err(format!(
                "Unknown sort field '{other}'. Valid options: created, updated"
            )),
        }
    }
}

impl TryFrom<String> for SortField {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Renders one value of a membership list
pub type Quoter = fn(&str) -> String;

/// Wraps the trimmed value in double quotes. Embedded quotes pass through untouched.
pub fn quote_verbatim(value: &str) -> String {
    format!("\"{}\"", value.trim())
}

/// Like [`quote_verbatim`], but backslash-escapes embedded quotes and backslashes.
pub fn quote_escaped(value: &str) -> String {
    let escaped = value.trim().replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Builds JQL from [`FilterCriteria`]
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    pub order_by: SortField,
    pub quote: Quoter,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            order_by: SortField::Created,
            quote: quote_verbatim,
        }
    }
}

impl QueryBuilder {
    pub fn new(order_by: SortField) -> Self {
        Self {
            order_by,
            ..Self::default()
        }
    }

    pub fn with_quoter(mut self, quote: Quoter) -> Self {
        self.quote = quote;
        self
    }

    /// Build the query string for `criteria`
    ///
    /// Clauses appear in a fixed order: assignee, reporter, project,
    /// status IN, status NOT IN, labels IN.
    pub fn build(&self, criteria: &FilterCriteria) -> String {
        if let Some(raw) = criteria.raw_override.as_deref() {
            if !raw.is_empty() {
                return raw.to_string();
            }
        }

        let mut clauses: Vec<String> = Vec::new();

        if criteria.assignee_is_current_user {
            clauses.push(CURRENT_ASSIGNEE.to_string());
        }
        if criteria.reporter_is_current_user {
            clauses.push(CURRENT_REPORTER.to_string());
        }
        if let Some(project) = criteria.project.as_deref().filter(|p| !p.is_empty()) {
            clauses.push(format!("project = {project}"));
        }
        if !criteria.include_statuses.is_empty() {
            clauses.push(format!(
                "status IN ({})",
                self.membership(&criteria.include_statuses)
            ));
        }
        if !criteria.exclude_statuses.is_empty() {
            clauses.push(format!(
                "status NOT IN ({})",
                self.membership(&criteria.exclude_statuses)
            ));
        }
        if !criteria.labels.is_empty() {
            clauses.push(format!("labels IN ({})", self.membership(&criteria.labels)));
        }

        if clauses.is_empty() {
            clauses.push(CURRENT_ASSIGNEE.to_string());
        }

        format!(
            "{} ORDER BY {} DESC",
            clauses.join(" AND "),
            self.order_by.as_str()
        )
    }

    fn membership(&self, values: &[String]) -> String {
        values
            .iter()
            .map(|v| (self.quote)(v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Build a query with the default builder (newest created first, no escaping)
pub fn build_query(criteria: &FilterCriteria) -> String {
    QueryBuilder::default().build(criteria)
}

/// Split comma-separated CLI shorthand (`"To Do, In Progress"`) into values
///
/// Segments are trimmed and empty segments dropped; order and duplicates are kept.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn all_criteria() -> FilterCriteria {
        FilterCriteria {
            assignee_is_current_user: true,
            reporter_is_current_user: true,
            project: Some("OPS".to_string()),
            include_statuses: strings(&["To Do"]),
            exclude_statuses: strings(&["Done"]),
            labels: strings(&["bug"]),
            raw_override: None,
        }
    }

    #[test]
    fn test_build_query_empty_criteria_defaults_to_current_user() {
        let query = build_query(&FilterCriteria::default());

        assert_eq!(query, "assignee = currentUser() ORDER BY created DESC");
    }

    #[test]
    fn test_build_query_override_wins_outright() {
        // Arrange: every other field is set too
        let criteria = FilterCriteria {
            raw_override: Some("key = OPS-1".to_string()),
            ..all_criteria()
        };

        // Act
        let query = build_query(&criteria);

        // Assert: no ordering directive, no other clause
        assert_eq!(query, "key = OPS-1");
    }

    #[test]
    fn test_build_query_empty_override_is_ignored() {
        let criteria = FilterCriteria {
            raw_override: Some(String::new()),
            project: Some("OPS".to_string()),
            ..Default::default()
        };

        assert_eq!(build_query(&criteria), "project = OPS ORDER BY created DESC");
    }

    #[test]
    fn test_build_query_project_and_statuses() {
        let criteria = FilterCriteria {
            project: Some("OPS".to_string()),
            include_statuses: strings(&["To Do", "In Progress"]),
            ..Default::default()
        };

        let query = build_query(&criteria);

        assert_eq!(
            query,
            "project = OPS AND status IN (\"To Do\", \"In Progress\") ORDER BY created DESC"
        );
    }

    #[test]
    fn test_build_query_clause_order_is_fixed() {
        let query = build_query(&all_criteria());

        let positions: Vec<usize> = [
            "assignee = currentUser()",
            "reporter = currentUser()",
            "project = OPS",
            "status IN (",
            "status NOT IN (",
            "labels IN (",
        ]
        .iter()
        .map(|needle| query.find(needle).expect("clause present"))
        .collect();

        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "clauses out of order: {query}"
        );
        assert!(query.ends_with(" ORDER BY created DESC"));
    }

    #[test]
    fn test_build_query_trims_values_and_keeps_duplicates() {
        let criteria = FilterCriteria {
            labels: strings(&[" bug", "bug ", "security"]),
            ..Default::default()
        };

        let query = build_query(&criteria);

        assert_eq!(
            query,
            "labels IN (\"bug\", \"bug\", \"security\") ORDER BY created DESC"
        );
    }

    #[test]
    fn test_build_query_does_not_escape_quotes_by_default() {
        let criteria = FilterCriteria {
            labels: strings(&["say \"hi\""]),
            ..Default::default()
        };

        assert_eq!(
            build_query(&criteria),
            "labels IN (\"say \"hi\"\") ORDER BY created DESC"
        );
    }

    #[test]
    fn test_query_builder_with_escaping_quoter_keeps_clause_order() {
        let builder = QueryBuilder::new(SortField::Updated).with_quoter(quote_escaped);
        let criteria = FilterCriteria {
            exclude_statuses: strings(&["Won't \"Fix\""]),
            labels: strings(&["a\\b"]),
            ..Default::default()
        };

        let query = builder.build(&criteria);

        assert_eq!(
            query,
            "status NOT IN (\"Won't \\\"Fix\\\"\") AND labels IN (\"a\\\\b\") ORDER BY updated DESC"
        );
    }

    #[test]
    fn test_query_builder_updated_sort_on_default_query() {
        let query = QueryBuilder::new(SortField::Updated).build(&FilterCriteria::default());

        assert_eq!(query, "assignee = currentUser() ORDER BY updated DESC");
    }

    #[test]
    fn test_build_query_reporter_only() {
        let criteria = FilterCriteria {
            reporter_is_current_user: true,
            ..Default::default()
        };

        assert_eq!(
            build_query(&criteria),
            "reporter = currentUser() ORDER BY created DESC"
        );
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("To Do, In Progress,,Done "),
            strings(&["To Do", "In Progress", "Done"])
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_sort_field_from_str() {
        assert_eq!("Updated".parse::<SortField>(), Ok(SortField::Updated));
        assert_eq!("created".parse::<SortField>(), Ok(SortField::Created));
        assert!("priority".parse::<SortField>().is_err());
    }

    #[test]
    fn test_sort_field_deserialize_matches_from_str() {
        for spelling in ["updated", "Updated", "UPDATED", " updated "] {
            let parsed: SortField = serde_json::from_value(serde_json::json!(spelling)).unwrap();
            assert_eq!(parsed, SortField::Updated, "{spelling:?}");
        }
        assert!(serde_json::from_value::<SortField>(serde_json::json!("priority")).is_err());
        assert_eq!(
            serde_json::to_value(SortField::Created).unwrap(),
            serde_json::json!("created")
        );
    }
}
