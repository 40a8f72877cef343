/// Errors raised by the pure transformations in this crate
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A fetched record lacks one of the fields Jira always returns
    #[error("Malformed record {}: missing required field `{field}`", .key.as_deref().unwrap_or("<unknown>"))]
    MalformedRecord {
        key: Option<String>,
        field: &'static str,
    },

    /// A submission payload lacks a required key
    #[error("Missing required field: {0}")]
    MissingField(String),
}
