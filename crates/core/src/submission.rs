//! Required-field validation for new issues
//!
//! Only key presence is checked. Field shapes (`project: {key: ...}`,
//! `issuetype: {name: ...}`) are left for Jira to reject.

use serde_json::{Map, Value};

use crate::Error;

/// Keys every create payload must carry, in the order they are checked
pub const REQUIRED_FIELDS: [&str; 3] = ["project", "summary", "issuetype"];

/// Fail on the first required key missing from `payload`
pub fn validate(payload: &Map<String, Value>) -> Result<(), Error> {
    match REQUIRED_FIELDS
        .iter()
        .find(|field| !payload.contains_key(**field))
    {
        Some(field) => Err(Error::MissingField(field.to_string())),
        None => Ok(()),
    }
}
