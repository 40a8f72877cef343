//! Transformation functions for Jira issue payloads
//!
//! The raw types mirror the REST API v2 issue shape but keep every field
//! optional, so a record missing a guaranteed field surfaces as
//! [`Error::MalformedRecord`] instead of a deserialization failure that would
//! take the whole search response down with it.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adf::extract_text;
use crate::Error;

/// Custom field holding the classification tags ("Brands") on the original instance
pub const DEFAULT_CLASSIFICATION_FIELD: &str = "customfield_12432";

/// Placeholder for comment authors without a display name
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const WIRE_TIMESTAMP_LEN: usize = 19;

/// Jira issue as returned by the search and issue endpoints
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawIssue {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: Option<RawFields>,
}

/// Fields from a Jira issue
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<RawNamed>,
    #[serde(default)]
    pub priority: Option<RawNamed>,
    #[serde(default)]
    pub issuetype: Option<RawNamed>,
    #[serde(default)]
    pub assignee: Option<RawUser>,
    #[serde(default)]
    pub reporter: Option<RawUser>,
    #[serde(default)]
    pub creator: Option<RawUser>,
    #[serde(default)]
    pub parent: Option<RawParent>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    /// Wiki-markup string or ADF document
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub comment: Option<RawCommentPage>,
    /// Custom fields (`customfield_*`) and anything else not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Status, priority and issue type all share this shape
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawNamed {
    #[serde(default)]
    pub name: Option<String>,
}

/// Assignee, reporter, creator and comment author
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawUser {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawParent {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawCommentPage {
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawComment {
    #[serde(default)]
    pub author: Option<RawUser>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
}

/// Issue with stable field presence, ready for rendering
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NormalizedIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub priority: Option<String>,
    pub issue_type: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub creator: Option<String>,
    pub labels: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub description: Option<String>,
    pub comments: Vec<Comment>,
    pub parent_key: Option<String>,
    pub classification_tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    pub created_at: Option<NaiveDateTime>,
    pub body: String,
}

/// Outcome of normalizing a search page: good records plus the ones skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub issues: Vec<NormalizedIssue>,
    pub skipped: Vec<Error>,
}

/// Parse a Jira timestamp (`2024-01-02T10:20:30.000+0100`)
///
/// Only the first 19 characters are read; fractional seconds and the zone
/// offset are dropped, not applied.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let head = value.get(..WIRE_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(head, WIRE_TIMESTAMP_FORMAT).ok()
}

/// Browsable link for an issue: `<base>/browse/<KEY>`
pub fn browse_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/{}", base_url.trim_end_matches('/'), key)
}

/// Maps [`RawIssue`] payloads to [`NormalizedIssue`]s
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    /// Custom field id whose option values become `classification_tags`
    pub classification_field: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            classification_field: DEFAULT_CLASSIFICATION_FIELD.to_string(),
        }
    }
}

impl Normalizer {
    pub fn new(classification_field: impl Into<String>) -> Self {
        Self {
            classification_field: classification_field.into(),
        }
    }

    /// Normalize one record
    ///
    /// Fails when `key`, `summary`, `status`, `created` or `updated` is
    /// missing; each is checked on its own.
    pub fn normalize(&self, raw: RawIssue) -> Result<NormalizedIssue, Error> {
        let key = non_empty(raw.key);
        let malformed = |field: &'static str| Error::MalformedRecord {
            key: key.clone(),
            field,
        };

        let fields = raw.fields.unwrap_or_default();

        let issue_key = key.clone().ok_or_else(|| malformed("key"))?;
        let summary = fields.summary.ok_or_else(|| malformed("summary"))?;
        let status = named(fields.status).ok_or_else(|| malformed("status"))?;
        let created_at = fields
            .created
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| malformed("created"))?;
        let updated_at = fields
            .updated
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| malformed("updated"))?;

        let classification_tags = fields
            .extra
            .get(&self.classification_field)
            .and_then(option_values);

        let comments = fields
            .comment
            .map(|page| page.comments.into_iter().map(normalize_comment).collect())
            .unwrap_or_default();

        Ok(NormalizedIssue {
            key: issue_key,
            summary,
            status,
            priority: named(fields.priority),
            issue_type: named(fields.issuetype),
            assignee: display_name(fields.assignee),
            reporter: display_name(fields.reporter),
            creator: display_name(fields.creator),
            labels: fields.labels.unwrap_or_default(),
            created_at,
            updated_at,
            description: extract_text(fields.description.as_ref()),
            comments,
            parent_key: fields.parent.and_then(|p| non_empty(p.key)),
            classification_tags,
        })
    }

    /// Normalize a page of records, skipping (and reporting) malformed ones
    pub fn normalize_batch(&self, raws: Vec<RawIssue>) -> Batch {
        let mut batch = Batch::default();
        for raw in raws {
            match self.normalize(raw) {
                Ok(issue) => batch.issues.push(issue),
                Err(err) => batch.skipped.push(err),
            }
        }
        batch
    }
}

/// Normalize one record with the default classification field
pub fn normalize(raw: RawIssue) -> Result<NormalizedIssue, Error> {
    Normalizer::default().normalize(raw)
}

/// Normalize a page of records with the default classification field
pub fn normalize_batch(raws: Vec<RawIssue>) -> Batch {
    Normalizer::default().normalize_batch(raws)
}

fn normalize_comment(raw: RawComment) -> Comment {
    Comment {
        author: display_name(raw.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        created_at: raw.created.as_deref().and_then(parse_timestamp),
        body: extract_text(raw.body.as_ref()).unwrap_or_default(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn named(value: Option<RawNamed>) -> Option<String> {
    value.and_then(|n| non_empty(n.name))
}

fn display_name(user: Option<RawUser>) -> Option<String> {
    user.and_then(|u| non_empty(u.display_name))
}

/// Values of a multi-select custom field: `[{"value": "A"}, ...]`
fn option_values(value: &Value) -> Option<Vec<String>> {
    let option_value = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => v.get("value").and_then(Value::as_str).map(str::to_string),
        _ => None,
    };

    let values: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(option_value).collect(),
        Value::Object(_) => option_value(value).into_iter().collect(),
        _ => Vec::new(),
    };

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timestamp(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn full_payload() -> Value {
        json!({
            "key": "OPS-42",
            "fields": {
                "summary": "Rotate TLS certificates",
                "status": {"name": "In Progress"},
                "priority": {"name": "High"},
                "issuetype": {"name": "Task"},
                "assignee": {"displayName": "Alice", "emailAddress": "alice@example.com"},
                "reporter": {"displayName": "Bob"},
                "creator": {"displayName": "Carol"},
                "parent": {"key": "OPS-1"},
                "labels": ["infra", "security"],
                "created": "2024-03-01T09:15:42.123+0100",
                "updated": "2024-03-02T17:05:59.999-0500",
                "description": "Renew before {code:bash}certbot renew{code}",
                "customfield_12432": [{"value": "Acme"}, {"value": "Globex"}],
                "comment": {
                    "comments": [
                        {
                            "author": {"displayName": "Dave"},
                            "created": "2024-03-01T10:00:00.000+0000",
                            "body": "Looks good"
                        },
                        {
                            "author": {},
                            "body": "Anonymous note"
                        }
                    ]
                }
            }
        })
    }

    fn raw(value: Value) -> RawIssue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_full_payload() {
        // Arrange
        let payload = raw(full_payload());

        // Act
        let issue = normalize(payload).unwrap();

        // Assert
        assert_eq!(issue.key, "OPS-42");
        assert_eq!(issue.summary, "Rotate TLS certificates");
        assert_eq!(issue.status, "In Progress");
        assert_eq!(issue.priority.as_deref(), Some("High"));
        assert_eq!(issue.issue_type.as_deref(), Some("Task"));
        assert_eq!(issue.assignee.as_deref(), Some("Alice"));
        assert_eq!(issue.reporter.as_deref(), Some("Bob"));
        assert_eq!(issue.creator.as_deref(), Some("Carol"));
        assert_eq!(issue.parent_key.as_deref(), Some("OPS-1"));
        assert_eq!(issue.labels, vec!["infra", "security"]);
        assert_eq!(issue.created_at, timestamp("2024-03-01 09:15:42"));
        assert_eq!(issue.updated_at, timestamp("2024-03-02 17:05:59"));
        assert_eq!(
            issue.description.as_deref(),
            Some("Renew before {code:bash}certbot renew{code}")
        );
        assert_eq!(
            issue.classification_tags,
            Some(vec!["Acme".to_string(), "Globex".to_string()])
        );
        assert_eq!(issue.comments.len(), 2);
        assert_eq!(issue.comments[0].author, "Dave");
        assert_eq!(
            issue.comments[0].created_at,
            Some(timestamp("2024-03-01 10:00:00"))
        );
        assert_eq!(issue.comments[1].author, UNKNOWN_AUTHOR);
        assert_eq!(issue.comments[1].created_at, None);
        assert_eq!(issue.comments[1].body, "Anonymous note");
    }

    #[test]
    fn test_normalize_minimal_payload_has_every_optional_absent() {
        let payload = raw(json!({
            "key": "OPS-7",
            "fields": {
                "summary": "Minimal",
                "status": {"name": "Open"},
                "created": "2024-01-01T00:00:00.000+0000",
                "updated": "2024-01-01T00:00:00.000+0000"
            }
        }));

        let issue = normalize(payload).unwrap();

        assert_eq!(issue.priority, None);
        assert_eq!(issue.issue_type, None);
        assert_eq!(issue.assignee, None);
        assert_eq!(issue.reporter, None);
        assert_eq!(issue.creator, None);
        assert_eq!(issue.parent_key, None);
        assert_eq!(issue.description, None);
        assert_eq!(issue.classification_tags, None);
        assert!(issue.labels.is_empty());
        assert!(issue.comments.is_empty());
    }

    #[test]
    fn test_normalize_null_sub_objects_and_empty_names_are_absent() {
        let payload = raw(json!({
            "key": "OPS-8",
            "fields": {
                "summary": "Nulls",
                "status": {"name": "Open"},
                "created": "2024-01-01T00:00:00",
                "updated": "2024-01-01T00:00:00",
                "assignee": null,
                "priority": {"name": ""},
                "reporter": {"displayName": ""},
                "labels": null,
                "customfield_12432": []
            }
        }));

        let issue = normalize(payload).unwrap();

        assert_eq!(issue.assignee, None);
        assert_eq!(issue.priority, None);
        assert_eq!(issue.reporter, None);
        assert!(issue.labels.is_empty());
        assert_eq!(issue.classification_tags, None);
    }

    #[test]
    fn test_normalize_missing_key_fails_even_when_everything_else_present() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("key");

        let err = normalize(raw(payload)).unwrap_err();

        assert_eq!(
            err,
            Error::MalformedRecord {
                key: None,
                field: "key"
            }
        );
    }

    #[test]
    fn test_normalize_reports_each_required_field() {
        for field in ["summary", "status", "created", "updated"] {
            let mut payload = full_payload();
            payload["fields"].as_object_mut().unwrap().remove(field);

            let err = normalize(raw(payload)).unwrap_err();

            assert_eq!(
                err,
                Error::MalformedRecord {
                    key: Some("OPS-42".to_string()),
                    field
                }
            );
        }
    }

    #[test]
    fn test_normalize_missing_fields_object() {
        let err = normalize(raw(json!({"key": "OPS-9"}))).unwrap_err();

        assert_eq!(
            err,
            Error::MalformedRecord {
                key: Some("OPS-9".to_string()),
                field: "summary"
            }
        );
    }

    #[test]
    fn test_normalize_unparseable_timestamp_is_malformed() {
        let mut payload = full_payload();
        payload["fields"]["updated"] = json!("yesterday");

        let err = normalize(raw(payload)).unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedRecord {
                field: "updated",
                ..
            }
        ));
    }

    #[test]
    fn test_normalize_custom_classification_field() {
        let mut payload = full_payload();
        payload["fields"]["customfield_10001"] = json!({"value": "Initech"});

        let issue = Normalizer::new("customfield_10001")
            .normalize(raw(payload))
            .unwrap();

        assert_eq!(issue.classification_tags, Some(vec!["Initech".to_string()]));
    }

    #[test]
    fn test_normalize_adf_description_and_comment_body() {
        let mut payload = full_payload();
        let adf = json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "From ADF"}]}]
        });
        payload["fields"]["description"] = adf.clone();
        payload["fields"]["comment"]["comments"][0]["body"] = adf;

        let issue = normalize(raw(payload)).unwrap();

        assert_eq!(issue.description.as_deref(), Some("From ADF"));
        assert_eq!(issue.comments[0].body, "From ADF");
    }

    #[test]
    fn test_normalize_batch_skips_malformed_records() {
        let mut broken = full_payload();
        broken["fields"].as_object_mut().unwrap().remove("status");
        let mut second = full_payload();
        second["key"] = json!("OPS-43");

        let batch = normalize_batch(vec![raw(full_payload()), raw(broken), raw(second)]);

        let keys: Vec<&str> = batch.issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["OPS-42", "OPS-43"]);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(
            batch.skipped[0].to_string(),
            "Malformed record OPS-42: missing required field `status`"
        );
    }

    #[test]
    fn test_browse_url_trims_trailing_slash() {
        assert_eq!(
            browse_url("https://jira.example.com/", "OPS-1"),
            "https://jira.example.com/browse/OPS-1"
        );
        assert_eq!(
            browse_url("https://jira.example.com", "OPS-1"),
            "https://jira.example.com/browse/OPS-1"
        );
    }

    #[test]
    fn test_parse_timestamp_truncates_suffix() {
        assert_eq!(
            parse_timestamp("2024-05-06T07:08:09.999+1400"),
            Some(timestamp("2024-05-06 07:08:09"))
        );
        assert_eq!(
            parse_timestamp("2024-05-06T07:08:09"),
            Some(timestamp("2024-05-06 07:08:09"))
        );
        assert_eq!(parse_timestamp("2024-05-06"), None);
    }
}
