//! Shared test utilities
//!
//! An in-memory [`IssueSource`] plus builders for raw search records.

#![cfg(test)]

use std::cell::RefCell;

use jtm_core::issue::RawIssue;
use serde_json::{json, Map, Value};

use crate::error::Error;
use crate::remote::{CreatedIssue, IssueSource};

/// Issue source that serves canned records and records every call
#[derive(Debug, Default)]
pub struct FakeSource {
    pub issues: Vec<RawIssue>,
    /// Key handed out by `create`
    pub next_key: String,
    /// When set, every call fails with this remote error
    pub failure: Option<String>,
    pub searches: RefCell<Vec<(String, usize)>>,
    pub fetches: RefCell<Vec<String>>,
    pub created: RefCell<Vec<Map<String, Value>>>,
}

impl FakeSource {
    pub fn with_issues(issues: Vec<RawIssue>) -> Self {
        Self {
            issues,
            next_key: "OPS-100".to_string(),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Total number of remote calls made
    pub fn call_count(&self) -> usize {
        self.searches.borrow().len() + self.fetches.borrow().len() + self.created.borrow().len()
    }

    fn check(&self) -> Result<(), Error> {
        match &self.failure {
            Some(message) => Err(Error::Remote(message.clone())),
            None => Ok(()),
        }
    }
}

impl IssueSource for FakeSource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawIssue>, Error> {
        self.searches.borrow_mut().push((query.to_string(), limit));
        self.check()?;
        Ok(self.issues.iter().take(limit).cloned().collect())
    }

    async fn fetch_one(&self, key: &str) -> Result<RawIssue, Error> {
        self.fetches.borrow_mut().push(key.to_string());
        self.check()?;
        self.issues
            .iter()
            .find(|issue| issue.key.as_deref() == Some(key))
            .cloned()
            .ok_or_else(|| Error::Remote(format!("Issue {key} does not exist")))
    }

    async fn create(&self, fields: &Map<String, Value>) -> Result<CreatedIssue, Error> {
        self.created.borrow_mut().push(fields.clone());
        self.check()?;
        Ok(CreatedIssue {
            id: "10001".to_string(),
            key: self.next_key.clone(),
            self_url: "https://jira.example.com/rest/api/2/issue/10001".to_string(),
        })
    }
}

/// Well-formed search record
pub fn raw_issue(key: &str, summary: &str) -> RawIssue {
    serde_json::from_value(json!({
        "key": key,
        "fields": {
            "summary": summary,
            "status": {"name": "To Do"},
            "priority": {"name": "High"},
            "assignee": {"displayName": "Alice"},
            "labels": ["infra"],
            "created": "2024-03-01T09:15:42.000+0000",
            "updated": "2024-03-02T17:05:59.000+0000",
            "description": "Plain description",
            "comment": {"comments": [
                {"author": {"displayName": "Bob"}, "created": "2024-03-03T10:00:00.000+0000", "body": "Looks good"}
            ]}
        }
    }))
    .unwrap()
}

/// Record with no `key`, which the normalizer rejects
pub fn keyless_issue(summary: &str) -> RawIssue {
    let mut issue = raw_issue("IGNORED-1", summary);
    issue.key = None;
    issue
}
