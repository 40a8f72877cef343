//! Markdown document for a single issue

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::issue::NormalizedIssue;

pub const NO_DESCRIPTION: &str = "_No description provided._";
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Label used for the classification tags line on the original instance
pub const DEFAULT_CLASSIFICATION_LABEL: &str = "Brands";

const DATE_ONLY: &str = "%Y-%m-%d";

/// `{code[:tag]}...{code}` or `{noformat}...{noformat}`, matched in one pass
static FENCE_MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{code(?::([^}]+))?\}(.*?)\{code\}|\{noformat\}(.*?)\{noformat\}").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Bold label shown before the classification tags
    pub classification_label: String,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            classification_label: DEFAULT_CLASSIFICATION_LABEL.to_string(),
        }
    }
}

/// Rewrite Jira `{code[:tag]}...{code}` and `{noformat}...{noformat}` macros as fenced blocks
///
/// The tag and the body are copied exactly; every occurrence is converted
/// independently and a converted body is never rescanned, so a macro quoted
/// inside another block stays literal.
pub fn convert_code_fences(text: &str) -> String {
    FENCE_MACRO
        .replace_all(text, |caps: &Captures| match caps.get(3) {
            Some(body) => format!("```\n{}\n```", body.as_str()),
            None => {
                let tag = caps.get(1).map_or("", |m| m.as_str());
                let body = caps.get(2).map_or("", |m| m.as_str());
                format!("```{tag}\n{body}\n```")
            }
        })
        .into_owned()
}

/// Render `issue` as a Markdown document
///
/// Layout: heading, metadata (issue, people and date blocks), description,
/// then the comment thread in source order.
pub fn render_document(issue: &NormalizedIssue, options: &DocumentOptions) -> String {
    let mut markdown = format!("# {}: {}\n\n", issue.key, issue.summary);

    let mut issue_block = vec![bold("Status", &issue.status)];
    if let Some(priority) = &issue.priority {
        issue_block.push(bold("Priority", priority));
    }
    if let Some(parent) = &issue.parent_key {
        issue_block.push(bold("Parent", parent));
    }
    if let Some(issue_type) = &issue.issue_type {
        issue_block.push(bold("Type", issue_type));
    }
    if let Some(tags) = &issue.classification_tags {
        issue_block.push(bold(&options.classification_label, &tags.join(", ")));
    }
    if !issue.labels.is_empty() {
        issue_block.push(bold("Labels", &issue.labels.join(", ")));
    }

    let people_block: Vec<String> = [
        ("Creator", &issue.creator),
        ("Assignee", &issue.assignee),
        ("Reporter", &issue.reporter),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| bold(label, v)))
    .collect();

    let date_block = vec![
        bold("Created", &issue.created_at.format(DATE_ONLY).to_string()),
        bold("Updated", &issue.updated_at.format(DATE_ONLY).to_string()),
    ];

    markdown.push_str("## Metadata\n\n");
    for block in [issue_block, people_block, date_block] {
        if !block.is_empty() {
            markdown.push_str(&block.join("\n"));
            markdown.push_str("\n\n");
        }
    }

    markdown.push_str("## Description\n\n");
    match &issue.description {
        Some(description) => markdown.push_str(&convert_code_fences(description)),
        None => markdown.push_str(NO_DESCRIPTION),
    }
    markdown.push_str("\n\n");

    if !issue.comments.is_empty() {
        markdown.push_str("## Comments\n\n");
        for comment in &issue.comments {
            let created = comment
                .created_at
                .map(|c| c.format(DATE_ONLY).to_string())
                .unwrap_or_else(|| UNKNOWN_DATE.to_string());
            markdown.push_str(&format!("### {} - {}\n\n", comment.author, created));
            markdown.push_str(&comment.body);
            markdown.push_str("\n\n---\n\n");
        }
    }

    markdown
}

fn bold(label: &str, value: &str) -> String {
    format!("**{label}:** {value}")
}
