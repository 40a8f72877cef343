//! Tabular listing of normalized issues

use prettytable::{format, Cell, Row, Table};
use serde::{Deserialize, Serialize};

use crate::issue::{browse_url, NormalizedIssue};

pub const UNASSIGNED: &str = "Unassigned";
pub const NO_PRIORITY: &str = "N/A";

const ELLIPSIS: &str = "...";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Width profile of the listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableVariant {
    /// Summary cut at 50 characters
    #[default]
    Compact,
    /// Summary cut at 60 characters
    Detail,
}

impl TableVariant {
    pub fn summary_width(&self) -> usize {
        match self {
            TableVariant::Compact => 50,
            TableVariant::Detail => 60,
        }
    }
}

/// Noun used in the count line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminology {
    #[default]
    Issues,
    Tickets,
}

impl Terminology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminology::Issues => "issues",
            Terminology::Tickets => "tickets",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub variant: TableVariant,
    pub terminology: Terminology,
    /// Server base URL; adds a Link column when set
    pub link_base: Option<String>,
}

/// Result of rendering a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRender {
    /// Table followed by the count line
    Table(String),
    /// Nothing to render; not an error
    NoResults,
}

/// Render `issues` as an aligned table followed by a `Total <noun>: N` line
pub fn render_table(issues: &[NormalizedIssue], options: &TableOptions) -> TableRender {
    if issues.is_empty() {
        return TableRender::NoResults;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let mut titles = vec![
        "Key", "Created", "Updated", "Assignee", "Status", "Priority", "Summary", "Labels",
    ];
    if options.link_base.is_some() {
        titles.push("Link");
    }
    table.set_titles(Row::new(titles.into_iter().map(Cell::new).collect()));

    let width = options.variant.summary_width();
    for issue in issues {
        let mut cells = vec![
            issue.key.clone(),
            issue.created_at.format(DATE_FORMAT).to_string(),
            issue.updated_at.format(DATE_FORMAT).to_string(),
            issue.assignee.as_deref().unwrap_or(UNASSIGNED).to_string(),
            issue.status.clone(),
            issue.priority.as_deref().unwrap_or(NO_PRIORITY).to_string(),
            shorten(&issue.summary, width),
            issue.labels.join(", "),
        ];
        if let Some(base) = &options.link_base {
            cells.push(browse_url(base, &issue.key));
        }
        table.add_row(Row::new(cells.iter().map(|c| Cell::new(c)).collect()));
    }

    let mut output = table.to_string();
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(&format!(
        "\nTotal {}: {}\n",
        options.terminology.as_str(),
        issues.len()
    ));

    TableRender::Table(output)
}

/// Collapse whitespace and cut `text` to at most `width` characters on a word boundary
///
/// Truncated output ends with `...`, which counts towards `width`. A first
/// word that cannot fit on its own is cut mid-word.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(ELLIPSIS.len());
    let mut kept = String::new();
    let mut kept_len = 0;
    for word in words {
        let word_len = word.chars().count();
        let next_len = if kept.is_empty() {
            word_len
        } else {
            kept_len + 1 + word_len
        };
        if next_len > budget {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(word);
        kept_len = next_len;
    }

    if kept.is_empty() {
        kept = collapsed.chars().take(budget).collect();
    }

    kept.push_str(ELLIPSIS);
    kept
}
