//! List issues as a table

use jtm_core::jql::{split_list, FilterCriteria, QueryBuilder, SortField};
use jtm_core::table::{render_table, TableOptions, TableRender, TableVariant};

use super::{print_json, report_skipped};
use crate::config::AppConfig;
use crate::prelude::*;
use crate::remote::{IssueSource, JiraClient};
use crate::sink::{OutputSink, StdSink};

pub const NO_RESULTS_MESSAGE: &str = "No issues found matching your criteria.";

/// Options for listing Jira issues
#[derive(Debug, clap::Args, Clone, Default)]
#[command(after_help = "EXAMPLES:
  # Issues assigned to you, newest first:
  jtm list

  # Open work in a project:
  jtm list --project OPS --ne-status \"Done,Closed\"

  # Issues you reported, sorted by last update, with links:
  jtm list --my-reported --sort updated --detail

  # Raw JQL (every other filter flag is ignored):
  jtm list --jql \"project = OPS AND labels = security\"")]
pub struct ListOptions {
    /// Raw JQL query; when given, every other filter flag is ignored
    #[arg(long)]
    pub jql: Option<String>,

    /// Maximum number of results (defaults to `max_results` from the config)
    #[arg(long)]
    pub max: Option<usize>,

    /// Only issues assigned to you
    #[arg(long)]
    pub my_issues: bool,

    /// Only issues you reported
    #[arg(long)]
    pub my_reported: bool,

    /// Project key (defaults to `default_project` from the config)
    #[arg(long)]
    pub project: Option<String>,

    /// Comma-separated statuses to include
    #[arg(long)]
    pub status: Option<String>,

    /// Comma-separated statuses to exclude
    #[arg(long)]
    pub ne_status: Option<String>,

    /// Comma-separated labels; matches issues carrying any of them
    #[arg(long)]
    pub tags: Option<String>,

    /// Sort field: created or updated (defaults to `sort_field` from the config)
    #[arg(long)]
    pub sort: Option<SortField>,

    /// Wider summary column plus a link to each issue
    #[arg(long)]
    pub detail: bool,

    /// Output normalized records as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListOptions {
    /// Filter criteria from the flags, falling back to config defaults
    pub fn criteria(&self, config: &AppConfig) -> FilterCriteria {
        FilterCriteria {
            assignee_is_current_user: self.my_issues,
            reporter_is_current_user: self.my_reported,
            project: self.project.clone().or_else(|| config.default_project.clone()),
            include_statuses: self.status.as_deref().map(split_list).unwrap_or_default(),
            exclude_statuses: self.ne_status.as_deref().map(split_list).unwrap_or_default(),
            labels: self.tags.as_deref().map(split_list).unwrap_or_default(),
            raw_override: self.jql.clone(),
        }
    }

    fn table_options(&self, config: &AppConfig) -> TableOptions {
        if self.detail {
            TableOptions {
                variant: TableVariant::Detail,
                terminology: config.terminology,
                link_base: config.server().ok().map(str::to_string),
            }
        } else {
            TableOptions {
                variant: TableVariant::Compact,
                terminology: config.terminology,
                link_base: None,
            }
        }
    }
}

/// Build the query, search, normalize and render
pub async fn run<S: IssueSource, O: OutputSink>(
    options: &ListOptions,
    config: &AppConfig,
    source: &S,
    sink: &mut O,
    verbose: bool,
) -> Result<()> {
    let builder = QueryBuilder::new(options.sort.unwrap_or(config.sort_field));
    let query = builder.build(&options.criteria(config));
    log::debug!("Built JQL: {query}");
    if verbose {
        sink.diagnostic(&f!("JQL: {query}"));
    }

    let limit = options.max.unwrap_or(config.max_results);
    let raws = source.search(&query, limit).await?;
    let batch = config.normalizer().normalize_batch(raws);
    report_skipped(&batch.skipped, sink);

    if options.json {
        if batch.issues.is_empty() {
            sink.diagnostic(NO_RESULTS_MESSAGE);
        }
        return print_json(&batch.issues, sink);
    }

    match render_table(&batch.issues, &options.table_options(config)) {
        TableRender::Table(table) => sink.primary(&table),
        TableRender::NoResults => sink.diagnostic(NO_RESULTS_MESSAGE),
    }

    Ok(())
}

pub async fn handler(options: ListOptions, config: AppConfig, verbose: bool) -> Result<()> {
    let client = JiraClient::new(&config.credentials()?)?;
    run(&options, &config, &client, &mut StdSink, verbose).await
}
