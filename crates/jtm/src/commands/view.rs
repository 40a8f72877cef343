//! Show a single issue

use jtm_core::document::render_document;
use jtm_core::issue::browse_url;

use super::print_json;
use crate::config::AppConfig;
use crate::prelude::*;
use crate::remote::{IssueSource, JiraClient};
use crate::sink::{OutputSink, StdSink};

/// Where the issue is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewMode {
    /// Markdown document on stdout
    #[default]
    Terminal,
    /// The issue page in the default web browser
    Browser,
}

/// Options for viewing a Jira issue
#[derive(Debug, clap::Args, Clone)]
pub struct ViewOptions {
    /// Issue key (e.g., "OPS-123")
    #[clap(env = "JIRA_ISSUE_KEY")]
    pub key: String,

    /// Show the issue in the terminal or open it in the browser
    #[arg(long, value_enum, default_value_t = ViewMode::Terminal)]
    pub view: ViewMode,

    /// Output the normalized record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Fetch, normalize and print one issue
///
/// Unlike listings, a malformed record here is an error.
pub async fn show_issue<S: IssueSource, O: OutputSink>(
    key: &str,
    json: bool,
    config: &AppConfig,
    source: &S,
    sink: &mut O,
) -> Result<()> {
    let raw = source.fetch_one(key).await?;
    let issue = config
        .normalizer()
        .normalize(raw)
        .with_context(|| f!("Failed to read issue {key}"))?;

    if json {
        return print_json(&issue, sink);
    }

    sink.primary(&render_document(&issue, &config.document_options()));
    Ok(())
}

/// Open `<server>/browse/<KEY>` with `opener` without contacting the API
pub fn open_in_browser<O, F>(key: &str, config: &AppConfig, sink: &mut O, opener: F) -> Result<()>
where
    O: OutputSink,
    F: FnOnce(&str) -> std::io::Result<()>,
{
    let url = browse_url(config.server()?, key);
    log::debug!("Opening {url}");
    opener(&url).map_err(|e| Error::Browser(f!("{url}: {e}")))?;
    sink.diagnostic(&f!("Opened {url}"));
    Ok(())
}

pub async fn handler(options: ViewOptions, config: AppConfig) -> Result<()> {
    match options.view {
        ViewMode::Browser => open_in_browser(&options.key, &config, &mut StdSink, |url| {
            open::that(url)
        }),
        ViewMode::Terminal => {
            let client = JiraClient::new(&config.credentials()?)?;
            show_issue(&options.key, options.json, &config, &client, &mut StdSink).await
        }
    }
}
