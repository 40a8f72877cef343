//! Create Jira issues from YAML

use std::path::{Path, PathBuf};

use jtm_core::submission::validate;
use serde_json::{Map, Value};

use super::view::show_issue;
use crate::config::AppConfig;
use crate::prelude::*;
use crate::remote::{IssueSource, JiraClient};
use crate::sink::{OutputSink, StdSink};

/// Create a new Jira issue
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "FILE FORMAT:
  project:
    key: OPS
  summary: Rotate TLS certificates
  issuetype:
    name: Task
  labels: [infra]

  The mapping may also be nested under a top-level `fields:` key.")]
pub struct CreateOptions {
    /// YAML file with the Jira fields of the new issue
    pub file: PathBuf,

    /// Show the created issue afterwards
    #[arg(long)]
    pub view: bool,
}

/// Parse a YAML document into a Jira `fields` mapping
///
/// A lone top-level `fields:` mapping is unwrapped.
pub fn parse_payload(contents: &str) -> Result<Map<String, Value>> {
    let value: Value =
        serde_yaml::from_str(contents).map_err(|e| eyre!("Failed to parse issue file: {e}"))?;

    let Value::Object(mut map) = value else {
        return Err(eyre!("Issue file must contain a mapping of Jira fields"));
    };

    match map.remove("fields") {
        Some(Value::Object(inner)) if map.is_empty() => Ok(inner),
        Some(other) => {
            map.insert("fields".to_string(), other);
            Ok(map)
        }
        None => Ok(map),
    }
}

pub fn load_payload(path: &Path) -> Result<Map<String, Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| f!("Failed to read issue file {}", path.display()))?;
    parse_payload(&contents)
}

/// Validate, submit and confirm
///
/// Nothing is sent when a required field is missing.
pub async fn run<S: IssueSource, O: OutputSink>(
    fields: Map<String, Value>,
    options: &CreateOptions,
    config: &AppConfig,
    source: &S,
    sink: &mut O,
) -> Result<()> {
    validate(&fields)?;

    let created = source.create(&fields).await?;
    log::debug!("Created issue {} (id {})", created.key, created.id);
    sink.confirm(&f!("Success! Created {}", created.key));

    if options.view {
        show_issue(&created.key, false, config, source, sink).await?;
    }

    Ok(())
}

pub async fn handler(options: CreateOptions, config: AppConfig) -> Result<()> {
    let fields = load_payload(&options.file)?;
    let client = JiraClient::new(&config.credentials()?)?;
    run(fields, &options, &config, &client, &mut StdSink).await
}
