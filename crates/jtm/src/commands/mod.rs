pub mod create;
pub mod list;
pub mod view;

use jtm_core::Error as CoreError;

use crate::config::AppConfig;
use crate::prelude::*;
use crate::sink::OutputSink;

/// Jira issue commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List issues matching filter flags or a raw JQL query
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Show one issue as Markdown or open it in the browser
    #[clap(name = "view")]
    View(view::ViewOptions),

    /// Create an issue from a YAML file of Jira fields
    #[clap(name = "create")]
    Create(create::CreateOptions),
}

/// Run a command against the configured Jira server
pub async fn run(cmd: Commands, global: crate::Global) -> Result<()> {
    let config = AppConfig::load(global.config.as_deref())?.with_overrides(
        global.server,
        global.username,
        global.api_token,
    );

    match cmd {
        Commands::List(options) => list::handler(options, config, global.verbose).await,
        Commands::View(options) => view::handler(options, config).await,
        Commands::Create(options) => create::handler(options, config).await,
    }
}

/// One diagnostic line per record dropped from a batch
fn report_skipped<O: OutputSink>(skipped: &[CoreError], sink: &mut O) {
    for err in skipped {
        log::debug!("Dropping record from batch: {err:?}");
        sink.diagnostic(&f!("Skipping malformed record: {err}"));
    }
}

/// Pretty JSON on the primary channel
fn print_json<T: serde::Serialize, O: OutputSink>(value: &T, sink: &mut O) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    sink.primary(&f!("{json}\n"));
    Ok(())
}
