use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;
mod error;
mod prelude;
mod remote;
mod sink;
mod test_utils;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "List, view and create Jira issues from the terminal"
)]
pub struct App {
    #[command(subcommand)]
    pub command: commands::Commands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Configuration file (defaults to ~/.jira-cli-config.yaml)
    #[clap(long, env = "JTM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Jira server URL
    #[clap(long, env = "JIRA_SERVER", global = true)]
    server: Option<String>,

    /// Jira username (usually an email address)
    #[clap(long, env = "JIRA_USERNAME", global = true)]
    username: Option<String>,

    /// Jira API token
    #[clap(long, env = "JIRA_API_TOKEN", global = true, hide_env_values = true)]
    api_token: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "JTM_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    commands::run(app.command, app.global)
        .await
        .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
