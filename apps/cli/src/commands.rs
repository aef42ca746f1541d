//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use stagehand_core::{BuildConfig, run_prepare, run_preview_build};
use stagehand_discovery::DiscoverOptions;
use stagehand_shared::{
    AppConfig, init_config, load_config, validate_admin_key,
};
use stagehand_staging::CommandPreparer;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// stagehand — stage documentation content and preview it on pull requests.
#[derive(Parser)]
#[command(
    name = "stagehand",
    version,
    about = "Discover content roots, submit them to a content service, and post PR previews.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Discover and prepare every content root in a workspace.
    Prepare {
        /// Workspace directory to discover content roots in.
        #[arg(default_value = ".")]
        workspace: PathBuf,

        /// Content service base URL (overrides config).
        #[arg(long)]
        content_service: Option<String>,

        /// Mocked revision value; skips the source-control lookup.
        #[arg(long, env = "REVISION_ID_MOCK")]
        mock_revision: Option<String>,
    },

    /// Run the pull-request preview pipeline for a workspace.
    Preview {
        /// Workspace directory to discover content roots in.
        #[arg(default_value = ".")]
        workspace: PathBuf,

        /// URL of the originating pull request.
        #[arg(long, env = "PULL_REQUEST_URL")]
        pull_request: String,

        /// Content service base URL (overrides config).
        #[arg(long)]
        content_service: Option<String>,

        /// Mocked revision value; skips the source-control lookup.
        #[arg(long, env = "REVISION_ID_MOCK")]
        mock_revision: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "stagehand=info",
        1 => "stagehand=debug",
        _ => "stagehand=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Prepare {
            workspace,
            content_service,
            mock_revision,
        } => cmd_prepare(workspace, content_service.as_deref(), mock_revision).await,
        Command::Preview {
            workspace,
            pull_request,
            content_service,
            mock_revision,
        } => {
            cmd_preview(
                workspace,
                pull_request,
                content_service.as_deref(),
                mock_revision,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Merge the loaded config, CLI overrides, and environment into a
/// [`BuildConfig`].
fn build_config(
    config: &AppConfig,
    workspace: PathBuf,
    content_service: Option<&str>,
    pull_request_url: Option<String>,
    mock_revision: Option<String>,
) -> Result<BuildConfig> {
    let admin_api_key = validate_admin_key(config)?;

    let github_token = match std::env::var(&config.github.token_env) {
        Ok(token) if !token.is_empty() => Some(token),
        _ => None,
    };

    Ok(BuildConfig {
        workspace,
        content_service_url: content_service
            .map(String::from)
            .unwrap_or_else(|| config.content_service.url.clone()),
        admin_api_key,
        presenter_api_url: config.presenter.api_url.clone(),
        presenter_public_url: config.presenter.public_url.clone(),
        github_token,
        github_api_url: config.github.api_url.clone(),
        pull_request_url,
        mock_revision,
        discover: DiscoverOptions {
            marker_file: config.defaults.marker_file.clone(),
            reserved_dirs: config.defaults.reserved_dirs.clone(),
        },
    })
}

fn phase_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

async fn cmd_prepare(
    workspace: PathBuf,
    content_service: Option<&str>,
    mock_revision: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    let build = build_config(
        &config,
        workspace,
        content_service,
        None,
        mock_revision,
    )?;
    let preparer = CommandPreparer::new(config.defaults.preparer_command.as_str());

    info!(workspace = %build.workspace.display(), "preparing workspace");

    let spinner = phase_spinner();
    spinner.set_message("Preparing content roots");
    let result = run_prepare(&build, &preparer).await;
    spinner.finish_and_clear();

    let aggregate = result?;

    println!();
    if !aggregate.did_something {
        println!("  No content roots found in this workspace.");
        println!();
        return Ok(());
    }

    println!("  Workspace prepared successfully!");
    println!("  Roots submitted: {}", aggregate.content_id_map.len());
    for (root, content_id) in &aggregate.content_id_map {
        println!("    {root} -> {content_id}");
    }
    println!();

    Ok(())
}

async fn cmd_preview(
    workspace: PathBuf,
    pull_request: String,
    content_service: Option<&str>,
    mock_revision: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    let build = build_config(
        &config,
        workspace,
        content_service,
        Some(pull_request),
        mock_revision,
    )?;
    let preparer = CommandPreparer::new(config.defaults.preparer_command.as_str());

    info!(
        workspace = %build.workspace.display(),
        pull_request = build.pull_request_url.as_deref().unwrap_or(""),
        "running preview build"
    );

    let spinner = phase_spinner();
    spinner.set_message("Running preview build");
    let result = run_preview_build(&build, &preparer).await;
    spinner.finish_and_clear();

    let outcome = result?;

    println!();
    if outcome.did_something {
        println!("  Preview build complete.");
    } else {
        println!("  Nothing to preview: no content roots found.");
    }
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
