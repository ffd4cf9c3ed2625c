//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use skillsync_core::{ProgressReporter, SyncConfig, SyncOutcome};
use skillsync_shared::{
    AppConfig, CatalogConfig, RegistryConnection, RegistryEnvironment, init_config, load_config,
    validate_api_key, validate_org_ctid,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SkillSync — publish OSMT Open Skills to the Credential Registry.
#[derive(Parser)]
#[command(
    name = "skillsync",
    version,
    about = "Pull an OSMT skill catalog and republish it as a Credential Registry competency framework.",
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
    /// Sync the full skill catalog of an OSMT instance to the registry.
    Sync {
        /// Domain of the OSMT instance, e.g. `osmt.example.com`.
        domain: String,

        /// Registry environment: sandbox or production.
        #[arg(short, long)]
        environment: Option<String>,

        /// CTID of the publishing organization.
        #[arg(long, env = "SKILLSYNC_ORG_CTID")]
        org_ctid: Option<String>,

        /// Registry assistant API key.
        #[arg(long, env = "SKILLSYNC_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Language tag for published language maps (defaults to en-us).
        #[arg(long)]
        language: Option<String>,
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
        0 => "skillsync=info",
        1 => "skillsync=debug",
        _ => "skillsync=trace",
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
        Command::Sync {
            domain,
            environment,
            org_ctid,
            api_key,
            language,
        } => {
            cmd_sync(
                &domain,
                environment.as_deref(),
                org_ctid,
                api_key,
                language,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

async fn cmd_sync(
    domain: &str,
    environment: Option<&str>,
    org_ctid: Option<String>,
    api_key: Option<String>,
    language: Option<String>,
) -> Result<()> {
    let config = load_config()?;

    let environment: RegistryEnvironment = environment
        .unwrap_or(&config.defaults.environment)
        .parse()
        .map_err(|e: String| eyre!(e))?;

    let org_ctid = org_ctid
        .or_else(|| config.registry.organization_ctid.clone())
        .ok_or_else(|| {
            eyre!(
                "no organization CTID provided: pass --org-ctid or set \
                 registry.organization_ctid in the config file"
            )
        })?;

    let api_key = match api_key {
        Some(key) => key,
        None => std::env::var(&config.registry.api_key_env).map_err(|_| {
            eyre!(
                "no API key provided: pass --api-key or set the {} environment variable",
                config.registry.api_key_env
            )
        })?,
    };

    // Format checks run before any network call.
    validate_org_ctid(&org_ctid)?;
    validate_api_key(&api_key)?;

    let language = language.unwrap_or_else(|| config.defaults.language.clone());

    let sync_config = SyncConfig {
        source_domain: domain.to_string(),
        connection: RegistryConnection {
            environment,
            organization_id: org_ctid,
            api_key,
        },
        language,
        catalog: CatalogConfig::from(&config),
        source_base_url: None,
        registry_endpoints: None,
    };

    info!(domain, environment = %environment, "starting sync");

    let reporter = CliProgress::new();
    let outcome = skillsync_core::run_sync(&sync_config, &reporter).await?;

    // Print summary
    println!();
    println!("  Sync completed!");
    println!("  Skills:       {}", outcome.skills_ingested);
    println!("  Competencies: {}", outcome.competencies_published);
    println!(
        "  Framework:    {} ({})",
        outcome.framework_ctid,
        if outcome.framework_reused {
            "updated"
        } else {
            "created"
        }
    );
    match (&outcome.publish.successful, &outcome.publish.graph_url) {
        (true, Some(url)) => println!("  Published:    {url}"),
        (true, None) => println!("  Published:    accepted by the registry"),
        (false, _) => {
            println!("  Published:    the registry did not accept the graph:");
            for message in &outcome.publish.messages {
                println!("                - {message}");
            }
        }
    }
    println!("  Time:         {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn skill_fetched(&self, skill_id: &str, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "Fetching details [{current}/{total}] {skill_id}"
        ));
    }

    fn done(&self, _outcome: &SyncOutcome) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

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
