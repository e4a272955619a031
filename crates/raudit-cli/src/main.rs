mod display;

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use raudit_ai::config::{DEFAULT_APPROVALS_MODEL, DEFAULT_AUDIT_MODEL};
use raudit_ai::gemini::{API_KEY_ENV, DEFAULT_BASE_URL};
use raudit_ai::{AuditService, GeminiClient, GeminiConfig, ModelConfig, ServiceConfig};
use raudit_core::{ApprovalFeed, IngredientQuery};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raudit", version, about = "Ingredient regulatory compliance lookup")]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct BackendArgs {
    /// Gemini API key (also read from API_KEY when unset)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Gemini REST base URL
    #[arg(long, env = "RAUDIT_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120, global = true)]
    timeout_secs: u64,

    /// Model used for ingredient audits
    #[arg(long, env = "RAUDIT_AUDIT_MODEL", default_value = DEFAULT_AUDIT_MODEL, global = true)]
    audit_model: String,

    /// Model used for the approvals feed
    #[arg(long, env = "RAUDIT_APPROVALS_MODEL", default_value = DEFAULT_APPROVALS_MODEL, global = true)]
    approvals_model: String,

    /// Disable web-search grounding for audits
    #[arg(long, global = true)]
    no_grounding: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Audit one or more ingredients
    Search {
        /// Ingredient names; each is audited independently
        #[arg(required = true)]
        names: Vec<String>,

        /// Print normalized JSON instead of cards
        #[arg(long)]
        json: bool,
    },
    /// Show the recent approvals feed
    Approvals {
        /// Ask the backend for the latest approvals before printing
        #[arg(long)]
        refresh: bool,

        #[arg(long)]
        json: bool,
    },
    /// Show regulatory alerts
    Alerts,
    /// List official regulatory portals
    Portals,
}

impl BackendArgs {
    /// Build the service. Fails before any request when no key is configured.
    fn service(&self) -> anyhow::Result<AuditService<GeminiClient>> {
        let config = match &self.api_key {
            Some(key) => GeminiConfig::new(key.as_str()),
            None => GeminiConfig::from_env(),
        }
        .with_context(|| format!("configure the Gemini API key via --api-key or {API_KEY_ENV}"))?
        .with_base_url(self.base_url.as_str())
        .with_timeout(Duration::from_secs(self.timeout_secs));

        let client = GeminiClient::new(config).context("building HTTP client")?;
        let service_config = ServiceConfig {
            audit: ModelConfig::new(self.audit_model.as_str(), !self.no_grounding),
            approvals: ModelConfig::new(self.approvals_model.as_str(), false),
        };
        Ok(AuditService::new(client, service_config))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("raudit v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Search { names, json } => cmd_search(&cli.backend, &names, json).await,
        Command::Approvals { refresh, json } => cmd_approvals(&cli.backend, refresh, json).await,
        Command::Alerts => Ok(display::print_alerts(&raudit_core::reference::mock_alerts())?),
        Command::Portals => Ok(display::print_portals(raudit_core::reference::PORTALS)?),
    }
}

async fn cmd_search(backend: &BackendArgs, names: &[String], json: bool) -> anyhow::Result<()> {
    let queries: Vec<IngredientQuery> = names
        .iter()
        .filter_map(|name| match IngredientQuery::parse(name) {
            Ok(q) => Some(q),
            Err(e) => {
                eprintln!("Skipping {name:?}: {e}");
                None
            }
        })
        .collect();
    if queries.is_empty() {
        eprintln!("Nothing to search.");
        return Ok(());
    }

    let service = backend.service()?;
    let results =
        futures::future::join_all(queries.iter().map(|query| service.audit(query))).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }
        display::print_result(result)?;
    }
    Ok(())
}

async fn cmd_approvals(backend: &BackendArgs, refresh: bool, json: bool) -> anyhow::Result<()> {
    let mut feed = ApprovalFeed::seeded();
    if refresh {
        let service = backend.service()?;
        let latest = service.refresh_approvals().await;
        if !feed.apply_refresh(latest) {
            eprintln!("Refresh returned no records; showing the previous feed.");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(feed.items())?);
    } else {
        display::print_feed(&feed)?;
    }
    Ok(())
}
