//! PEP CLI - inspect and test authorization queries against a PDP

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use pep_core::{AuthorizationQuery, Decision, PdpClient, PepConfig, QueryBuilder};
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "pep")]
#[command(about = "PEP - query a policy decision point the way the article gate does")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the authorization query a request would produce
    Query {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Send the authorization query to the PDP and print its decision
    Check {
        #[command(flatten)]
        request: RequestArgs,

        /// PDP base URL (defaults to PDP_URL or the built-in default)
        #[arg(long)]
        pdp_url: Option<String>,

        /// Timeout for the PDP call in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

/// Attributes of the simulated inbound request
#[derive(Args)]
struct RequestArgs {
    /// Value of the `user` header (omit to simulate a missing header)
    #[arg(long)]
    user: Option<String>,

    /// HTTP method
    #[arg(long, default_value = "GET")]
    method: String,

    /// Request path
    #[arg(long, default_value = "/article")]
    path: String,

    /// JSON request body
    #[arg(long)]
    context: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("pep=debug")
            .init();
    }

    let outcome = match cli.command {
        Commands::Query { request } => query_command(&request),
        Commands::Check {
            request,
            pdp_url,
            timeout_ms,
            format,
        } => check_command(&request, pdp_url, timeout_ms, format).await,
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            ExitCode::from(2)
        }
    }
}

impl RequestArgs {
    fn to_query(&self) -> Result<AuthorizationQuery> {
        let context = match &self.context {
            Some(raw) => serde_json::from_str(raw).context("--context is not valid JSON")?,
            None => serde_json::Value::Null,
        };

        let query = QueryBuilder::new()
            .principal(self.user.as_deref().unwrap_or_default())
            .method(&self.method)
            .path(&self.path)
            .context(context)
            .build()?;
        Ok(query)
    }
}

fn query_command(request: &RequestArgs) -> Result<ExitCode> {
    let query = request.to_query()?;
    println!("{}", serde_json::to_string_pretty(&query)?);
    Ok(ExitCode::SUCCESS)
}

async fn check_command(
    request: &RequestArgs,
    pdp_url: Option<String>,
    timeout_ms: Option<u64>,
    format: Format,
) -> Result<ExitCode> {
    let query = request.to_query()?;

    let config = PepConfig::from_env().context("Failed to load configuration")?;
    let url = pdp_url.unwrap_or_else(|| config.pdp_url.clone());
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.pdp_timeout());
    let client = PdpClient::new(&url, timeout)?;

    if matches!(format, Format::Text) {
        println!("{} Asking {}...", "→".blue(), client.endpoint());
    }

    let start = Instant::now();
    let decision = client
        .is_authorized(&query)
        .await
        .with_context(|| format!("PDP call to {} failed", client.endpoint()))?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match format {
        Format::Json => {
            let output = serde_json::json!({
                "query": query,
                "decision": decision,
                "latencyMs": elapsed_ms,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => {
            let status = match decision {
                Decision::Allow => "ALLOWED".green(),
                Decision::Deny => "DENIED".red(),
            };

            println!("\n{} Authorization Result", "═".blue().bold());
            println!("{} Status: {}", "▸".blue(), status);
            println!("{} Principal: {}", "▸".blue(), query.principal);
            println!("{} Action: {}", "▸".blue(), query.action);
            println!("{} Resource: {}", "▸".blue(), query.resource);
            println!("{} PDP latency: {:.3}ms", "▸".blue(), elapsed_ms);
        }
    }

    Ok(if decision.is_allowed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
