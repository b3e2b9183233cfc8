//! `xregion`: command-line access to the cross-region HTTP layer.
//!
//! Resolves domain topology and regional origins against a configured
//! origin, and dispatches ad-hoc requests through the same policy the
//! library applies.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use reqwest::Method;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

use xregion_http::config::{self, ClientConfig, LogFormat};
use xregion_http::observability::init_logging;
use xregion_http::{ActiveStatus, HttpError, HttpService, RequestOptions};

#[derive(Parser)]
#[command(name = "xregion")]
#[command(
    about = "Resolve regional origins and dispatch cross-region requests",
    long_about = None
)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `transport.origin` from the configuration.
    #[arg(short, long)]
    origin: Option<String>,

    /// Emit JSON log lines.
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Status {
    Active,
    Passive,
}

impl From<Status> for ActiveStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Active => ActiveStatus::Active,
            Status::Passive => ActiveStatus::Passive,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show a domain's configuration
    Domain { domain: String },
    /// Read a feature flag value
    Flag {
        name: String,
        /// Flag parameter as key=value; repeatable, order preserved
        #[arg(short, long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// Resolve the origin of a domain's active or passive cluster
    Resolve {
        domain: String,
        #[arg(value_enum, default_value = "active")]
        status: Status,
    },
    /// Dispatch a request
    Request {
        path: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: Method,
        /// Query parameter as key=value; repeatable, order preserved
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
        /// JSON request body
        #[arg(short, long, value_parser = parse_json)]
        data: Option<Value>,
        /// Route to this domain's regional origin
        #[arg(long, requires = "status")]
        domain: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON body: {e}"))
}

fn load(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(origin) = &cli.origin {
        config.transport.origin = origin.clone();
        config::validate_config(&config)
            .map_err(config::ConfigError::Validation)
            .context("invalid --origin")?;
    }
    if cli.json_logs {
        config.observability.log_format = LogFormat::Json;
    }
    Ok(config)
}

async fn run(cli: Cli, service: HttpService) -> Result<Option<Value>, HttpError> {
    match cli.command {
        Commands::Domain { domain } => service
            .get_domain_config(&domain)
            .await
            .map(|config| Some(config.raw().clone())),
        Commands::Flag { name, params } => {
            let params: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            service.get_feature_flag(&name, &params).await
        }
        Commands::Resolve { domain, status } => service
            .get_regional_origin(&domain, status.into())
            .await
            .map(|origin| Some(Value::String(origin))),
        Commands::Request {
            path,
            method,
            query,
            data,
            domain,
            status,
        } => {
            let mut options = RequestOptions::new().method(method);
            options.query = query;
            if let (Some(domain), Some(status)) = (domain, status) {
                options = options.active_status(domain, status.into());
            }
            if let Some(data) = data {
                options = options.body(data);
            }
            service.request(&path, options).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    if let Err(e) = init_logging(&config.observability) {
        bail!("failed to initialize logging: {e}");
    }

    tracing::info!(
        origin = %config.transport.origin,
        ttl_secs = config.cache.domain_config_ttl_secs,
        "xregion starting"
    );

    let service = HttpService::from_config(&config).context("failed to build transport")?;

    match run(cli, service).await {
        Ok(Some(json)) => {
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(response) = e.response() {
                match e.json() {
                    Some(json) => eprintln!("Response: {}", serde_json::to_string_pretty(json)?),
                    None => eprintln!("Response: {}", response.text()),
                }
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
