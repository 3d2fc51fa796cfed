//! Marketplace CLI
//!
//! Drives the client network layer from a terminal: raw API calls, image
//! uploads through the configured provider, and session management.
//!
//! ```text
//! marketplace-cli ─▶ config (TOML + env) ─▶ Transport ─▶ ReqwestAdapter ─▶ backend
//!                                             │
//!                                             ├── CredentialStore (FileStore)
//!                                             └── ErrorReporter (error_logs)
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use marketplace_client::auth::{self, CredentialStore, LoggingNavigator};
use marketplace_client::config::{self, ClientConfig};
use marketplace_client::error::{Error, ErrorReporter, ReportOptions, TracingNotifier};
use marketplace_client::observability;
use marketplace_client::storage::{FileStore, KeyValueStore, MemoryStore};
use marketplace_client::transport::{Method, RequestOptions, ReqwestAdapter, Transport};
use marketplace_client::upload::{BatchProgressFn, UploadPipeline};

#[derive(Parser)]
#[command(name = "marketplace-cli")]
#[command(about = "Command-line client for the marketplace backend API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the backend origin
    #[arg(long)]
    base_url: Option<String>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET an API path
    Get {
        path: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
    /// POST a JSON body to an API path
    Post {
        path: String,
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Upload images through the configured provider
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Sign in and store the session token
    Login {
        phone: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the persisted error log
    Errors {
        /// Clear the log instead of printing it
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let mut defaults = ClientConfig::default();
            config::apply_env_overrides(&mut defaults, |key| std::env::var(key).ok())?;
            config::validate(defaults)?
        }
    };
    if let Some(base_url) = cli.base_url.clone() {
        config.api.base_url = Some(base_url);
        config = config::validate(config)?;
    }

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    observability::logging::init(&level)?;

    tracing::info!(
        api_root = %config.api.api_root(),
        upload_method = %config.upload.method,
        "marketplace-cli v0.1.0 starting"
    );

    let store: Arc<dyn KeyValueStore> = match &config.storage.path {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };
    let credentials = Arc::new(CredentialStore::new(store.clone()));
    let transport = Arc::new(Transport::new(
        &config,
        Arc::new(ReqwestAdapter::new()),
        credentials,
        Arc::new(LoggingNavigator),
    ));
    let reporter = ErrorReporter::new(store, Arc::new(TracingNotifier));

    let context = command_name(&cli.command);
    if let Err(e) = run(cli.command, &config, transport, &reporter).await {
        let record = reporter.handle(&e, Some(context), ReportOptions::silent());
        eprintln!("Error: {} ({})", record.message, e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(
    command: Commands,
    config: &ClientConfig,
    transport: Arc<Transport>,
    reporter: &ErrorReporter,
) -> marketplace_client::Result<()> {
    match command {
        Commands::Get { path, query } => {
            let body = (!query.is_empty()).then(|| {
                Value::Object(
                    query
                        .into_iter()
                        .map(|(k, v)| (k, Value::String(v)))
                        .collect(),
                )
            });
            let value = transport
                .dispatch(Method::Get, &path, body, RequestOptions::default())
                .await?;
            print_json(&value);
        }
        Commands::Post { path, body } => {
            let body = body
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()
                .map_err(|e| Error::Validation(format!("Invalid JSON body: {}", e)))?;
            let value = transport
                .dispatch(Method::Post, &path, body, RequestOptions::default())
                .await?;
            print_json(&value);
        }
        Commands::Upload { files } => {
            let pipeline = UploadPipeline::from_config(config, transport);
            let progress: BatchProgressFn = Arc::new(|index: usize, total: usize, p: f64| {
                eprintln!("[{}/{}] {:>3.0}%", index, total, p * 100.0);
            });
            for url in pipeline.upload_many(&files, Some(progress)).await? {
                println!("{}", url);
            }
        }
        Commands::Login { phone, password } => {
            let session = auth::login(&transport, &phone, &password).await?;
            print_json(&session.user);
        }
        Commands::Logout => {
            auth::logout(&transport).await;
            println!("Signed out");
        }
        Commands::Errors { clear } => {
            if clear {
                reporter.clear();
                println!("Error log cleared");
            } else {
                let records = reporter.records();
                let value = serde_json::to_value(&records)
                    .map_err(|e| Error::Other(format!("failed to encode error log: {}", e)))?;
                print_json(&value);
            }
        }
    }
    Ok(())
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Get { .. } => "get",
        Commands::Post { .. } => "post",
        Commands::Upload { .. } => "upload",
        Commands::Login { .. } => "login",
        Commands::Logout => "logout",
        Commands::Errors { .. } => "errors",
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}
