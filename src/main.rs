/// Version injected at compile time via AZWB_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AZWB_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{bail, Context, Result};
use azwb::azure::{self, AzureClient};
use azwb::config::Config;
use azwb::manifest;
use azwb::state::{state_key, StateStore};
use azwb::workbook::{RemoteState, WorkbookError, Workbooks};
use clap::{Parser, Subcommand, ValueEnum};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Manage Application Insights workbooks declaratively
#[derive(Parser, Debug)]
#[command(name = "azwb", version = VERSION, about, long_about = None)]
struct Args {
    /// Azure subscription to use
    #[arg(short, long, global = true)]
    subscription: Option<String>,

    /// State file recording applied identities
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update workbooks from manifest files
    Apply {
        /// Manifest files (YAML, or JSON by extension)
        #[arg(short = 'f', long = "file", required = true)]
        files: Vec<PathBuf>,

        /// How many workbooks to reconcile at once
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Show the remote state of a workbook
    Show {
        /// Identity, or `resource_group/name` of a tracked workbook
        target: String,
    },
    /// Print a manifest for an existing workbook and start tracking it
    Import {
        identity: String,
    },
    /// Delete a workbook
    Delete {
        /// Identity, or `resource_group/name` of a tracked workbook
        target: String,
    },
    /// Write a starter manifest
    Init {
        #[arg(long)]
        name: String,
        #[arg(long)]
        resource_group: String,
        /// Identity of the Application Insights component
        #[arg(long)]
        application_insights_id: String,
        #[arg(long)]
        location: String,
        /// Object id of the owning user
        #[arg(long)]
        user_id: uuid::Uuid,
    },
    /// Inspect or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

/// File logging under the config dir; `RUST_LOG` takes precedence over `--log-level`
fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives).ok()?,
        _ => EnvFilter::new(level.directive()?),
    };

    let log_dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Cannot create log directory {}: {}", log_dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        "azwb {} logging to {}",
        VERSION,
        log_dir.join(LOG_FILE).display()
    );

    Some(guard)
}

const LOG_FILE: &str = "azwb.log";

fn log_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("azwb"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".azwb")))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        eprintln!("Error: {}", render_error(&err));
        std::process::exit(1);
    }
}

/// Prefer a short hint for remote failures, keeping the resource context
fn render_error(err: &anyhow::Error) -> String {
    if let Some(wb) = err.downcast_ref::<WorkbookError>() {
        if let Some(api) = wb.api_error() {
            return format!("{:#}\n  hint: {}", err, azure::format_api_error(api));
        }
    }
    format!("{:#}", err)
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();
    if let Some(subscription) = &args.subscription {
        config.subscription_id = Some(subscription.clone());
    }
    if let Some(state) = &args.state {
        config.state_path = Some(state.clone());
    }

    match args.command {
        Command::Apply { files, concurrency } => apply(&config, &files, concurrency).await,
        Command::Show { target } => show(&config, &target).await,
        Command::Import { identity } => import(&config, &identity).await,
        Command::Delete { target } => delete(&config, &target).await,
        Command::Init {
            name,
            resource_group,
            application_insights_id,
            location,
            user_id,
        } => {
            let desired = manifest::scaffold(
                &name,
                &resource_group,
                &application_insights_id,
                &location,
                user_id,
            );
            desired.validate()?;
            print!("{}", manifest::to_yaml(&desired)?);
            Ok(())
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
            ConfigAction::Set { key, value } => {
                // Persist without the per-invocation overrides
                let mut saved = Config::load();
                saved.set(&key, &value)?;
                saved.save()?;
                println!("Saved {} to {:?}", key, Config::config_path().unwrap_or_default());
                Ok(())
            }
        },
    }
}

fn build_client(config: &Config) -> Result<AzureClient> {
    let subscription = config.effective_subscription()?;
    let endpoint = config.effective_endpoint()?;
    let authority = config.effective_authority_host()?;

    let source = azure::credential_source_from_env(
        &authority,
        config.effective_tenant().as_deref(),
        config.effective_client_id().as_deref(),
    )?;

    tracing::info!("Using subscription: {}, endpoint: {}", subscription, endpoint);

    Ok(AzureClient::new(&subscription, &endpoint, source)?
        .with_api_version(&config.effective_api_version()))
}

/// Run `op` under a timeout; Ctrl-C or expiry drops the in-flight request
async fn bounded<T, F>(what: &str, limit: Duration, op: F) -> Result<T>
where
    F: Future<Output = Result<T, WorkbookError>>,
{
    tokio::select! {
        result = tokio::time::timeout(limit, op) => match result {
            Ok(inner) => Ok(inner?),
            Err(_) => bail!("{} timed out after {}s", what, limit.as_secs()),
        },
        _ = tokio::signal::ctrl_c() => bail!("{} interrupted", what),
    }
}

/// Accept either a full identity or a tracked `resource_group/name` key
fn resolve_target(store: &StateStore, target: &str) -> Result<String> {
    if target.starts_with('/') {
        return Ok(target.to_string());
    }
    store
        .get(target)
        .map(str::to_string)
        .with_context(|| format!("{:?} is not tracked in the state file", target))
}

async fn apply(config: &Config, files: &[PathBuf], concurrency: usize) -> Result<()> {
    let manifests = files
        .iter()
        .map(|f| manifest::load(f))
        .collect::<Result<Vec<_>>>()?;

    let mut store = StateStore::open(&config.effective_state_path())?;
    let client = build_client(config)?;
    let workbooks = Workbooks::new(client);
    let limit = config.timeouts.create_update();

    let jobs = manifests.into_iter().map(|desired| {
        let key = state_key(&desired.resource_group, &desired.name);
        let existing = store.get(&key).map(str::to_string);
        let workbooks = &workbooks;
        async move {
            let what = format!("apply of {}", key);
            let result = bounded(&what, limit, workbooks.apply(&desired, existing.as_deref())).await;
            (key, result)
        }
    });

    let results: Vec<_> = stream::iter(jobs)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut failures = Vec::new();
    for (key, result) in results {
        match result {
            Ok(applied) => {
                println!("{}: {}", key, applied.identity);
                store.insert(key, applied.identity);
            }
            Err(err) => {
                eprintln!("{}: {}", key, render_error(&err));
                failures.push(key);
            }
        }
    }
    store.save()?;

    if !failures.is_empty() {
        bail!("{} of {} workbooks failed to apply", failures.len(), files.len());
    }
    Ok(())
}

async fn show(config: &Config, target: &str) -> Result<()> {
    let mut store = StateStore::open(&config.effective_state_path())?;
    let identity = resolve_target(&store, target)?;
    let workbooks = Workbooks::new(build_client(config)?);

    let state = bounded("read", config.timeouts.read(), workbooks.read(&identity)).await?;
    match state {
        Some(state) => print_state(&state),
        None => {
            println!("Workbook {} no longer exists", identity);
            if store.remove_identity(&identity) {
                store.save()?;
            }
        }
    }
    Ok(())
}

async fn import(config: &Config, identity: &str) -> Result<()> {
    let mut store = StateStore::open(&config.effective_state_path())?;
    let workbooks = Workbooks::new(build_client(config)?);

    let imported = bounded("import", config.timeouts.read(), workbooks.import(identity)).await?;
    let Some((state, desired)) = imported else {
        bail!("Cannot import {}: workbook does not exist", identity);
    };

    store.insert(state_key(&state.resource_group, &state.name), state.identity.clone());
    store.save()?;
    print!("{}", manifest::to_yaml(&desired)?);
    Ok(())
}

async fn delete(config: &Config, target: &str) -> Result<()> {
    let mut store = StateStore::open(&config.effective_state_path())?;
    let identity = resolve_target(&store, target)?;
    let workbooks = Workbooks::new(build_client(config)?);

    bounded("delete", config.timeouts.delete(), workbooks.delete(&identity)).await?;

    if store.remove_identity(&identity) {
        store.save()?;
    }
    println!("Deleted {}", identity);
    Ok(())
}

fn print_state(state: &RemoteState) {
    let dash = "-".to_string();
    println!("identity:        {}", state.identity);
    println!("name:            {}", state.name);
    println!("resource group:  {}", state.resource_group);
    println!("location:        {}", state.location.as_ref().unwrap_or(&dash));
    println!(
        "kind:            {}",
        state.kind.map(|k| k.to_string()).unwrap_or_else(|| dash.clone())
    );
    println!(
        "component:       {}",
        state.parent_resource_id.as_ref().unwrap_or(&dash)
    );
    println!("category:        {}", state.category.as_ref().unwrap_or(&dash));
    println!("version:         {}", state.version.as_ref().unwrap_or(&dash));
    println!("workbook id:     {}", state.workbook_id.as_ref().unwrap_or(&dash));
    println!("user id:         {}", state.user_id.as_ref().unwrap_or(&dash));
    if !state.labels.is_empty() {
        println!("workbook tags:   {}", state.labels.join(", "));
    }
    for (key, value) in &state.tags {
        println!("tag:             {}={}", key, value);
    }
    if let Some(modified) = state.time_modified.as_deref() {
        let rendered = chrono::DateTime::parse_from_rfc3339(modified)
            .map(|t| {
                t.with_timezone(&chrono::Utc)
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string()
            })
            .unwrap_or_else(|_| modified.to_string());
        println!("modified:        {}", rendered);
    }
}
