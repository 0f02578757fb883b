mod device;
mod report;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use geofetch_client::{IpInfoClient, IssuesClient};
use geofetch_core::{AppConfig, IntentSink, StateReader};
use geofetch_resolver::{
    group_issues_if_needed, issues_if_needed, AppState, IssueFetcher, LocationResolver,
    LocationSource, MemoryStore, ResolverConfig, StartupOrchestrator,
};
use tracing_subscriber::EnvFilter;

use crate::device::CliDevice;

#[derive(Debug, Parser)]
#[command(name = "geofetch")]
#[command(about = "Resolve a location and fetch the issues for it")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the startup sequence: locate, fetch issues, refresh the call count
    Startup {
        /// Raw startup query string (e.g. "forceAddress=80302")
        #[arg(long)]
        query: Option<String>,
        /// Address persisted from a previous session
        #[arg(long)]
        address: Option<String>,
        /// Device latitude
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Device longitude
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Milliseconds the device takes to report its fix
        #[arg(long, default_value_t = 0)]
        device_delay_ms: u64,
        /// Behave as if location permission was denied
        #[arg(long)]
        deny_device: bool,
    },
    /// Fetch all issues for an address unless they are already cached
    Issues {
        #[arg(long)]
        address: Option<String>,
    },
    /// Fetch one group's issues for an address
    Group {
        group_id: String,
        #[arg(long)]
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = geofetch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, log_level = %config.log_level, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Startup {
            query,
            address,
            lat,
            lon,
            device_delay_ms,
            deny_device,
        }) => {
            let device = CliDevice::from_args(
                lat,
                lon,
                deny_device,
                Duration::from_millis(device_delay_ms),
            );
            run_startup(&config, device, query.as_deref(), address).await?;
        }
        Some(Commands::Issues { address }) => {
            let store = seeded_store(address);
            let fetcher = IssueFetcher::new(issues_client(&config)?);
            let outcome = issues_if_needed(&fetcher, &store, &store).await;
            tracing::info!(outcome = ?outcome, "issues refresh finished");
            print_store(&store);
        }
        Some(Commands::Group { group_id, address }) => {
            let store = seeded_store(address);
            let fetcher = IssueFetcher::new(issues_client(&config)?);
            let outcome = group_issues_if_needed(&fetcher, &store, &store, &group_id).await;
            tracing::info!(group_id = %group_id, outcome = ?outcome, "group refresh finished");
            print_store(&store);
        }
        None => println!("no command given; see `geofetch --help`"),
    }

    Ok(())
}

async fn run_startup(
    config: &AppConfig,
    device: CliDevice,
    query: Option<&str>,
    address: Option<String>,
) -> anyhow::Result<()> {
    let ip = IpInfoClient::with_url(
        &config.ipinfo_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let store = Arc::new(seeded_store(address));
    let sink: Arc<dyn IntentSink> = store.clone();
    let reader: Arc<dyn StateReader> = store.clone();

    let resolver = LocationResolver::new(
        LocationSource::new(device, ip),
        IssueFetcher::new(issues_client(config)?),
        sink,
        reader,
        ResolverConfig::from(config),
    );
    let report = StartupOrchestrator::new(resolver).run(query).await;
    tracing::info!(
        location = ?report.location,
        call_count = ?report.call_count,
        "startup finished"
    );

    print_store(&store);
    Ok(())
}

fn issues_client(config: &AppConfig) -> anyhow::Result<IssuesClient> {
    Ok(IssuesClient::with_base_url(
        &config.api_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?)
}

fn seeded_store(address: Option<String>) -> MemoryStore {
    MemoryStore::with_state(AppState {
        address: address.unwrap_or_default(),
        ..AppState::default()
    })
}

fn print_store(store: &MemoryStore) {
    print!("{}", report::render_state(&store.state()));
    println!("journal:");
    print!("{}", report::render_journal(&store.journal()));
}
