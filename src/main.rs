//! Service endpoint host.
//!
//! ```text
//! config file ──▶ settings store ─────────────┐
//!             ──▶ naming context ──┐          │
//!             ──▶ [[endpoints]] ───┴─▶ EndpointRegistry::publish (per endpoint)
//!                                       descriptor → injection → handlers
//!
//! admin API ──▶ registry summaries, undeploy, naming listing
//! SIGINT/SIGTERM ──▶ Shutdown broadcast ──▶ stop_all (handlers → pre-destroy → transport)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use endpoint_host::admin::{serve_admin, setup_admin_router, AdminState};
use endpoint_host::config::loader::load_config;
use endpoint_host::config::{HostConfig, SettingsStore, SettingsWatcher};
use endpoint_host::descriptor::ReflectiveEngine;
use endpoint_host::injection::framework::StaticResolver;
use endpoint_host::injection::ClassRegistry;
use endpoint_host::lifecycle::endpoint::EndpointEnvironment;
use endpoint_host::lifecycle::signals::wait_for_shutdown_signal;
use endpoint_host::lifecycle::startup::publish_all;
use endpoint_host::lifecycle::{EndpointRegistry, Shutdown};
use endpoint_host::naming::NamingContext;
use endpoint_host::observability::{logging, metrics};
use endpoint_host::services;

#[derive(Parser, Debug)]
#[command(name = "endpoint-host")]
#[command(about = "Publishes service implementation classes as endpoints", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => HostConfig::default(),
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.observability.log_level);
    logging::init(log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoints = config.endpoints.len(),
        config = ?args.config,
        "endpoint-host starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let settings = Arc::new(SettingsStore::new(config.settings_snapshot()));
    let host_resources = StaticResolver::new("host").with_value("host.version", env!("CARGO_PKG_VERSION"));
    let naming: Arc<dyn NamingContext> = Arc::new(config.naming_context()?.with_resolver(Arc::new(host_resources)));

    let mut classes = ClassRegistry::new();
    services::register_builtin(&mut classes);

    let environment = EndpointEnvironment {
        naming: naming.clone(),
        engine: Arc::new(ReflectiveEngine),
    };
    let registry = Arc::new(EndpointRegistry::new(classes, environment, settings.clone()));

    let outcomes = publish_all(registry.clone(), config.endpoints.clone()).await;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::info!(published = registry.len(), failed, "Startup complete");

    let shutdown = Shutdown::new();

    // Settings reload: affects only endpoints started afterwards.
    let _watcher = match &args.config {
        Some(path) => match SettingsWatcher::new(path.clone(), settings.clone()).run() {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!(error = %e, "Settings watcher unavailable, settings will not reload");
                None
            }
        },
        None => None,
    };

    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState::new(registry.clone(), naming.clone(), config.admin.api_key.as_str());
        let router = setup_admin_router(state, Duration::from_secs(config.admin.request_timeout_secs));
        let rx = shutdown.subscribe();
        Some(tokio::spawn(serve_admin(listener, router, rx)))
    } else {
        None
    };

    wait_for_shutdown_signal().await;
    shutdown.trigger();

    if let Some(task) = admin_task {
        match task.await {
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API exited with error"),
            Err(e) => tracing::error!(error = %e, "Admin API task failed"),
            Ok(Ok(())) => {}
        }
    }

    let stop_registry = registry.clone();
    let reports = tokio::task::spawn_blocking(move || stop_registry.stop_all()).await?;
    for (port_id, report) in &reports {
        for fault in report.faults() {
            tracing::warn!(port_id = %port_id, step = fault.step.as_str(), error = %fault.error, "Teardown fault");
        }
    }

    tracing::info!(stopped = reports.len(), "Shutdown complete");
    Ok(())
}
