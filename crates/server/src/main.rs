use std::{sync::Arc, time::Instant};

use anyhow::Result;
use axum::serve;
use server::router::{create_app, AppState};
use tokio::{signal, sync::broadcast};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use waggle_core::{
    alerts::{AlertManager, AlertSweeper, MemoryAlertStore},
    checkers::{CheckerSet, HealthScoreChecker, InspectionOverdueChecker},
    config::AppConfig,
    events,
    hives::{HiveRegistry, InMemoryHiveRegistry},
    scoring::HiveScorer,
};

/// Initializes the logging system based on the configuration.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,waggle_core={level},server={level}",
            level = config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        // "pretty" and any other format default to pretty logging
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(false))
            .init();
    }
}

/// Container for initialized core services.
struct CoreServices {
    state: AppState,
    sweeper: Arc<AlertSweeper>,
    events_rx: tokio::sync::mpsc::UnboundedReceiver<events::DomainEvent>,
}

/// Wires the registry, scorer, checkers, store, manager, and sweeper together.
fn init_core_services(config: &AppConfig) -> Result<CoreServices> {
    let registry: Arc<dyn HiveRegistry> = Arc::new(InMemoryHiveRegistry::new());
    let store = Arc::new(MemoryAlertStore::new());
    let scorer = Arc::new(HiveScorer::new(config.scoring.clone()));

    let checkers = Arc::new(
        CheckerSet::new()
            .register(Box::new(InspectionOverdueChecker::new(config.checks.overdue)))
            .register(Box::new(HealthScoreChecker::new(
                scorer.clone(),
                config.checks.health,
            ))),
    );
    info!(checkers = ?checkers.checker_types(), "checker set initialized");

    let manager = Arc::new(AlertManager::new(store));
    let sweeper = Arc::new(AlertSweeper::new(
        registry.clone(),
        checkers,
        manager.clone(),
        config.sweep_interval(),
        config.retention.resolved_days,
        config.purge_interval(),
    ));

    let prometheus = if config.metrics.enabled {
        Some(
            waggle_core::metrics::init_prometheus()
                .map_err(|e| anyhow::anyhow!("Failed to initialize metrics: {e}"))?,
        )
    } else {
        None
    };

    let (events_tx, events_rx) = events::channel();

    let state = AppState {
        sweeper: sweeper.clone(),
        manager,
        registry,
        events: events_tx,
        prometheus,
        started_at: Instant::now(),
    };

    Ok(CoreServices { state, sweeper, events_rx })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Configuration loading failed: {e}"))?;
    config.validate().map_err(|e| anyhow::anyhow!("Configuration invalid: {e}"))?;

    init_logging(&config);
    info!("Starting Waggle alert service");
    debug!(
        environment = %config.environment,
        sweep_interval_seconds = config.checks.sweep_interval_seconds,
        retention_days = config.retention.resolved_days,
        bind_port = config.server.bind_port,
        "Configuration loaded"
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let services = init_core_services(&config)?;
    let sweep_handle = services.sweeper.start(shutdown_tx.subscribe());
    let retention_handle = services.sweeper.start_retention(shutdown_tx.subscribe());
    let events_handle = services
        .sweeper
        .start_event_listener(services.events_rx, shutdown_tx.subscribe());
    info!("Background sweep, retention, and event tasks started");

    let app = create_app(services.state, config.server.max_concurrent_requests);
    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Waggle server listening");

    if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error occurred");
    }

    let _ = shutdown_tx.send(());
    sweep_handle.abort();
    retention_handle.abort();
    events_handle.abort();
    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
