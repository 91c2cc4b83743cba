//! TimeBars - A sequential countdown timer queue
//!
//! This is the main entry point for the timebars server.

use std::sync::Arc;
use tokio::{net::TcpListener, runtime::Handle};
use tracing::info;

use timebars::{
    api::create_router,
    config::Config,
    engine::QueueEngine,
    services::{AlarmNotifier, BellNotifier, CommandNotifier},
    state::AppState,
    store::{JsonFileStore, MemoryStore, QueueStore},
    tasks::tick_driver_task,
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timebars={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timebars v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms",
          config.host, config.port, config.tick_ms);

    let store: Arc<dyn QueueStore> = if config.ephemeral {
        info!("Ephemeral mode: the queue will not be saved");
        Arc::new(MemoryStore::new())
    } else {
        info!("Queue file: {}", config.state_file().display());
        Arc::new(JsonFileStore::new(config.state_file()))
    };

    let notifier: Arc<dyn AlarmNotifier> = match &config.alarm_command {
        Some(command) => {
            info!("Alarm command: {}", command);
            Arc::new(CommandNotifier::new(command.clone(), Handle::current()))
        }
        None => Arc::new(BellNotifier),
    };

    // Create application state around the restored queue
    let engine = QueueEngine::load(store, Arc::new(SystemClock), notifier);
    let state = Arc::new(AppState::new(engine, config.port, config.host.clone()));

    // Start the tick driver background task
    let tick_state = Arc::clone(&state);
    let period = config.tick_period();
    tokio::spawn(async move {
        tick_driver_task(tick_state, period).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timers      - Queue a timer {{label, duration, alarmEnabled}}");
    info!("  DELETE /timers/:id  - Remove a queued or paused timer");
    info!("  POST   /start       - Start or resume the queue");
    info!("  POST   /pause       - Pause the running timer");
    info!("  POST   /stop        - Reset the active timer and stop");
    info!("  POST   /clear       - Remove all timers");
    info!("  GET    /status      - Queue snapshot");
    info!("  GET    /health      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.persist() {
        tracing::error!("Failed to save queue on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
