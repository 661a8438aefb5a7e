mod api;
mod app;
mod config;
mod console;
mod file_store;
mod services;
mod terminal;
mod widgets;

use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use deck::clock::{Clock, SystemClock};
use deck::poll::FetchError;
use deck::store::{KeyValueStore, StoreError};
use tokio::task::LocalSet;
use tracing::{error, info, warn};

use crate::api::TravelApi;
use crate::app::App;
use crate::config::{AppConfig, ConfigError};
use crate::file_store::FileBackend;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("travel client: {0}")]
    Travel(#[from] FetchError),
    #[error("console: {0}")]
    Console(#[from] std::io::Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    // Panels, caches, and the store are `Rc`-based; everything stays on this thread.
    match LocalSet::new().run_until(run()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "sidebar failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let backend = FileBackend::open(&config.store_path)?;
    info!(path = %backend.path().display(), namespace = %config.namespace, "store opened");
    let store = KeyValueStore::new(Rc::new(backend), config.namespace.clone());
    let clock: Rc<dyn Clock> = Rc::new(SystemClock);

    let fetch = match &config.api_key {
        Some(key) => Some(TravelApi::new(&config.api_url, key, config.request_timeout_secs)?.fetcher()),
        None => {
            warn!("SIDEBAR_API_KEY not set; travel panel will not poll");
            None
        }
    };

    let tick = Duration::from_millis(config.tick_ms);
    let app = Rc::new(RefCell::new(App::build(&config, store, clock, fetch)));
    let shown = app.borrow_mut().start();
    let heartbeat = Duration::from_millis(app.borrow().manager().config().heartbeat_interval_ms);

    let ticker = services::ticker::spawn_ticker(Rc::clone(&app), tick);
    let beat = services::heartbeat::spawn_heartbeat(Rc::clone(&app), heartbeat);
    info!(
        shown,
        owner = %app.borrow().owner(),
        "sidebar ready; type `help` for commands"
    );

    let result = console::run(Rc::clone(&app)).await;

    ticker.abort();
    beat.abort();
    app.borrow_mut().shutdown();
    result.map_err(AppError::from)
}
