#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;
pub mod workers;

use crate::adapters::storage::{FileShareStore, ShareStore};
use crate::api::ServiceContainer;
use crate::config::{Config, IdScheme};
use crate::domain::share_id::{ClockDigest, IdGenerator, RandomToken};
use crate::services::health_service::HealthService;
use crate::services::regex_service::RegexService;
use crate::services::share_service::ShareService;
use crate::workers::ShareSweepWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Fully wired application, ready to be served.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
    pub workers: Workers,
}

/// Background tasks owned by the process lifecycle.
#[derive(Debug)]
pub struct Workers {
    pub share_sweep: ShareSweepWorker,
}

impl Workers {
    /// Spawns every worker; each one exits once `shutdown_rx` flips to `true`.
    #[must_use]
    pub fn spawn_all(self, shutdown_rx: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        vec![tokio::spawn(self.share_sweep.run(shutdown_rx).instrument(tracing::info_span!("share_sweep_worker")))]
    }
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    store: Option<Arc<dyn ShareStore>>,
}

impl AppBuilder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, store: None }
    }

    /// Uses `store` instead of opening the configured share directory.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ShareStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Wires services and workers around a single shared store.
    ///
    /// # Errors
    /// Returns an error if the share directory cannot be created.
    pub async fn build(self) -> anyhow::Result<App> {
        let store: Arc<dyn ShareStore> = match self.store {
            Some(store) => store,
            None => Arc::new(FileShareStore::open(&self.config.storage.dir).await?),
        };

        let ids: Arc<dyn IdGenerator> = match self.config.storage.id_scheme {
            IdScheme::ClockDigest => Arc::new(ClockDigest),
            IdScheme::Random => Arc::new(RandomToken),
        };

        let regex_service = RegexService::new(self.config.regex.clone());
        let share_service = ShareService::new(Arc::clone(&store), ids, regex_service.clone());
        let health_service = HealthService::new(Arc::clone(&store), self.config.health.clone());

        // tokio::time::interval panics on a zero period
        let sweep_interval = Duration::from_secs(self.config.storage.sweep_interval_secs.max(1));
        let share_sweep = ShareSweepWorker::new(store, sweep_interval);

        Ok(App {
            services: ServiceContainer { share_service, regex_service },
            health_service,
            workers: Workers { share_sweep },
        })
    }
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {}
            () = terminate => {}
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through tracing before the default hook runs.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "Panic occurred");
        default_hook(info);
    }));
}
