#![allow(dead_code)]
use clap::Parser;
use regexlab_server::AppBuilder;
use regexlab_server::adapters::storage::{FileShareStore, ShareStore};
use regexlab_server::api::MgmtState;
use regexlab_server::config::Config;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::watch;

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub config: Config,
    pub storage_dir: PathBuf,
    pub store: Arc<FileShareStore>,
    shutdown_tx: watch::Sender<bool>,
    _storage: TempDir,
}

pub fn get_test_config(storage_dir: &std::path::Path) -> Config {
    Config::try_parse_from([
        "regexlab-server",
        "--host",
        "127.0.0.1",
        "--storage-dir",
        storage_dir.to_str().unwrap(),
        "--sweep-interval-secs",
        "3600",
    ])
    .unwrap()
}

impl TestApp {
    pub async fn spawn() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let config = get_test_config(storage.path());
        Self::spawn_with(storage, config).await
    }

    pub async fn spawn_with_config(mutate: impl FnOnce(&mut Config)) -> Self {
        let storage = tempfile::tempdir().unwrap();
        let mut config = get_test_config(storage.path());
        mutate(&mut config);
        Self::spawn_with(storage, config).await
    }

    async fn spawn_with(storage: TempDir, config: Config) -> Self {
        let store = Arc::new(FileShareStore::open(&config.storage.dir).await.unwrap());
        let injected: Arc<dyn ShareStore> = Arc::clone(&store) as Arc<dyn ShareStore>;
        let app = AppBuilder::new(config.clone()).with_store(injected).build().await.unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let api_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let api_addr = api_listener.local_addr().unwrap();
        let mgmt_addr = mgmt_listener.local_addr().unwrap();

        let app_router = regexlab_server::api::app_router(&config, app.services);
        let mgmt_router = regexlab_server::api::mgmt_router(MgmtState { health_service: app.health_service });

        let _ = app.workers.spawn_all(shutdown_rx.clone());

        let mut api_rx = shutdown_rx.clone();
        tokio::spawn(async move {
            axum::serve(api_listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(async move {
                    let _ = api_rx.wait_for(|&s| s).await;
                })
                .await
                .unwrap();
        });

        let mut mgmt_rx = shutdown_rx;
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt_router.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(async move {
                    let _ = mgmt_rx.wait_for(|&s| s).await;
                })
                .await
                .unwrap();
        });

        Self {
            server_url: format!("http://{api_addr}"),
            mgmt_url: format!("http://{mgmt_addr}"),
            client: reqwest::Client::new(),
            storage_dir: storage.path().to_path_buf(),
            store,
            config,
            shutdown_tx,
            _storage: storage,
        }
    }

    pub fn share_path(&self, id: &str) -> PathBuf {
        self.storage_dir.join(format!("{id}.json"))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
