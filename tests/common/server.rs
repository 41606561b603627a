//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own catalog database.

use super::constants::*;
use super::fixtures::{test_tracks, write_csv_source};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use track_catalog_server::catalog_import::{run_import, ImportOutcome, ImportSettings};
use track_catalog_server::catalog_store::{CatalogStore, SqliteCatalogStore, Track};
use track_catalog_server::server::state::GuardedCatalogStore;
use track_catalog_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};

/// Test server instance with an isolated catalog
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Catalog store for direct database access in tests
    pub catalog_store: GuardedCatalogStore,

    /// Outcome of the startup import, if the server was spawned from a CSV source
    pub import_outcome: Option<ImportOutcome>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server seeded with the tracks from `test_tracks()`
    pub async fn spawn() -> Self {
        Self::spawn_with_tracks(test_tracks()).await
    }

    /// Spawns a server whose catalog holds exactly `tracks`
    pub async fn spawn_with_tracks(tracks: Vec<Track>) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&temp_db_dir);
        store
            .insert_tracks(&tracks)
            .expect("Failed to seed catalog");
        Self::start(temp_db_dir, store, None).await
    }

    /// Spawns a server after importing `csv` into an empty catalog, the way
    /// the server binary does at startup
    pub async fn spawn_from_csv(csv: &str) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let source_path = write_csv_source(temp_db_dir.path(), csv);
        let store = open_store(&temp_db_dir);

        let settings = ImportSettings {
            source_path: Some(source_path),
            ..Default::default()
        };
        let outcome = run_import(store.as_ref(), &settings).expect("Import failed");

        Self::start(temp_db_dir, store, Some(outcome)).await
    }

    async fn start(
        temp_db_dir: TempDir,
        catalog_store: GuardedCatalogStore,
        import_outcome: Option<ImportOutcome>,
    ) -> Self {
        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
            ..Default::default()
        };

        let app = make_app(config, catalog_store.clone()).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            catalog_store,
            import_outcome,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

fn open_store(dir: &TempDir) -> GuardedCatalogStore {
    Arc::new(
        SqliteCatalogStore::new(dir.path().join("catalog.db"), 2)
            .expect("Failed to open catalog store"),
    )
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
