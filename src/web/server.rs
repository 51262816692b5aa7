//! Web server for filekeep.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{StorageConfig, WebConfig};
use crate::file::FileStorage;
use crate::{Database, FilekeepError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(
        config: &WebConfig,
        db: Arc<Database>,
        storage: Arc<FileStorage>,
        storage_config: &StorageConfig,
    ) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                FilekeepError::Config(format!(
                    "invalid web address {}:{}: {e}",
                    config.host, config.port
                ))
            })?;

        let app_state = AppState::new(db, storage)
            .with_max_upload_size(config.max_upload_size_bytes())
            .with_prune_empty_dirs(storage_config.prune_empty_dirs);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            web_config: config.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the complete router, health check included.
    pub fn router(&self) -> Router {
        create_router(self.app_state.clone(), &self.web_config.cors_origins)
            .merge(create_health_router())
    }

    /// Run the web server until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Web server stopped");
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn create_test_config() -> WebConfig {
        WebConfig {
            port: 0, // Use random port
            ..WebConfig::default()
        }
    }

    async fn create_server(config: &WebConfig) -> (Result<WebServer>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let storage = Arc::new(FileStorage::new(temp_dir.path()).unwrap());
        let server = WebServer::new(config, db, storage, &StorageConfig::default());
        (server, temp_dir)
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let (server, _temp) = create_server(&create_test_config()).await;
        let server = server.unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
        assert_eq!(server.app_state.max_upload_size, 10 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_web_server_invalid_address() {
        let config = WebConfig {
            host: "not an address".to_string(),
            ..create_test_config()
        };
        let (server, _temp) = create_server(&config).await;
        assert!(matches!(server, Err(FilekeepError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let (server, _temp) = create_server(&create_test_config()).await;
        let addr = server.unwrap().run_with_addr().await.unwrap();

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("OK"));
    }

    #[tokio::test]
    async fn test_web_server_graceful_shutdown() {
        let (server, _temp) = create_server(&create_test_config()).await;
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(server.unwrap().run(async move {
            let _ = rx.await;
        }));
        tx.send(()).unwrap();

        assert!(handle.await.unwrap().is_ok());
    }
}
