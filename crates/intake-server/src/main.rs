use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use intake_core::app::{AppBuilder, BuildError, IntakeHandler, router};
use intake_core::impls::{BucketBackend, FsDocumentStore, InMemoryDocumentStore, ObjectStoreFetcher};
use intake_core::ports::{DocumentStore, ObjectFetcher};

mod config;
mod telemetry;

use config::{Config, ConfigError, DocumentBackend, ObjectBackend};

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// バックエンドのクライアントはここで 1 度だけ作る
fn build_handler(config: &Config) -> Result<IntakeHandler, BuildError> {
    let objects: Arc<dyn ObjectFetcher> = match &config.object_backend {
        ObjectBackend::Gcs => Arc::new(ObjectStoreFetcher::new(BucketBackend::Gcs)),
        ObjectBackend::Local { root } => {
            Arc::new(ObjectStoreFetcher::new(BucketBackend::Local { root: root.clone() }))
        }
    };

    let documents: Arc<dyn DocumentStore> = match &config.document_backend {
        DocumentBackend::Fs { root } => Arc::new(FsDocumentStore::new(root, &config.collection)),
        DocumentBackend::Memory => Arc::new(InMemoryDocumentStore::new()),
    };

    AppBuilder::new()
        .object_fetcher(objects)
        .document_store(documents)
        .build()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::from_env()?;
    telemetry::init_tracing(config.log_format);

    let handler = build_handler(&config)?;
    let app = router(Arc::new(handler));

    let listener = TcpListener::bind(config.listen).await?;
    info!(
        listen = %config.listen,
        objects = ?config.object_backend,
        documents = ?config.document_backend,
        collection = %config.collection,
        "csv intake listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_backend_combination_builds() {
        for object_backend in [
            ObjectBackend::Gcs,
            ObjectBackend::Local {
                root: "/tmp/objects".into(),
            },
        ] {
            for document_backend in [
                DocumentBackend::Fs {
                    root: "/tmp/documents".into(),
                },
                DocumentBackend::Memory,
            ] {
                let config = Config {
                    listen: "127.0.0.1:0".parse().unwrap(),
                    object_backend: object_backend.clone(),
                    document_backend,
                    collection: "processed_files".to_string(),
                    log_format: config::LogFormat::Text,
                };
                assert!(build_handler(&config).is_ok());
            }
        }
    }
}
