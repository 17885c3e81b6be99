use std::sync::Arc;

use salvo::Listener;
use salvo::conn::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use webacl_app::app::router;
use webacl_core::config::load_config;
use webacl_core::types::ResourceId;
use webacl_service::fetch::{Dereferencer, HttpDereferencer};
use webacl_store::{FileStore, GraphStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting WebACL server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let base = ResourceId::parse(&config.server.base_url())?;
    tokio::fs::create_dir_all(&config.storage.root).await?;
    let store: Arc<dyn GraphStore> = Arc::new(FileStore::new(base.clone(), &config.storage.root));
    let remote: Arc<dyn Dereferencer> = Arc::new(HttpDereferencer::new(&config.fetch)?);

    tracing::info!(%base, root = %config.storage.root.display(), "Document store opened");

    let router = router(&config, store, remote)?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
