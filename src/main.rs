//! Binary entrypoint: load configuration, wire up collaborators, serve.

use hlr_gsup::auth::HttpAuthClient;
use hlr_gsup::config::{self, HlrConfig};
use hlr_gsup::routing::RoutingStore;
use hlr_gsup::server::listener;
use hlr_gsup::server::HandlerContext;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HlrConfig::from_env()?;
    config::init_tracing(&config);

    info!(host = %config.host, port = config.port, "starting HLR GSUP front-end");

    let auth_client = Arc::new(HttpAuthClient::new(
        &config.auth_service_url,
        config.auth_service_timeout,
    ));
    let routing = RoutingStore::new();

    let ctx = HandlerContext {
        auth_client,
        routing,
        update_location_timeout: config.update_location_timeout,
    };

    let bind_addr = format!("{}:{}", config.host, config.port);
    let tcp_listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    listener::run(tcp_listener, ctx, shutdown).await?;

    info!("shutdown complete");
    Ok(())
}
