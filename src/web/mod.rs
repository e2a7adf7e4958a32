pub mod error;
pub mod handlers;
pub mod identity;
pub mod metered;


use crate::AppContext;
use anyhow::Result;
use axum::Router;
use handlers::{
    admin::admin_router, analytics::analytics_router, dashboard::dashboard_router,
    health::health_router, locations::locations_router, properties::properties_router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .merge(health_router())
        .merge(locations_router())
        .merge(properties_router(ctx.clone()))
        .merge(analytics_router(ctx.clone()))
        .merge(dashboard_router(ctx.clone()))
        .merge(admin_router(ctx))
}

pub async fn start_server(ctx: Arc<AppContext>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
