//! Admin API.
//!
//! # Routes
//! - `GET /admin/status`: host version and endpoint count
//! - `GET /admin/endpoints`: summary per published endpoint
//! - `DELETE /admin/endpoints/{port_id}`: undeploy one endpoint
//! - `GET /admin/naming`: flat listing of the naming tree
//!
//! Every route requires `Authorization: Bearer <api_key>`.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::lifecycle::EndpointRegistry;
use crate::naming::NamingContext;

use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Shared state of the admin routes.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<EndpointRegistry>,
    pub naming: Arc<dyn NamingContext>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(registry: Arc<EndpointRegistry>, naming: Arc<dyn NamingContext>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            registry,
            naming,
            api_key: api_key.into(),
        }
    }
}

#[allow(deprecated)]
pub fn setup_admin_router(state: AdminState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/endpoints", get(get_endpoints))
        .route("/admin/endpoints/{port_id}", delete(undeploy_endpoint))
        .route("/admin/naming", get(get_naming))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

/// Serve the admin router until `shutdown` fires.
pub async fn serve_admin(
    listener: TcpListener,
    router: Router,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
