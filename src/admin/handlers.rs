use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::lifecycle::endpoint::{EndpointSummary, TeardownStep};
use crate::naming::listing::{list_roots, NamingEntry};

/// Roots listed by `GET /admin/naming`.
pub const NAMING_ROOTS: [&str; 3] = ["global", "app", "comp"];

/// Module label attached to naming entries.
pub const NAMING_MODULE: &str = "host";

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: usize,
}

#[derive(Serialize)]
pub struct FaultView {
    pub step: TeardownStep,
    pub error: String,
}

#[derive(Serialize)]
pub struct UndeployResult {
    pub port_id: String,
    pub clean: bool,
    pub faults: Vec<FaultView>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        endpoints: state.registry.len(),
    })
}

pub async fn get_endpoints(State(state): State<AdminState>) -> Json<Vec<EndpointSummary>> {
    Json(state.registry.summaries())
}

pub async fn undeploy_endpoint(
    State(state): State<AdminState>,
    Path(port_id): Path<String>,
) -> Result<Json<UndeployResult>, StatusCode> {
    let registry = state.registry.clone();
    let id = port_id.clone();
    // Pre-destroy callbacks may block.
    let report = tokio::task::spawn_blocking(move || registry.undeploy(&id))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    tracing::info!(port_id = %port_id, clean = report.is_clean(), "Endpoint undeployed via admin API");
    Ok(Json(UndeployResult {
        port_id,
        clean: report.is_clean(),
        faults: report
            .faults()
            .iter()
            .map(|f| FaultView {
                step: f.step,
                error: f.error.to_string(),
            })
            .collect(),
    }))
}

pub async fn get_naming(State(state): State<AdminState>) -> Json<Vec<NamingEntry>> {
    Json(list_roots(state.naming.as_ref(), NAMING_MODULE, &NAMING_ROOTS))
}
