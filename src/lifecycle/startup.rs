//! Startup orchestration.
//!
//! # Responsibilities
//! - Publish every configured endpoint
//! - Report per-endpoint outcomes without aborting the others
//!
//! # Design Decisions
//! - Each bring-up is synchronous, so it runs on the blocking pool
//! - Independent endpoints come up concurrently
//! - One endpoint failing does not stop the rest from publishing

use std::sync::Arc;

use crate::config::schema::PortDeployment;
use crate::lifecycle::registry::{EndpointRegistry, PublishError};

/// Outcome of publishing one endpoint.
#[derive(Debug)]
pub struct PublishOutcome {
    pub port_id: String,
    pub result: Result<(), PublishError>,
}

/// Publish all `deployments` concurrently.
pub async fn publish_all(registry: Arc<EndpointRegistry>, deployments: Vec<PortDeployment>) -> Vec<PublishOutcome> {
    let mut tasks = Vec::with_capacity(deployments.len());
    for deployment in deployments {
        let registry = registry.clone();
        let port_id = deployment.port_id.clone();
        let task = tokio::task::spawn_blocking(move || registry.publish(deployment));
        tasks.push((port_id, task));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (port_id, task) in tasks {
        let result = match task.await {
            Ok(result) => result,
            Err(join_error) => {
                // A panicking bring-up never reached the registry.
                tracing::error!(port_id = %port_id, error = %join_error, "Endpoint bring-up panicked");
                continue;
            }
        };

        match &result {
            Ok(()) => tracing::info!(port_id = %port_id, "Endpoint published"),
            Err(e) => tracing::error!(port_id = %port_id, error = %e, "Endpoint not published"),
        }
        outcomes.push(PublishOutcome { port_id, result });
    }
    outcomes
}
