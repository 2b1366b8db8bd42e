//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle, injection and admin code produce:
//!     → logging.rs (structured log events, one span per endpoint bring-up)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`port_id`, `class`, `lifecycle_id`) on every lifecycle event
//! - Teardown faults are warnings, bring-up failures are errors
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
