//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! adapter, server:
//!     → logging.rs (structured log events, per-request spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows into every adaptation span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
