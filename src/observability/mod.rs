//! Logging and metrics.
//!
//! # Data Flow
//! ```text
//! Compilation passes produce:
//!     → logging.rs (structured log events per pass / failed chain)
//!     → metrics.rs (counters for passes, resources, failures)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Metrics endpoint owned by the embedding agent
//! ```

pub mod logging;
pub mod metrics;
