//! Compiler configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CompilerConfig (validated, immutable)
//!     → shared by the embedding agent with every compilation pass
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the snapshot producer owns reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CompilerConfig;
pub use schema::EnvelopeConfig;
pub use schema::ObservabilityConfig;
