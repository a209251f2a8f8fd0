//! Parameter management for the `acs_destripe` task.
//!
//! # Data Flow
//! ```text
//! declared defaults (schema.rs)
//!     → parameter file, TOML or .cfg (loader.rs, parfile.rs)
//!     → NAME=VALUE overrides, parsed per declared kind (loader.rs)
//!     → validation.rs (semantic checks, all errors collected)
//!     → DestripeConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - The declaration table is the single source of names, kinds, defaults and help
//! - Every parameter has a default, so an empty file is a complete parameter set
//! - Validation separates syntactic (serde, kind parsing) from semantic checks

pub mod loader;
pub mod parfile;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, ConfigLoader};
pub use schema::{DestripeConfig, ParamDecl, ParamKind, ParamValue, Statistic, PARAMETERS};
pub use validation::{validate_config, validate_schema, SchemaError, ValidationError};
