//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! loader / validation / dqbits
//!     → tracing events (structured fields)
//!     → logging.rs subscriber (stderr)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is the binary's job
//! - `RUST_LOG` overrides the level derived from the `verbose` parameter

pub mod logging;
