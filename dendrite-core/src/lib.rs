//! Core types and abstractions for the Dendrite indexing engine.
//!
//! This crate provides the foundational types, traits, and error handling
//! used across all Dendrite components.

pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod intermediate;
pub mod traits;
pub mod types;

pub use config::EngineConfig;
pub use error::{DendriteError, Result};
pub use events::{BufferSink, EventSink, IndexEvent, NullSink};
pub use intermediate::IntermediateStorage;
pub use traits::*;
pub use types::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::{DendriteError, Result};
    pub use crate::events::{EventSink, IndexEvent};
    pub use crate::intermediate::IntermediateStorage;
    pub use crate::traits::*;
    pub use crate::types::*;
}
