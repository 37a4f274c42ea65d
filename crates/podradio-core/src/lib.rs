//! Core types: podcast records, player status, tracing setup

pub mod podcast;
pub mod tracing;

pub use podcast::{PlayerState, Podcast, Status};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
