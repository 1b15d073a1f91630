//! Core types for the Skein flocking simulation: agent poses,
//! simulation configuration, and the tick error taxonomy.
//!
//! This crate is deliberately small and dependency-light. The concurrent
//! cell map lives in `skein-grid`; the tick pipeline lives in
//! `skein-engine`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pose;

pub use config::{ConfigError, FlockConfig, SteeringWeights};
pub use error::TickError;
pub use pose::Pose;
