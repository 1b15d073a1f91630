//! Skein: a flocking simulation core for large agent populations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Skein sub-crates. For most users, adding `skein` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use skein::prelude::*;
//! use skein::glam::Vec3;
//!
//! let config = FlockConfig {
//!     max_agents: 16,
//!     ..FlockConfig::default()
//! };
//! let mut sim = Simulation::new(config).unwrap();
//!
//! // The host owns the poses; the simulation rewrites them in place.
//! let mut poses = vec![
//!     Pose::new(Vec3::new(0.0, 0.0, 0.0), Vec3::X),
//!     Pose::new(Vec3::new(1.0, 0.0, 0.0), Vec3::X),
//! ];
//! sim.advance(&mut poses, 0.1).unwrap();
//! assert_ne!(poses[0].position, Vec3::ZERO);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `skein-core` | Poses, configuration, error types |
//! | [`grid`] | `skein-grid` | Jittered cell hashing, the concurrent cell map, grouped reduction |
//! | [`engine`] | `skein-engine` | The tick pipeline ([`engine::Simulation`]) |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`skein-core`).
///
/// Agent [`types::Pose`]s, the [`types::FlockConfig`] passed to
/// `Simulation::new`, and the [`types::ConfigError`]/[`types::TickError`]
/// taxonomy.
pub use skein_core as types;

/// Spatial partitioning (`skein-grid`).
///
/// Per-tick [`grid::TickJitter`] and [`grid::CellHasher`], the
/// fixed-capacity concurrent [`grid::CellMap`], and its grouped
/// reduction `for_each_group`.
pub use skein_grid as grid;

/// The tick pipeline (`skein-engine`).
///
/// [`engine::Simulation`] runs the snapshot, hash, reduce, and steer
/// stages; [`engine::ReductionView`] exposes the per-cell aggregates of
/// the most recent tick.
pub use skein_engine as engine;

/// Vector math types used throughout the public API.
pub use glam;

/// Common imports for typical Skein usage.
///
/// ```rust
/// use skein::prelude::*;
/// ```
pub mod prelude {
    pub use skein_core::{ConfigError, FlockConfig, Pose, SteeringWeights, TickError};
    pub use skein_engine::{ReductionView, Simulation};
    pub use skein_grid::TickJitter;
}
