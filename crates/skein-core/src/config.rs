//! Simulation configuration and validation.
//!
//! [`FlockConfig`] is the immutable input to `Simulation::new`. All world
//! constants (cage size, sense radius, steering weights) live here rather
//! than as compile-time constants, so tests and hosts can vary them per
//! scenario. [`FlockConfig::validate`] checks structural invariants once,
//! at construction time.

use std::error::Error;
use std::fmt;

// ── SteeringWeights ────────────────────────────────────────────────

/// Relative strength of each steering force.
///
/// All weights must be finite and non-negative. A weight of zero disables
/// that force entirely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringWeights {
    /// Push away from the neighborhood's average position, scaled by how
    /// deep inside the sense radius the agent already is.
    pub separation: f32,
    /// Pull toward the neighborhood's average position.
    pub cohesion: f32,
    /// Pull toward the neighborhood's average heading.
    pub alignment: f32,
    /// Push away from the cage boundary.
    pub obstacle: f32,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self {
            separation: 20.0,
            cohesion: 10.0,
            alignment: 10.0,
            obstacle: 30.0,
        }
    }
}

// ── FlockConfig ────────────────────────────────────────────────────

/// Immutable configuration for a flocking simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct FlockConfig {
    /// Half-extent of the symmetric cage box centered on the origin.
    pub cage_half_extent: f32,
    /// Neighborhood radius. Also the spatial-hash cell edge length and the
    /// distance from the cage boundary at which the obstacle force engages.
    pub sense_radius: f32,
    /// Constant agent speed. Steering perturbs heading, never speed.
    pub speed: f32,
    /// Steering force weights.
    pub weights: SteeringWeights,
    /// Maximum agent population. Ticks with more agents are rejected, and
    /// the cell map is sized for exactly this many entries.
    pub max_agents: usize,
    /// Seed for the per-tick jitter RNG.
    pub seed: u64,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            cage_half_extent: 20.0,
            sense_radius: 10.0,
            speed: 5.0,
            weights: SteeringWeights::default(),
            max_agents: 200_000,
            seed: 0,
        }
    }
}

impl FlockConfig {
    /// Hard population ceiling: agent slots are `u32` and cell-map entry
    /// indices are `i32`.
    pub const MAX_AGENT_LIMIT: usize = i32::MAX as usize;

    /// Check structural invariants.
    ///
    /// Returns the first violation found. Called by `Simulation::new`;
    /// hosts constructing configs programmatically can call it directly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sense_radius > 0.0) || !self.sense_radius.is_finite() {
            return Err(ConfigError::NonPositiveSenseRadius {
                value: self.sense_radius,
            });
        }
        if !(self.cage_half_extent > 0.0) || !self.cage_half_extent.is_finite() {
            return Err(ConfigError::NonPositiveCageHalfExtent {
                value: self.cage_half_extent,
            });
        }
        if !(self.speed >= 0.0) || !self.speed.is_finite() {
            return Err(ConfigError::NegativeSpeed { value: self.speed });
        }
        if self.max_agents == 0 {
            return Err(ConfigError::ZeroMaxAgents);
        }
        if self.max_agents > Self::MAX_AGENT_LIMIT {
            return Err(ConfigError::MaxAgentsTooLarge {
                value: self.max_agents,
                limit: Self::MAX_AGENT_LIMIT,
            });
        }
        let weights = [
            ("separation", self.weights.separation),
            ("cohesion", self.weights.cohesion),
            ("alignment", self.weights.alignment),
            ("obstacle", self.weights.obstacle),
        ];
        for (which, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { which, value });
            }
        }
        if self.cage_half_extent < self.sense_radius {
            return Err(ConfigError::CageSmallerThanSenseRadius {
                cage_half_extent: self.cage_half_extent,
                sense_radius: self.sense_radius,
            });
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// A structural problem with a [`FlockConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `sense_radius` must be finite and strictly positive.
    NonPositiveSenseRadius {
        /// The rejected value.
        value: f32,
    },
    /// `cage_half_extent` must be finite and strictly positive.
    NonPositiveCageHalfExtent {
        /// The rejected value.
        value: f32,
    },
    /// `speed` must be finite and non-negative.
    NegativeSpeed {
        /// The rejected value.
        value: f32,
    },
    /// `max_agents` must be at least 1.
    ZeroMaxAgents,
    /// `max_agents` exceeds [`FlockConfig::MAX_AGENT_LIMIT`].
    MaxAgentsTooLarge {
        /// The rejected value.
        value: usize,
        /// The hard ceiling.
        limit: usize,
    },
    /// A steering weight was negative, NaN, or infinite.
    InvalidWeight {
        /// Which weight was rejected.
        which: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// The cage must be at least one sense radius across per half-extent,
    /// otherwise every point in the cage is inside the boundary band.
    CageSmallerThanSenseRadius {
        /// The configured cage half-extent.
        cage_half_extent: f32,
        /// The configured sense radius.
        sense_radius: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveSenseRadius { value } => {
                write!(f, "sense_radius must be positive and finite (got {value})")
            }
            Self::NonPositiveCageHalfExtent { value } => {
                write!(
                    f,
                    "cage_half_extent must be positive and finite (got {value})"
                )
            }
            Self::NegativeSpeed { value } => {
                write!(f, "speed must be non-negative and finite (got {value})")
            }
            Self::ZeroMaxAgents => write!(f, "max_agents must be at least 1"),
            Self::MaxAgentsTooLarge { value, limit } => {
                write!(f, "max_agents {value} exceeds the hard limit {limit}")
            }
            Self::InvalidWeight { which, value } => {
                write!(f, "{which} weight must be non-negative and finite (got {value})")
            }
            Self::CageSmallerThanSenseRadius {
                cage_half_extent,
                sense_radius,
            } => {
                write!(
                    f,
                    "cage_half_extent ({cage_half_extent}) must be at least \
                     sense_radius ({sense_radius})"
                )
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(FlockConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_sense_radius() {
        let config = FlockConfig {
            sense_radius: 0.0,
            ..FlockConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveSenseRadius { .. })
        ));
    }

    #[test]
    fn rejects_nan_sense_radius() {
        let config = FlockConfig {
            sense_radius: f32::NAN,
            ..FlockConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveSenseRadius { .. })
        ));
    }

    #[test]
    fn rejects_negative_speed() {
        let config = FlockConfig {
            speed: -1.0,
            ..FlockConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeSpeed { .. })
        ));
    }

    #[test]
    fn accepts_zero_speed() {
        let config = FlockConfig {
            speed: 0.0,
            ..FlockConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_max_agents() {
        let config = FlockConfig {
            max_agents: 0,
            ..FlockConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxAgents));
    }

    #[test]
    fn rejects_negative_weight() {
        let config = FlockConfig {
            weights: SteeringWeights {
                cohesion: -0.5,
                ..SteeringWeights::default()
            },
            ..FlockConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight {
                which: "cohesion",
                ..
            })
        ));
    }

    #[test]
    fn rejects_cage_smaller_than_sense_radius() {
        let config = FlockConfig {
            cage_half_extent: 5.0,
            sense_radius: 10.0,
            ..FlockConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CageSmallerThanSenseRadius { .. })
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn well_formed_configs_validate(
                sense in 0.1f32..100.0,
                extra in 0.0f32..100.0,
                speed in 0.0f32..50.0,
                weights in prop::array::uniform4(0.0f32..100.0),
                max_agents in 1usize..1_000_000,
            ) {
                let config = FlockConfig {
                    cage_half_extent: sense + extra,
                    sense_radius: sense,
                    speed,
                    weights: SteeringWeights {
                        separation: weights[0],
                        cohesion: weights[1],
                        alignment: weights[2],
                        obstacle: weights[3],
                    },
                    max_agents,
                    seed: 0,
                };
                prop_assert!(config.validate().is_ok());
            }
        }
    }
}
