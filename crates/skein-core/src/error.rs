//! Tick-level error taxonomy.
//!
//! A tick either completes or fails as a whole; there is no partial
//! progress to report. Degenerate numeric cases (zero-length normalize
//! targets) and empty neighborhoods are recovered locally inside the
//! steering stage and never surface here.

use std::error::Error;
use std::fmt;

/// Errors from one `advance` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickError {
    /// The tick was rejected because the agent population exceeds the
    /// configured maximum. The simulation never silently truncates.
    CapacityExceeded {
        /// Number of agents submitted for this tick.
        agents: usize,
        /// Configured population limit.
        max_agents: usize,
    },
    /// An agent slot had no representative after the grouped reduction.
    ///
    /// Unreachable in correct operation: every hashed agent appears in
    /// exactly one cell-map entry, and every entry resolves a
    /// representative. Surfacing this instead of swallowing it turns a
    /// reducer bug into a halt rather than silent corruption.
    RepresentativeUnset {
        /// The slot whose representative was never assigned.
        slot: usize,
    },
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { agents, max_agents } => {
                write!(
                    f,
                    "agent count {agents} exceeds configured maximum {max_agents}"
                )
            }
            Self::RepresentativeUnset { slot } => {
                write!(
                    f,
                    "agent slot {slot} has no representative after reduction \
                     (internal consistency failure)"
                )
            }
        }
    }
}

impl Error for TickError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_counts() {
        let err = TickError::CapacityExceeded {
            agents: 10,
            max_agents: 4,
        };
        let text = err.to_string();
        assert!(text.contains("10"));
        assert!(text.contains('4'));
    }
}
