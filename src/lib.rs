//! Event-driven simulation of elastic disk collisions in a square arena.
//!
//! State advances only at the instants collisions happen. Predicted collisions wait in
//! a time-ordered [`Heap`](core::Heap); a prediction made obsolete by an earlier
//! collision stays queued and is recognised as stale when it comes out.
//!
//! ```
//! use ballsim::scenario::{FinalState, Scenario};
//!
//! let scenario = Scenario::parse("100 10\n20 50 5 0 4 1\n80 50 -5 0 4 1\n")?;
//! let mut sim = scenario.into_simulation()?;
//! sim.run()?;
//! let report = FinalState::capture(&sim);
//! assert_eq!(report.particles.len(), 2);
//! # Ok::<(), ballsim::error::Error>(())
//! ```

pub mod core;
pub mod error;
pub mod generate;
pub mod render;
pub mod scenario;

pub use crate::core::{Event, EventKind, Particle, Phase, Simulation, StepOutcome, Wall};
pub use crate::error::{Error, Result};
