//! Discrete-event engine for elastic disk collisions.
//!
//! Leaves first: [`heap`] is the time-ordered queue, [`particle`] the kinematics and
//! collision physics, [`event`] the predicted collisions, and [`sim`] the engine that
//! ties them together.

pub mod event;
pub mod heap;
pub mod particle;
pub mod sim;

pub use event::{Event, EventKind};
pub use heap::Heap;
pub use particle::{Particle, Wall};
pub use sim::{Phase, Simulation, Stats, StepOutcome};
