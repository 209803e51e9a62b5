use crate::core::particle::{Particle, Wall};
use crate::error::{Error, Result};
use ordered_float::NotNan;
use std::cmp::Ordering;

/// What a scheduled event predicts. Particles are referenced by index into the
/// engine's particle vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Contact between particles `a` and `b`.
    Pair { a: usize, b: usize },
    /// Particle `particle` reaching `wall`.
    Wall { particle: usize, wall: Wall },
    /// End of the run; always scheduled exactly at the configured duration.
    Termination,
}

/// A predicted future collision.
///
/// - `time`: absolute time the collision is predicted to happen.
/// - `created`: simulation time the prediction was computed at.
/// - `kind`: who collides with what.
/// - `cc_a`, `cc_b`: collision-count snapshots of the referenced particles (`cc_b` only
///   for pairs).
///
/// Ordering is by `time` only and is inverted: the earliest event compares greatest,
/// so it sits at the root of the max-heap. Events with equal `time` compare equal and
/// leave the queue in unspecified order.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub time: NotNan<f64>,
    pub created: NotNan<f64>,
    pub kind: EventKind,
    pub cc_a: u64,
    pub cc_b: Option<u64>,
}

impl Event {
    /// Create a new event, validating that both times are finite and `created <= time`.
    pub fn new(
        time: f64,
        created: f64,
        kind: EventKind,
        cc_a: u64,
        cc_b: Option<u64>,
    ) -> Result<Self> {
        if !time.is_finite() || !created.is_finite() {
            return Err(Error::InvalidParam("event times must be finite".into()));
        }
        if created > time {
            return Err(Error::InvalidParam(format!(
                "event predicted for t={time} cannot be created later, at t={created}"
            )));
        }
        let time =
            NotNan::new(time).map_err(|_| Error::InvalidParam("event time cannot be NaN".into()))?;
        let created = NotNan::new(created)
            .map_err(|_| Error::InvalidParam("event creation time cannot be NaN".into()))?;
        Ok(Self {
            time,
            created,
            kind,
            cc_a,
            cc_b,
        })
    }

    /// Sentinel marking the end of a run of length `duration`.
    pub fn termination(duration: f64) -> Result<Self> {
        Self::new(duration, 0.0, EventKind::Termination, 0, None)
    }

    /// Returns the raw f64 event time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }

    #[inline]
    pub fn created_f64(&self) -> f64 {
        self.created.into_inner()
    }

    #[inline]
    pub fn is_termination(&self) -> bool {
        matches!(self.kind, EventKind::Termination)
    }

    /// Whether the prediction still governs the referenced particles.
    ///
    /// Stale once any referenced particle has collided after the event was created, or
    /// its collision count no longer matches the snapshot (several events at one instant).
    /// The termination event is always valid.
    pub fn is_valid(&self, particles: &[Particle]) -> bool {
        let created = self.created_f64();
        let fresh = |i: usize, cc: u64| {
            particles
                .get(i)
                .is_some_and(|p| p.collision_count == cc && p.last_update <= created)
        };
        match self.kind {
            EventKind::Pair { a, b } => {
                fresh(a, self.cc_a) && self.cc_b.is_some_and(|cc| fresh(b, cc))
            }
            EventKind::Wall { particle, .. } => fresh(particle, self.cc_a),
            EventKind::Termination => true,
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}

impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier time = higher priority
        other.time.cmp(&self.time)
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
