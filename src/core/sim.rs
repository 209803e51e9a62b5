use crate::core::heap::Heap;
use crate::core::particle::{resolve_particle_collision, Wall, DIM, EPS_TIME};
use crate::core::{Event, EventKind, Particle};
use crate::error::{Error, Result};
use crate::render::{Frame, Renderer};
use serde::Serialize;
use tracing::{debug, info, trace};

/// Lifecycle of a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Constructed; the queue is empty until the first step seeds it.
    Seeding,
    /// Events are being extracted and processed.
    Running,
    /// The termination event has been processed; state is final.
    Terminated,
}

/// What a single call to [`Simulation::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Initial predictions were queued (termination event included).
    Seeded { queued: usize },
    /// A stale event was dropped; time and state are unchanged.
    Discarded,
    /// `particle` bounced off `wall` at `time`.
    WallCollision { time: f64, particle: usize, wall: Wall },
    /// Particles `a` and `b` collided at `time`.
    PairCollision { time: f64, a: usize, b: usize },
    /// All particles were drifted to the end time.
    Terminated,
    /// Nothing left to do.
    Idle,
}

impl StepOutcome {
    /// Whether the step moved particles or changed velocities.
    pub fn changed_state(&self) -> bool {
        matches!(
            self,
            StepOutcome::Seeded { .. }
                | StepOutcome::WallCollision { .. }
                | StepOutcome::PairCollision { .. }
                | StepOutcome::Terminated
        )
    }
}

/// Run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Events taken off the queue, stale ones included.
    pub extracted: u64,
    pub wall_collisions: u64,
    pub pair_collisions: u64,
    pub stale_discarded: u64,
    pub peak_queue_len: usize,
}

/// Event-driven simulation of hard disks in the square arena `[0, W] x [0, W]`.
///
/// Every prediction is queued eagerly and never removed when a trajectory changes.
/// Instead, an extracted event is checked against the `last_update` time and the
/// collision count of each particle it names, and dropped if any of them collided
/// after the prediction was made. The count also covers several collisions at one
/// instant, where timestamps alone cannot order the updates.
#[derive(Debug)]
pub struct Simulation {
    time_now: f64,
    width: u32,
    duration: f64,
    particles: Vec<Particle>,
    queue: Heap<Event>,
    phase: Phase,
    stats: Stats,
}

impl Simulation {
    /// Create an engine over `particles` in an arena of side `width`, to run until `duration`.
    ///
    /// Particles keep their input order. Every particle must be valid, lie fully inside
    /// the arena and not overlap any other (touching is allowed).
    pub fn new(width: u32, duration: f64, mut particles: Vec<Particle>) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidParam("arena width must be > 0".into()));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(Error::InvalidParam(
                "duration must be finite and >= 0".into(),
            ));
        }
        let w = f64::from(width);
        for (i, p) in particles.iter_mut().enumerate() {
            p.validate()
                .map_err(|e| Error::InvalidParam(format!("particle {i}: {e}")))?;
            if !p.fits_in(w) {
                return Err(Error::InvalidParam(format!(
                    "particle {i} extends outside the {width}x{width} arena"
                )));
            }
            p.last_update = 0.0;
            p.collision_count = 0;
        }
        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                if particles[i].overlaps(&particles[j]) {
                    return Err(Error::InvalidParam(format!(
                        "particles {i} and {j} overlap"
                    )));
                }
            }
        }

        Ok(Self {
            time_now: 0.0,
            width,
            duration,
            particles,
            queue: Heap::new(),
            phase: Phase::Seeding,
            stats: Stats::default(),
        })
    }

    /// Returns current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// Arena side length.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Configured end time.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Particles in input order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Queued events in heap order (not sorted).
    pub fn queued_events(&self) -> &[Event] {
        self.queue.as_slice()
    }

    /// Read-only view for renderers.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            time: self.time_now,
            width: self.width,
            particles: &self.particles,
        }
    }

    /// Compute total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Total linear momentum (diagnostic).
    pub fn momentum(&self) -> [f64; DIM] {
        self.particles.iter().fold([0.0; DIM], |mut acc, p| {
            for (a, m) in acc.iter_mut().zip(p.momentum()) {
                *a += m;
            }
            acc
        })
    }

    /// Run to completion.
    pub fn run(&mut self) -> Result<()> {
        while self.phase != Phase::Terminated {
            self.step()?;
        }
        Ok(())
    }

    /// Run to completion, handing `renderer` a frame after every step that changed state.
    pub fn run_with<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<()> {
        while self.phase != Phase::Terminated {
            if self.step()?.changed_state() {
                renderer.draw(&self.frame());
            }
        }
        Ok(())
    }

    /// Advance by exactly one unit of work: seeding, or one queue extraction.
    pub fn step(&mut self) -> Result<StepOutcome> {
        match self.phase {
            Phase::Seeding => self.seed(),
            Phase::Running => self.process_next(),
            Phase::Terminated => Ok(StepOutcome::Idle),
        }
    }

    // ============ Internal helpers ============

    fn seed(&mut self) -> Result<StepOutcome> {
        let n = self.particles.len();
        for i in 0..n {
            self.settle_walls(i);
        }
        for i in 0..n {
            self.schedule_walls(i)?;
            for j in (i + 1)..n {
                self.schedule_pair(i, j)?;
            }
        }
        self.queue.insert(Event::termination(self.duration)?);
        self.note_queue_len();
        self.phase = Phase::Running;

        let queued = self.queue.len();
        info!(
            particles = n,
            width = self.width,
            duration = self.duration,
            queued,
            "seeded event queue"
        );
        Ok(StepOutcome::Seeded { queued })
    }

    fn process_next(&mut self) -> Result<StepOutcome> {
        let ev = self.queue.extract_max().ok_or(Error::EmptyQueue)?;
        self.stats.extracted += 1;

        match ev.kind {
            EventKind::Termination => self.terminate(),
            _ if !ev.is_valid(&self.particles) => {
                self.stats.stale_discarded += 1;
                trace!(time = ev.time_f64(), created = ev.created_f64(), kind = ?ev.kind, "discarded stale event");
                Ok(StepOutcome::Discarded)
            }
            EventKind::Wall { particle, wall } => {
                let t = ev.time_f64();
                self.drift_all(t)?;
                let p = &mut self.particles[particle];
                p.reflect(wall);
                p.mark_updated(t);
                self.stats.wall_collisions += 1;
                debug!(time = t, particle, %wall, "wall collision");

                self.settle_walls(particle);
                self.reschedule_for_particle(particle)?;
                Ok(StepOutcome::WallCollision {
                    time: t,
                    particle,
                    wall,
                })
            }
            EventKind::Pair { a, b } => {
                let t = ev.time_f64();
                self.drift_all(t)?;
                let (p, q) = pair_mut(&mut self.particles, a, b)?;
                resolve_particle_collision(p, q, t)?;
                self.stats.pair_collisions += 1;
                debug!(time = t, a, b, "pair collision");

                // Both must be settled before either is rescheduled, or predictions
                // made for one would use the other's pre-reflection velocity.
                self.settle_walls(a);
                self.settle_walls(b);
                self.reschedule_for_particle(a)?;
                self.reschedule_for_particle(b)?;
                Ok(StepOutcome::PairCollision { time: t, a, b })
            }
        }
    }

    fn terminate(&mut self) -> Result<StepOutcome> {
        self.drift_all(self.duration)?;
        self.phase = Phase::Terminated;
        info!(
            time = self.time_now,
            wall_collisions = self.stats.wall_collisions,
            pair_collisions = self.stats.pair_collisions,
            stale_discarded = self.stats.stale_discarded,
            peak_queue_len = self.stats.peak_queue_len,
            "simulation terminated"
        );
        Ok(StepOutcome::Terminated)
    }

    /// Reflect particle `i` off any wall it is touching while still moving into it.
    ///
    /// A zero-delay wall prediction would be made and consumed at one instant, so such
    /// contacts are resolved on the spot instead of being queued. This also catches an edge that
    /// rounding left just past a wall whose queued hit went stale.
    fn settle_walls(&mut self, i: usize) {
        let w = f64::from(self.width);
        for wall in Wall::ALL {
            let p = &mut self.particles[i];
            if p.is_pressing(wall, w) {
                p.reflect(wall);
                p.mark_updated(self.time_now);
                self.stats.wall_collisions += 1;
                debug!(time = self.time_now, particle = i, %wall, "wall contact resolved in place");
            }
        }
    }

    fn reschedule_for_particle(&mut self, i: usize) -> Result<()> {
        self.schedule_walls(i)?;
        for j in 0..self.particles.len() {
            if j != i {
                self.schedule_pair(i, j)?;
            }
        }
        self.note_queue_len();
        Ok(())
    }

    fn schedule_walls(&mut self, i: usize) -> Result<()> {
        let w = f64::from(self.width);
        for wall in Wall::ALL {
            if let Some(dt) = self.particles[i].time_to_wall(wall, w) {
                self.push_prediction(dt, EventKind::Wall { particle: i, wall })?;
            }
        }
        Ok(())
    }

    fn schedule_pair(&mut self, a: usize, b: usize) -> Result<()> {
        if let Some(dt) = self.particles[a].time_to_particle(&self.particles[b]) {
            self.push_prediction(dt, EventKind::Pair { a, b })?;
        }
        Ok(())
    }

    /// Queue a prediction `dt` from now, unless it lands at or after the end time.
    ///
    /// The event snapshots the collision counts of the particles it names.
    fn push_prediction(&mut self, dt: f64, kind: EventKind) -> Result<()> {
        let t_abs = self.time_now + dt;
        if t_abs >= self.duration {
            return Ok(());
        }
        let count = |i: usize| self.particles[i].collision_count;
        let (cc_a, cc_b) = match kind {
            EventKind::Pair { a, b } => (count(a), Some(count(b))),
            EventKind::Wall { particle, .. } => (count(particle), None),
            EventKind::Termination => (0, None),
        };
        self.queue
            .insert(Event::new(t_abs, self.time_now, kind, cc_a, cc_b)?);
        Ok(())
    }

    fn note_queue_len(&mut self) {
        self.stats.peak_queue_len = self.stats.peak_queue_len.max(self.queue.len());
    }

    /// Drift all particles to the specified absolute time by linear motion.
    fn drift_all(&mut self, to_time: f64) -> Result<()> {
        if to_time < self.time_now - EPS_TIME {
            return Err(Error::InvalidParam("cannot drift backwards in time".into()));
        }
        let dt = to_time - self.time_now;
        if dt > 0.0 {
            for p in &mut self.particles {
                p.advance(dt);
            }
        }
        self.time_now = self.time_now.max(to_time);
        Ok(())
    }
}

// ============ Utility helpers ============

fn pair_mut(particles: &mut [Particle], a: usize, b: usize) -> Result<(&mut Particle, &mut Particle)> {
    if a == b {
        return Err(Error::InvalidParam(format!(
            "particle {a} cannot collide with itself"
        )));
    }
    if a < b {
        let (lo, hi) = particles.split_at_mut(b);
        Ok((&mut lo[a], &mut hi[0]))
    } else {
        let (lo, hi) = particles.split_at_mut(a);
        Ok((&mut hi[0], &mut lo[b]))
    }
}
