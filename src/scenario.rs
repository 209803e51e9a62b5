//! Initial-state files and final-state reports.
//!
//! The text format is line oriented:
//!
//! ```text
//! # comment lines and blank lines are ignored
//! 400 10.5                       <- arena width W (integer) and duration
//! 100 200 1.5 -2.0 10 1.0        <- x y vx vy radius mass, one particle per line
//! ```
//!
//! The final-state report prints the width and the duration on lines of their own,
//! then one particle per line in input order, so two runs can be diffed directly.

use crate::core::{Particle, Simulation};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Number of numeric fields on a particle line.
pub const PARTICLE_FIELDS: usize = 6;

/// Parsed initial state, ready to hand to [`Simulation::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub width: u32,
    pub duration: f64,
    pub particles: Vec<Particle>,
}

impl Scenario {
    /// Parse a scenario from text. Fails on the first malformed line.
    pub fn parse(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        let (line_no, header) = lines
            .next()
            .ok_or_else(|| Error::parse(1, "missing header line `<width> <duration>`"))?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(Error::parse(
                line_no,
                format!("expected `<width> <duration>`, found {} fields", fields.len()),
            ));
        }
        let width: u32 = fields[0].parse().map_err(|_| {
            Error::parse(line_no, format!("width `{}` is not a non-negative integer", fields[0]))
        })?;
        let duration = parse_real(line_no, "duration", fields[1])?;

        let mut particles = Vec::new();
        for (line_no, line) in lines {
            particles.push(parse_particle(line_no, line)?);
        }

        Ok(Self {
            width,
            duration,
            particles,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Build a ready-to-run engine from this scenario.
    pub fn into_simulation(self) -> Result<Simulation> {
        Simulation::new(self.width, self.duration, self.particles)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.width, self.duration)?;
        for p in &self.particles {
            writeln!(f, "{}", ParticleLine(p))?;
        }
        Ok(())
    }
}

fn parse_real(line: usize, what: &str, raw: &str) -> Result<f64> {
    let x: f64 = raw
        .parse()
        .map_err(|_| Error::parse(line, format!("{what} `{raw}` is not a number")))?;
    if !x.is_finite() {
        return Err(Error::parse(line, format!("{what} must be finite")));
    }
    Ok(x)
}

fn parse_particle(line_no: usize, line: &str) -> Result<Particle> {
    const NAMES: [&str; PARTICLE_FIELDS] = ["x", "y", "vx", "vy", "radius", "mass"];
    let raw: Vec<&str> = line.split_whitespace().collect();
    if raw.len() != PARTICLE_FIELDS {
        return Err(Error::parse(
            line_no,
            format!(
                "expected {PARTICLE_FIELDS} fields `x y vx vy radius mass`, found {}",
                raw.len()
            ),
        ));
    }
    let mut vals = [0.0_f64; PARTICLE_FIELDS];
    for ((val, name), s) in vals.iter_mut().zip(NAMES).zip(&raw) {
        *val = parse_real(line_no, name, s)?;
    }
    let [x, y, vx, vy, radius, mass] = vals;
    Particle::new([x, y], [vx, vy], radius, mass).map_err(|e| Error::parse(line_no, e.to_string()))
}

struct ParticleLine<'a>(&'a Particle);

impl fmt::Display for ParticleLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.0;
        write!(
            f,
            "{} {} {} {} {} {}",
            p.r[0], p.r[1], p.v[0], p.v[1], p.radius, p.mass
        )
    }
}

/// Final kinematic state of one particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub mass: f64,
}

impl From<&Particle> for ParticleState {
    fn from(p: &Particle) -> Self {
        Self {
            x: p.r[0],
            y: p.r[1],
            vx: p.v[0],
            vy: p.v[1],
            radius: p.radius,
            mass: p.mass,
        }
    }
}

/// Output of a run: arena, end time and every particle in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalState {
    pub width: u32,
    pub duration: f64,
    pub time: f64,
    pub particles: Vec<ParticleState>,
}

impl FinalState {
    pub fn capture(sim: &Simulation) -> Self {
        Self {
            width: sim.width(),
            duration: sim.duration(),
            time: sim.time(),
            particles: sim.particles().iter().map(ParticleState::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Plain-text report: width, duration, then `x y vx vy radius mass` per particle.
impl fmt::Display for FinalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.width)?;
        writeln!(f, "{}", self.duration)?;
        for p in &self.particles {
            writeln!(
                f,
                "{} {} {} {} {} {}",
                p.x, p.y, p.vx, p.vy, p.radius, p.mass
            )?;
        }
        Ok(())
    }
}
