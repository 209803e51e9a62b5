use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Fixed spatial dimension (2D arena).
pub const DIM: usize = 2;

/// Relative-time tolerance below which a pairwise contact is not predicted.
pub const EPS_TIME: f64 = 1e-12;

/// Edge-to-wall distance treated as contact.
pub const EPS_CONTACT: f64 = 1e-9;

/// One of the four arena boundaries.
///
/// The arena spans `[0, W]` on both axes. `Top` is `y = 0` and `Bottom` is `y = W`
/// (screen convention, y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::Left, Wall::Right, Wall::Top, Wall::Bottom];

    /// Axis normal to this wall (0 = x, 1 = y).
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Wall::Left | Wall::Right => 0,
            Wall::Top | Wall::Bottom => 1,
        }
    }

    /// True for the wall at coordinate `W`, false for the one at `0`.
    #[inline]
    pub fn is_far(self) -> bool {
        matches!(self, Wall::Right | Wall::Bottom)
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Wall::Left => "LEFT",
            Wall::Right => "RIGHT",
            Wall::Top => "TOP",
            Wall::Bottom => "BOTTOM",
        };
        f.write_str(name)
    }
}

/// A hard disk in the arena.
///
/// Fields:
/// - `r`: centre position [x, y]
/// - `v`: velocity [vx, vy]
/// - `radius`: disk radius (> 0)
/// - `mass`: disk mass (> 0)
/// - `last_update`: simulation time of the last velocity change; events predicted
///   before this instant are stale
/// - `collision_count`: incremented on every velocity change; events carry a snapshot
///   and go stale on mismatch, which also separates updates made at the same instant
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    /// Disk radius (> 0).
    pub radius: f64,
    /// Mass (> 0).
    pub mass: f64,
    /// Time of the last collision this particle took part in.
    pub last_update: f64,
    /// Number of velocity changes so far.
    pub collision_count: u64,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` or `mass` is non-positive or any component is NaN/inf.
    pub fn new(r: [f64; DIM], v: [f64; DIM], radius: f64, mass: f64) -> Result<Self> {
        let p = Self {
            r,
            v,
            radius,
            mass,
            last_update: 0.0,
            collision_count: 0,
        };
        p.validate()?;
        Ok(p)
    }

    /// Check the invariants `new` enforces, for particles built field by field.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !self.r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !self.v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.r[0]
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.r[1]
    }

    /// Straight-line drift by `dt`.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        for (rk, vk) in self.r.iter_mut().zip(self.v.iter()) {
            *rk += vk * dt;
        }
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * dot(&self.v, &self.v)
    }

    /// Linear momentum m v.
    #[inline]
    pub fn momentum(&self) -> [f64; DIM] {
        [self.mass * self.v[0], self.mass * self.v[1]]
    }

    /// True if the disk lies entirely inside an arena of side `width` (touching allowed).
    pub fn fits_in(&self, width: f64) -> bool {
        self.r
            .iter()
            .all(|&c| c - self.radius >= 0.0 && c + self.radius <= width)
    }

    /// True if the two disks overlap (touching does not count).
    pub fn overlaps(&self, other: &Particle) -> bool {
        let d = sub(&other.r, &self.r);
        let r_sum = self.radius + other.radius;
        dot(&d, &d) < r_sum * r_sum
    }

    /// Relative time until this particle's edge reaches `wall` in an arena of side `width`.
    ///
    /// `None` when the normal velocity is zero or points away from the wall, or when
    /// the edge is already past the wall.
    pub fn time_to_wall(&self, wall: Wall, width: f64) -> Option<f64> {
        let k = wall.axis();
        let (x, v) = (self.r[k], self.v[k]);
        let dt = if wall.is_far() {
            if v <= 0.0 {
                return None;
            }
            (width - self.radius - x) / v
        } else {
            if v >= 0.0 {
                return None;
            }
            (self.radius - x) / v
        };
        (dt >= 0.0 && dt.is_finite()).then_some(dt)
    }

    /// True if the particle moves into `wall` with its edge touching or past it.
    pub fn is_pressing(&self, wall: Wall, width: f64) -> bool {
        let k = wall.axis();
        let (x, v) = (self.r[k], self.v[k]);
        if wall.is_far() {
            v > 0.0 && x + self.radius >= width - EPS_CONTACT
        } else {
            v < 0.0 && x - self.radius <= EPS_CONTACT
        }
    }

    /// Relative time until this disk and `other` come into contact.
    ///
    /// Solves `|dr + dv t|^2 = (r_p + r_q)^2` for the earliest root. `None` when the
    /// disks are not approaching, when they miss, or when the root is not clearly
    /// positive.
    pub fn time_to_particle(&self, other: &Particle) -> Option<f64> {
        let d = sub(&other.r, &self.r);
        let u = sub(&other.v, &self.v);
        let a = dot(&u, &u);
        if a <= EPS_TIME {
            return None; // No relative motion
        }
        let b = 2.0 * dot(&d, &u);
        if b >= 0.0 {
            return None; // Moving apart
        }
        let r_sum = self.radius + other.radius;
        let c = dot(&d, &d) - r_sum * r_sum;

        let disc = b * b - 4.0 * a * c;
        if disc <= 0.0 {
            return None;
        }
        let t = (-b - disc.sqrt()) / (2.0 * a);
        if t <= EPS_TIME || !t.is_finite() {
            return None;
        }
        Some(t)
    }

    /// Record a velocity change at time `at`.
    #[inline]
    pub fn mark_updated(&mut self, at: f64) {
        self.last_update = at;
        self.collision_count = self.collision_count.saturating_add(1);
    }

    /// Specular reflection off `wall`: flip the normal velocity component.
    #[inline]
    pub fn reflect(&mut self, wall: Wall) {
        let k = wall.axis();
        self.v[k] = -self.v[k];
    }
}

/// Resolve an elastic disk collision between `p` and `q` at time `at`.
///
/// Only the velocity components along the line of centres change; momentum and
/// kinetic energy are conserved. Both particles are marked updated at `at`.
pub fn resolve_particle_collision(p: &mut Particle, q: &mut Particle, at: f64) -> Result<()> {
    // Unit normal at contact from p -> q
    let mut n = sub(&q.r, &p.r);
    let dist = dot(&n, &n).sqrt();
    if dist <= EPS_TIME {
        return Err(Error::MathError(
            "degenerate contact normal in particle collision".into(),
        ));
    }
    for nk in &mut n {
        *nk /= dist;
    }

    let u = sub(&q.v, &p.v);
    let u_n = dot(&u, &n);
    let (mp, mq) = (p.mass, q.mass);
    let fp = (2.0 * mq / (mp + mq)) * u_n;
    let fq = (2.0 * mp / (mp + mq)) * u_n;
    for (k, &nk) in n.iter().enumerate() {
        p.v[k] += fp * nk;
        q.v[k] -= fq * nk;
    }

    p.mark_updated(at);
    q.mark_updated(at);
    Ok(())
}

#[inline]
fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
fn sub(a: &[f64; DIM], b: &[f64; DIM]) -> [f64; DIM] {
    [a[0] - b[0], a[1] - b[1]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_ok() -> Result<()> {
        let p = Particle::new([1.0, 2.0], [2.0, -3.0], 0.5, 2.0)?;
        assert_eq!(p.r, [1.0, 2.0]);
        assert_eq!(p.v, [2.0, -3.0]);
        assert_eq!(p.radius, 0.5);
        assert_eq!(p.mass, 2.0);
        assert_eq!(p.last_update, 0.0);
        assert_eq!(p.collision_count, 0);
        Ok(())
    }

    #[test]
    fn invalid_radius_rejected() {
        let err = Particle::new([0.0, 0.0], [0.0, 0.0], 0.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("radius"));
        let err = Particle::new([0.0, 0.0], [0.0, 0.0], -1.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn invalid_mass_rejected() {
        let err = Particle::new([0.0, 0.0], [0.0, 0.0], 1.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("mass"));
    }

    #[test]
    fn non_finite_state_rejected() {
        assert!(Particle::new([f64::NAN, 0.0], [0.0, 0.0], 1.0, 1.0).is_err());
        assert!(Particle::new([0.0, 0.0], [f64::INFINITY, 0.0], 1.0, 1.0).is_err());
    }

    #[test]
    fn advance_is_linear() -> Result<()> {
        let mut p = Particle::new([1.0, 1.0], [2.0, -0.5], 0.1, 1.0)?;
        p.advance(2.0);
        assert_eq!(p.r, [5.0, 0.0]);
        p.advance(0.0);
        assert_eq!(p.r, [5.0, 0.0]);
        Ok(())
    }

    #[test]
    fn wall_times_each_side() -> Result<()> {
        let w = 10.0;
        let p = Particle::new([3.0, 6.0], [-2.0, 4.0], 1.0, 1.0)?;
        // Left: edge at x - 1 = 2, speed 2 => 1.0
        assert_eq!(p.time_to_wall(Wall::Left, w), Some(1.0));
        assert_eq!(p.time_to_wall(Wall::Right, w), None);
        assert_eq!(p.time_to_wall(Wall::Top, w), None);
        // Bottom: edge at y + 1 = 7, gap 3, speed 4 => 0.75
        assert_eq!(p.time_to_wall(Wall::Bottom, w), Some(0.75));
        Ok(())
    }

    #[test]
    fn stationary_axis_predicts_no_wall() -> Result<()> {
        let p = Particle::new([5.0, 5.0], [0.0, 1.0], 1.0, 1.0)?;
        assert_eq!(p.time_to_wall(Wall::Left, 10.0), None);
        assert_eq!(p.time_to_wall(Wall::Right, 10.0), None);
        assert!(p.time_to_wall(Wall::Bottom, 10.0).is_some());
        Ok(())
    }

    #[test]
    fn touching_wall_while_approaching_is_immediate() -> Result<()> {
        let p = Particle::new([1.0, 5.0], [-1.0, 0.0], 1.0, 1.0)?;
        assert_eq!(p.time_to_wall(Wall::Left, 10.0), Some(0.0));
        Ok(())
    }

    #[test]
    fn pressing_detects_contact_and_overshoot() -> Result<()> {
        let mut p = Particle::new([1.0, 5.0], [-1.0, 0.0], 1.0, 1.0)?;
        assert!(p.is_pressing(Wall::Left, 10.0));
        p.r[0] = 1.0 - 1e-12; // slightly past the wall
        assert!(p.is_pressing(Wall::Left, 10.0));
        assert_eq!(p.time_to_wall(Wall::Left, 10.0), None);
        p.reflect(Wall::Left);
        assert!(!p.is_pressing(Wall::Left, 10.0));
        assert!(!p.is_pressing(Wall::Right, 10.0));
        Ok(())
    }

    #[test]
    fn head_on_contact_time() -> Result<()> {
        // Radii sum = 0.4, gap 4.0 => 3.6 to close at relative speed 2 => 1.8
        let p = Particle::new([3.0, 5.0], [1.0, 0.0], 0.2, 1.0)?;
        let q = Particle::new([7.0, 5.0], [-1.0, 0.0], 0.2, 1.0)?;
        let t = p.time_to_particle(&q).expect("should collide");
        assert!((t - 1.8).abs() < 1e-12);
        let t_rev = q.time_to_particle(&p).expect("symmetric");
        assert!((t_rev - 1.8).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn separating_or_missing_pairs_predict_nothing() -> Result<()> {
        let p = Particle::new([3.0, 5.0], [-1.0, 0.0], 0.2, 1.0)?;
        let q = Particle::new([7.0, 5.0], [1.0, 0.0], 0.2, 1.0)?;
        assert_eq!(p.time_to_particle(&q), None);

        // Parallel lanes further apart than the radii sum
        let p = Particle::new([3.0, 5.0], [1.0, 0.0], 0.2, 1.0)?;
        let q = Particle::new([7.0, 6.0], [-1.0, 0.0], 0.2, 1.0)?;
        assert_eq!(p.time_to_particle(&q), None);

        // Same velocity: no relative motion
        let q = Particle::new([7.0, 5.0], [1.0, 0.0], 0.2, 1.0)?;
        assert_eq!(p.time_to_particle(&q), None);
        Ok(())
    }

    #[test]
    fn touching_pair_is_not_repredicted() -> Result<()> {
        let p = Particle::new([4.8, 5.0], [1.0, 0.0], 0.2, 1.0)?;
        let q = Particle::new([5.2, 5.0], [-1.0, 0.0], 0.2, 1.0)?;
        assert_eq!(p.time_to_particle(&q), None);
        Ok(())
    }

    #[test]
    fn mark_updated_bumps_count_even_at_same_time() -> Result<()> {
        let mut p = Particle::new([5.0, 5.0], [1.0, 0.0], 1.0, 1.0)?;
        p.mark_updated(3.0);
        p.mark_updated(3.0);
        assert_eq!(p.last_update, 3.0);
        assert_eq!(p.collision_count, 2);
        Ok(())
    }

    #[test]
    fn reflect_flips_normal_component_only() -> Result<()> {
        let mut p = Particle::new([5.0, 5.0], [1.5, -2.5], 1.0, 1.0)?;
        p.reflect(Wall::Right);
        assert_eq!(p.v, [-1.5, -2.5]);
        p.reflect(Wall::Top);
        assert_eq!(p.v, [-1.5, 2.5]);
        Ok(())
    }

    #[test]
    fn unequal_mass_collision_conserves() -> Result<()> {
        let mut p = Particle::new([4.0, 5.0], [2.0, 0.5], 0.5, 1.0)?;
        let mut q = Particle::new([4.6, 5.8], [-1.0, -0.3], 0.5, 3.0)?;
        let ke0 = p.kinetic_energy() + q.kinetic_energy();
        let m0 = [
            p.momentum()[0] + q.momentum()[0],
            p.momentum()[1] + q.momentum()[1],
        ];
        resolve_particle_collision(&mut p, &mut q, 2.5)?;
        let ke1 = p.kinetic_energy() + q.kinetic_energy();
        let m1 = [
            p.momentum()[0] + q.momentum()[0],
            p.momentum()[1] + q.momentum()[1],
        ];
        assert!((ke1 - ke0).abs() < 1e-12);
        assert!((m1[0] - m0[0]).abs() < 1e-12);
        assert!((m1[1] - m0[1]).abs() < 1e-12);
        assert_eq!(p.last_update, 2.5);
        assert_eq!(q.last_update, 2.5);
        assert_eq!((p.collision_count, q.collision_count), (1, 1));
        Ok(())
    }

    #[test]
    fn coincident_centres_are_a_math_error() -> Result<()> {
        let mut p = Particle::new([5.0, 5.0], [1.0, 0.0], 0.5, 1.0)?;
        let mut q = p.clone();
        let err = resolve_particle_collision(&mut p, &mut q, 0.0).unwrap_err();
        assert!(matches!(err, Error::MathError(_)));
        Ok(())
    }

    #[test]
    fn fits_and_overlaps() -> Result<()> {
        let p = Particle::new([1.0, 9.0], [0.0, 0.0], 1.0, 1.0)?;
        assert!(p.fits_in(10.0));
        assert!(!p.fits_in(9.5));
        let q = Particle::new([3.0, 9.0], [0.0, 0.0], 1.0, 1.0)?;
        assert!(!p.overlaps(&q)); // touching
        let q = Particle::new([2.5, 9.0], [0.0, 0.0], 1.0, 1.0)?;
        assert!(p.overlaps(&q));
        Ok(())
    }
}
