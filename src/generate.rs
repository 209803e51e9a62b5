//! Random initial states.

use crate::core::Particle;
use crate::error::{Error, Result};
use crate::scenario::Scenario;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

/// Attempts per particle before placement gives up.
const MAX_ATTEMPTS: usize = 1_000_000;

/// Parameters for [`random_scenario`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    pub count: usize,
    pub width: u32,
    pub duration: f64,
    pub radius: f64,
    pub mass: f64,
    /// Each velocity component is drawn uniformly from `[-speed, speed]`.
    pub speed: f64,
    /// RNG seed for reproducibility; `None` for nondeterministic.
    pub seed: Option<u64>,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            count: 10,
            width: 400,
            duration: 10.0,
            radius: 5.0,
            mass: 1.0,
            speed: 50.0,
            seed: None,
        }
    }
}

/// Create `count` identical disks at random non-overlapping positions inside the arena.
///
/// Positions are rejection sampled within `[radius, W - radius]` on both axes.
pub fn random_scenario(params: &GenerateParams) -> Result<Scenario> {
    let GenerateParams {
        count,
        width,
        duration,
        radius,
        mass,
        speed,
        seed,
    } = *params;
    if width == 0 {
        return Err(Error::InvalidParam("arena width must be > 0".into()));
    }
    if !duration.is_finite() || duration < 0.0 {
        return Err(Error::InvalidParam(
            "duration must be finite and >= 0".into(),
        ));
    }
    if !speed.is_finite() || speed < 0.0 {
        return Err(Error::InvalidParam("speed must be finite and >= 0".into()));
    }
    // Validates radius and mass.
    Particle::new([0.0, 0.0], [0.0, 0.0], radius, mass)?;
    let w = f64::from(width);
    if w < 2.0 * radius {
        return Err(Error::InvalidParam(
            "arena width must be at least 2 * radius".into(),
        ));
    }

    let mut rng: StdRng = match seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rng().random()),
    };

    let mut particles: Vec<Particle> = Vec::with_capacity(count);
    for id in 0..count {
        let mut attempts = 0usize;
        let candidate = loop {
            if attempts >= MAX_ATTEMPTS {
                return Err(Error::InvalidParam(format!(
                    "failed to place particle {id} without overlap; try fewer particles or smaller radius"
                )));
            }
            attempts += 1;
            let x = rng.random_range(radius..=w - radius);
            let y = rng.random_range(radius..=w - radius);
            let v = [
                rng.random_range(-speed..=speed),
                rng.random_range(-speed..=speed),
            ];
            let p = Particle::new([x, y], v, radius, mass)?;
            if !particles.iter().any(|q| q.overlaps(&p)) {
                break p;
            }
        };
        debug!(particle = id, attempts, "placed particle");
        particles.push(candidate);
    }

    Ok(Scenario {
        width,
        duration,
        particles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_scenario_is_valid_for_the_engine() -> Result<()> {
        let params = GenerateParams {
            count: 30,
            width: 100,
            radius: 2.0,
            seed: Some(1234),
            ..GenerateParams::default()
        };
        let s = random_scenario(&params)?;
        assert_eq!(s.particles.len(), 30);
        for p in &s.particles {
            assert!(p.fits_in(100.0));
            assert!(p.v.iter().all(|c| c.abs() <= params.speed));
        }
        let sim = s.into_simulation()?;
        assert_eq!(sim.num_particles(), 30);
        Ok(())
    }

    #[test]
    fn same_seed_same_scenario() -> Result<()> {
        let params = GenerateParams {
            seed: Some(7),
            ..GenerateParams::default()
        };
        assert_eq!(random_scenario(&params)?, random_scenario(&params)?);
        Ok(())
    }

    #[test]
    fn zero_speed_gives_stationary_particles() -> Result<()> {
        let params = GenerateParams {
            count: 3,
            speed: 0.0,
            seed: Some(1),
            ..GenerateParams::default()
        };
        let s = random_scenario(&params)?;
        assert!(s.particles.iter().all(|p| p.v == [0.0, 0.0]));
        Ok(())
    }

    #[test]
    fn impossible_packing_fails() {
        let params = GenerateParams {
            count: 2,
            width: 10,
            radius: 5.0,
            seed: Some(3),
            ..GenerateParams::default()
        };
        let err = random_scenario(&params).unwrap_err();
        assert!(err.to_string().contains("failed to place particle 1"));
    }

    #[test]
    fn rejects_bad_params() {
        let bad_radius = GenerateParams {
            radius: 0.0,
            ..GenerateParams::default()
        };
        assert!(random_scenario(&bad_radius).is_err());
        let too_small = GenerateParams {
            width: 4,
            radius: 3.0,
            ..GenerateParams::default()
        };
        assert!(random_scenario(&too_small).is_err());
    }
}
