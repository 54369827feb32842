use crate::{body::Body, config::BeltConfig};

use std::f64::consts::TAU;
use ultraviolet::DVec3;

/// Source of uniform draws in `[0, 1)`.
///
/// The generator takes this instead of a global RNG so belts can be
/// reproduced from a seed, or driven by scripted values in tests.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl RandomSource for fastrand::Rng {
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }
}

/// Uniform value in `[min, max)`.
pub fn uniform(rng: &mut impl RandomSource, min: f64, max: f64) -> f64 {
    min + (max - min) * rng.next_f64()
}

/// Logit-distributed scale `ln(x) - ln(1 - x) + 1` for a uniform `x`.
///
/// Always finite and non-zero: draws outside `(0, 1)` and draws that land on
/// `x = 1 / (1 + e)`, where the scale is exactly zero, are re-sampled.
pub fn logit_unit(rng: &mut impl RandomSource) -> f64 {
    loop {
        let x = rng.next_f64();
        if x > 0.0 && x < 1.0 {
            let l = x.ln() - (1.0 - x).ln() + 1.0;
            if l != 0.0 && l.is_finite() {
                return l;
            }
        }
    }
}

/// Mass of the heaviest primary body, used as the belt's central mass.
pub fn central_mass(bodies: &[Body]) -> Option<f64> {
    bodies
        .iter()
        .filter(|b| !b.secondary)
        .map(|b| b.mass)
        .max_by(f64::total_cmp)
}

/// Samples one asteroid on a roughly circular orbit around `center_mass`,
/// which sits at the origin.
pub fn configure_asteroid(
    rng: &mut impl RandomSource,
    belt: &BeltConfig,
    center_mass: f64,
    g: f64,
    name: impl Into<String>,
) -> Body {
    // Disk point picking with a logit-distributed radius. r must stay
    // positive or the circular speed below is infinite.
    let r = loop {
        let r = belt.mean_radius * logit_unit(rng).abs().sqrt();
        if r > 0.0 && r.is_finite() {
            break r;
        }
    };
    let phi = uniform(rng, 0.0, TAU);

    // Circular orbit speed, perturbed so orbits are neither circular nor coplanar
    let v = (g * center_mass / r).sqrt()
        * uniform(rng, belt.min_speed_factor, belt.max_speed_factor);
    let vy = uniform(rng, -belt.vertical_speed, belt.vertical_speed);

    let (sin, cos) = phi.sin_cos();
    let position = DVec3::new(r * cos, 0.0, r * sin);
    let velocity = DVec3::new(-v * sin, vy, v * cos);

    Body::secondary(name, belt.mass, belt.radius, position, velocity)
}

/// Generates `belt.count` asteroids orbiting `center_mass`.
pub fn asteroid_belt(
    rng: &mut impl RandomSource,
    belt: &BeltConfig,
    center_mass: f64,
    g: f64,
) -> Vec<Body> {
    (0..belt.count)
        .map(|i| configure_asteroid(rng, belt, center_mass, g, format!("Asteroid {}", i + 1)))
        .collect()
}

/// Generates a belt from the seed in `belt`, or a random seed if none is set.
pub fn seeded_asteroid_belt(belt: &BeltConfig, center_mass: f64, g: f64) -> Vec<Body> {
    let mut rng = match belt.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    asteroid_belt(&mut rng, belt, center_mass, g)
}
