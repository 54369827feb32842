use crate::{body::Body, error::SimError};

use rayon::prelude::*;
use ultraviolet::DVec3;

/// Direct-summation Newtonian gravity.
///
/// Every unordered pair is evaluated once and the result is applied to both
/// bodies with opposite signs, so the forces on a pair always cancel exactly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    /// Gravitational constant in N·m²/kg².
    pub g: f64,
    /// When set, a secondary body lighter than `ratio * m` exerts no pull on a
    /// secondary body of mass `m`. Primary bodies are never skipped.
    ///
    /// This is an approximation: skipped pairs no longer conserve momentum.
    pub negligible_mass_ratio: Option<f64>,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(Self::G)
    }
}

impl Gravity {
    /// Newtonian constant of gravitation.
    pub const G: f64 = 6.6743e-11;
    /// Suggested ratio for belts of many light bodies (0.1%).
    pub const DEFAULT_NEGLIGIBLE_RATIO: f64 = 1e-3;

    /// Creates a force law with constant `g` and the mass-ratio skip disabled.
    pub fn new(g: f64) -> Self {
        Self {
            g,
            negligible_mass_ratio: None,
        }
    }

    /// Enables or disables the mass-ratio skip between secondary bodies.
    pub fn with_negligible_mass_ratio(mut self, ratio: Option<f64>) -> Self {
        self.negligible_mass_ratio = ratio;
        self
    }

    /// Force exerted on `target` by `source`, pointing from `target` toward `source`.
    /// Returns `None` if both bodies occupy the same position.
    #[inline(always)]
    pub fn pair_force(&self, target: &Body, source: &Body) -> Option<DVec3> {
        let d = source.position - target.position;
        let d_sq = d.mag_sq();
        if d_sq == 0.0 {
            return None;
        }

        // |F| = G m1 m2 / d², along d / |d|
        let magnitude = self.g * target.mass * source.mass / d_sq;
        Some(d * (magnitude / d_sq.sqrt()))
    }

    /// Whether `source` is heavy enough to be felt by `target`.
    #[inline(always)]
    fn contributes(&self, source: &Body, target: &Body) -> bool {
        match self.negligible_mass_ratio {
            Some(ratio) if source.secondary && target.secondary => {
                source.mass >= ratio * target.mass
            }
            _ => true,
        }
    }

    /// Evaluates pair `(i, j)` and adds its force into the two accumulators.
    #[inline(always)]
    fn accumulate_pair(
        &self,
        bodies: &[Body],
        i: usize,
        j: usize,
        force_i: &mut DVec3,
        force_j: &mut DVec3,
    ) -> Result<(), SimError> {
        let (a, b) = (&bodies[i], &bodies[j]);
        let to_a = self.contributes(b, a);
        let to_b = self.contributes(a, b);
        if !to_a && !to_b {
            return Ok(());
        }

        let f = self
            .pair_force(a, b)
            .ok_or(SimError::CoincidentBodies { i, j })?;
        if to_a {
            *force_i += f;
        }
        if to_b {
            *force_j -= f;
        }
        Ok(())
    }

    /// Resets and recomputes `net_force` on every body.
    pub fn accumulate(&self, bodies: &mut [Body]) -> Result<(), SimError> {
        let n = bodies.len();
        let mut forces = vec![DVec3::zero(); n];

        for i in 0..n {
            let (head, tail) = forces.split_at_mut(i + 1);
            let force_i = &mut head[i];
            for (k, force_j) in tail.iter_mut().enumerate() {
                self.accumulate_pair(bodies, i, i + 1 + k, force_i, force_j)?;
            }
        }

        for (body, force) in bodies.iter_mut().zip(forces) {
            body.net_force = force;
        }
        Ok(())
    }

    /// Parallel version of [`Gravity::accumulate`].
    ///
    /// Each rayon job sums into its own force buffer; the buffers are merged
    /// before any body is written, so no two threads touch the same field.
    pub fn accumulate_par(&self, bodies: &mut [Body]) -> Result<(), SimError> {
        let n = bodies.len();
        let snapshot: &[Body] = bodies;

        let forces = (0..n)
            .into_par_iter()
            .try_fold(
                || vec![DVec3::zero(); n],
                |mut acc, i| {
                    let (head, tail) = acc.split_at_mut(i + 1);
                    let force_i = &mut head[i];
                    for (k, force_j) in tail.iter_mut().enumerate() {
                        self.accumulate_pair(snapshot, i, i + 1 + k, force_i, force_j)?;
                    }
                    Ok::<_, SimError>(acc)
                },
            )
            .try_reduce(
                || vec![DVec3::zero(); n],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b) {
                        *x += y;
                    }
                    Ok(a)
                },
            )?;

        for (body, force) in bodies.iter_mut().zip(forces) {
            body.net_force = force;
        }
        Ok(())
    }

    /// Total gravitational potential energy `-Σ G m_i m_j / d_ij`.
    pub fn potential_energy(&self, bodies: &[Body]) -> f64 {
        let mut e = 0.0;
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                let d = (b.position - a.position).mag();
                if d > 0.0 {
                    e -= self.g * a.mass * b.mass / d;
                }
            }
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f64, mass: f64) -> Body {
        Body::new("b", mass, 1.0, DVec3::new(x, 0.0, 0.0), DVec3::zero())
    }

    fn rock_at(x: f64, mass: f64) -> Body {
        Body::secondary("rock", mass, 1.0, DVec3::new(x, 0.0, 0.0), DVec3::zero())
    }

    #[test]
    fn pair_forces_are_exact_negations() {
        let mut bodies = vec![body_at(-0.5, 2.0), body_at(0.5, 3.0)];
        Gravity::new(0.1).accumulate(&mut bodies).unwrap();

        assert_eq!(bodies[0].net_force, -bodies[1].net_force);
        // Attractive: body 0 is pulled toward +x.
        assert!(bodies[0].net_force.x > 0.0);
        assert!((bodies[0].net_force.x - 0.1 * 6.0).abs() < 1e-12);
    }

    #[test]
    fn force_follows_inverse_square_law() {
        let gravity = Gravity::new(1.0);
        let f1 = gravity.pair_force(&body_at(0.0, 1.0), &body_at(1.0, 1.0)).unwrap();
        let f2 = gravity.pair_force(&body_at(0.0, 1.0), &body_at(2.0, 1.0)).unwrap();
        assert!((f1.mag() / f2.mag() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_bodies_are_an_error() {
        let mut bodies = vec![body_at(0.0, 1.0), body_at(1.0, 1.0), body_at(1.0, 1.0)];
        let err = Gravity::default().accumulate(&mut bodies).unwrap_err();
        assert_eq!(err, SimError::CoincidentBodies { i: 1, j: 2 });
    }

    #[test]
    fn negligible_skip_only_between_secondaries() {
        let gravity = Gravity::new(1.0).with_negligible_mass_ratio(Some(1e-3));

        let mut rocks = vec![rock_at(0.0, 1e6), rock_at(1.0, 1.0)];
        gravity.accumulate(&mut rocks).unwrap();
        assert_eq!(rocks[0].net_force, DVec3::zero());
        assert!(rocks[1].net_force.x < 0.0);

        let mut mixed = vec![body_at(0.0, 1e6), rock_at(1.0, 1.0)];
        gravity.accumulate(&mut mixed).unwrap();
        assert_eq!(mixed[0].net_force, -mixed[1].net_force);
        assert!(mixed[0].net_force.x > 0.0);
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut bodies: Vec<Body> = (0..64)
            .map(|_| {
                let pos = DVec3::new(rng.f64(), rng.f64(), rng.f64()) * 100.0;
                Body::new("b", 1.0 + rng.f64(), 1.0, pos, DVec3::zero())
            })
            .collect();
        let mut par = bodies.clone();

        let gravity = Gravity::new(1.0);
        gravity.accumulate(&mut bodies).unwrap();
        gravity.accumulate_par(&mut par).unwrap();

        for (a, b) in bodies.iter().zip(&par) {
            let scale = a.net_force.mag().max(1e-12);
            assert!((a.net_force - b.net_force).mag() / scale < 1e-9);
        }
    }

    #[test]
    fn parallel_matches_sequential_with_negligible_skip() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut bodies: Vec<Body> = (0..48)
            .map(|i| {
                let pos = DVec3::new(rng.f64(), rng.f64(), rng.f64()) * 100.0;
                match i % 4 {
                    0 => Body::new("planet", 1e6 * (1.0 + rng.f64()), 1.0, pos, DVec3::zero()),
                    1 => Body::secondary("boulder", 1e5, 1.0, pos, DVec3::zero()),
                    _ => Body::secondary("pebble", 1.0 + rng.f64(), 1.0, pos, DVec3::zero()),
                }
            })
            .collect();
        let unskipped = {
            let mut all = bodies.clone();
            Gravity::new(1.0).accumulate(&mut all).unwrap();
            all
        };
        let mut par = bodies.clone();

        let gravity = Gravity::new(1.0).with_negligible_mass_ratio(Some(1e-3));
        gravity.accumulate(&mut bodies).unwrap();
        gravity.accumulate_par(&mut par).unwrap();

        for (a, b) in bodies.iter().zip(&par) {
            let scale = a.net_force.mag().max(1e-12);
            assert!((a.net_force - b.net_force).mag() / scale < 1e-9);
        }

        // Boulders no longer feel pebbles, so the skip changed their forces.
        assert!(
            bodies
                .iter()
                .zip(&unskipped)
                .filter(|(b, _)| b.name == "boulder")
                .all(|(skipped, full)| skipped.net_force != full.net_force)
        );
    }

    #[test]
    fn potential_energy_of_a_pair() {
        let bodies = vec![body_at(0.0, 2.0), body_at(4.0, 3.0)];
        let e = Gravity::new(1.0).potential_energy(&bodies);
        assert!((e + 1.5).abs() < 1e-12);
    }
}
