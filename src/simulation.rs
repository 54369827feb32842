use crate::{
    body::Body,
    config::{SECONDS_PER_DAY, SimulationConfig},
    error::SimError,
    gravity::Gravity,
};

use rayon::prelude::*;
use ultraviolet::DVec3;

/// Owns the body sequence and advances it with semi-implicit Euler steps.
///
/// The number of bodies is fixed at construction. Callers outside the crate
/// only get read access to body state; [`Simulation::step`] is the sole mutator.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Time step in seconds.
    time_step: f64,
    /// Simulated seconds since construction.
    elapsed_time: f64,
    /// Number of completed steps.
    frame: usize,
    bodies: Vec<Body>,
    gravity: Gravity,
    /// Whether to use Rayon for force accumulation and integration.
    use_rayon: bool,
}

impl Simulation {
    /// 100 simulated days per real second at 60 frames per second.
    pub const DEFAULT_TIME_STEP: f64 = 100.0 * SECONDS_PER_DAY / 60.0;

    /// Creates a simulation with the standard gravitational constant.
    pub fn new(time_step: f64, bodies: &[Body]) -> Result<Self, SimError> {
        Self::with_gravity(time_step, bodies, Gravity::default())
    }

    /// Creates a simulation from a copy of `bodies`.
    ///
    /// Fails if storage cannot be allocated, if the time step is negative or
    /// not finite, or if any body has a non-positive mass or non-finite state.
    pub fn with_gravity(time_step: f64, bodies: &[Body], gravity: Gravity) -> Result<Self, SimError> {
        if !time_step.is_finite() || time_step < 0.0 {
            return Err(SimError::InvalidTimeStep(time_step));
        }

        let mut owned = Vec::new();
        owned
            .try_reserve_exact(bodies.len())
            .map_err(|_| SimError::Allocation(bodies.len()))?;

        for (index, body) in bodies.iter().enumerate() {
            if !(body.mass.is_finite() && body.mass > 0.0) {
                return Err(SimError::InvalidMass {
                    index,
                    mass: body.mass,
                });
            }

            let mut body = body.clone();
            body.acceleration = DVec3::zero();
            body.net_force = DVec3::zero();
            if let Some(field) = body.non_finite_field() {
                return Err(SimError::NonFinite { index, field });
            }
            owned.push(body);
        }

        if let Some(ratio) = gravity.negligible_mass_ratio {
            tracing::warn!(ratio, "negligible mass ratio skip enabled between secondary bodies");
        }
        tracing::debug!(bodies = owned.len(), time_step, "simulation constructed");

        Ok(Self {
            time_step,
            elapsed_time: 0.0,
            frame: 0,
            bodies: owned,
            gravity,
            use_rayon: false,
        })
    }

    /// Creates a simulation using the step and force settings from `config`.
    pub fn from_config(config: &SimulationConfig, bodies: &[Body]) -> Result<Self, SimError> {
        config.validate()?;
        let gravity = Gravity::new(config.gravitational_constant)
            .with_negligible_mass_ratio(config.negligible_mass_ratio);
        let mut sim = Self::with_gravity(config.time_step, bodies, gravity)?;
        sim.set_use_rayon(config.use_rayon);
        Ok(sim)
    }

    /// Sets whether to use Rayon for parallelism.
    pub fn set_use_rayon(&mut self, use_rayon: bool) {
        self.use_rayon = use_rayon;
    }

    /// Whether the Rayon path is active.
    pub fn use_rayon(&self) -> bool {
        self.use_rayon
    }

    /// Fixed time step in seconds.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Simulated seconds since construction.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Number of completed steps.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Force law used by the stepper.
    pub fn gravity(&self) -> &Gravity {
        &self.gravity
    }

    /// Read-only view of all bodies, in construction order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Body at `index`, if any.
    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    /// Number of bodies, fixed at construction.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the simulation holds no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Advances the simulation by one time step.
    ///
    /// # Panics
    /// Panics if the step breaks a simulation invariant (two bodies at the
    /// same position, or a non-finite position, velocity or acceleration).
    /// Such a state is a data defect and cannot be stepped past.
    pub fn step(&mut self) {
        if let Err(e) = self.try_step() {
            tracing::error!(error = %e, frame = self.frame, "simulation invariant violated");
            panic!("simulation invariant violated: {e}");
        }
    }

    /// Advances the simulation by one time step, reporting invariant
    /// violations instead of panicking. After an `Err` the body state is
    /// partially updated and must not be stepped again.
    pub fn try_step(&mut self) -> Result<(), SimError> {
        self.attract()?;
        self.iterate();
        self.check_finite()?;

        self.elapsed_time += self.time_step;
        self.frame += 1;
        tracing::trace!(frame = self.frame, elapsed = self.elapsed_time, "step");
        Ok(())
    }

    /// Recomputes net force and acceleration for every body.
    fn attract(&mut self) -> Result<(), SimError> {
        if self.use_rayon {
            self.gravity.accumulate_par(&mut self.bodies)?;
            self.bodies.par_iter_mut().for_each(|body| {
                body.acceleration = body.net_force / body.mass;
            });
        } else {
            self.gravity.accumulate(&mut self.bodies)?;
            for body in &mut self.bodies {
                body.acceleration = body.net_force / body.mass;
            }
        }
        Ok(())
    }

    /// Integrates velocity, then position, for every body.
    fn iterate(&mut self) {
        let dt = self.time_step;
        if self.use_rayon {
            self.bodies.par_iter_mut().for_each(|body| body.update(dt));
        } else {
            self.bodies.iter_mut().for_each(|body| body.update(dt));
        }
    }

    fn check_finite(&self) -> Result<(), SimError> {
        for (index, body) in self.bodies.iter().enumerate() {
            if let Some(field) = body.non_finite_field() {
                return Err(SimError::NonFinite { index, field });
            }
        }
        Ok(())
    }

    /// Sum of `m * v` over all bodies.
    pub fn total_momentum(&self) -> DVec3 {
        self.bodies
            .iter()
            .fold(DVec3::zero(), |acc, body| acc + body.momentum())
    }

    /// Kinetic plus gravitational potential energy.
    pub fn total_energy(&self) -> f64 {
        let kinetic: f64 = self.bodies.iter().map(Body::kinetic_energy).sum();
        kinetic + self.gravity.potential_energy(&self.bodies)
    }

    /// Mass-weighted mean position, or `None` for an empty simulation.
    pub fn center_of_mass(&self) -> Option<DVec3> {
        let total: f64 = self.bodies.iter().map(|b| b.mass).sum();
        if total <= 0.0 {
            return None;
        }
        let weighted = self
            .bodies
            .iter()
            .fold(DVec3::zero(), |acc, b| acc + b.position * b.mass);
        Some(weighted / total)
    }
}
