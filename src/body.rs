use ultraviolet::DVec3;

/// RGBA color handed through to the renderer. Has no effect on dynamics.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const GRAY: Color = Color::new(130, 130, 130, 255);
    pub const YELLOW: Color = Color::new(253, 249, 0, 255);
    pub const BLUE: Color = Color::new(0, 121, 241, 255);

    /// Creates a color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A point mass in the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Display label.
    pub name: String,
    /// Mass in kilograms. Always positive.
    pub mass: f64,
    /// Visual radius in meters.
    pub radius: f64,
    /// Render color.
    pub color: Color,
    /// Position in meters.
    pub position: DVec3,
    /// Velocity in meters per second.
    pub velocity: DVec3,
    /// Acceleration (recomputed each step).
    pub acceleration: DVec3,
    /// Net gravitational force (reset each step).
    pub net_force: DVec3,
    /// Whether the body was produced by the belt generator.
    pub secondary: bool,
}

impl Body {
    /// Creates a primary body. Derived state starts at zero.
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        radius: f64,
        position: DVec3,
        velocity: DVec3,
    ) -> Self {
        Self {
            name: name.into(),
            mass,
            radius,
            color: Color::WHITE,
            position,
            velocity,
            acceleration: DVec3::zero(),
            net_force: DVec3::zero(),
            secondary: false,
        }
    }

    /// Creates a secondary body, i.e. one sampled by the belt generator.
    pub fn secondary(
        name: impl Into<String>,
        mass: f64,
        radius: f64,
        position: DVec3,
        velocity: DVec3,
    ) -> Self {
        Self {
            color: Color::GRAY,
            secondary: true,
            ..Self::new(name, mass, radius, position, velocity)
        }
    }

    /// Replaces the render color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Linear momentum `m * v`.
    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    /// Kinetic energy `m * v² / 2`.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.mag_sq()
    }

    /// Name of the first dynamic field that is NaN or infinite, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        if !is_finite(self.position) {
            Some("position")
        } else if !is_finite(self.velocity) {
            Some("velocity")
        } else if !is_finite(self.acceleration) {
            Some("acceleration")
        } else if !is_finite(self.net_force) {
            Some("net force")
        } else {
            None
        }
    }

    /// Semi-implicit Euler update: velocity first, then position with the new velocity.
    pub fn update(&mut self, dt: f64) {
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }
}

pub(crate) fn is_finite(v: DVec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
