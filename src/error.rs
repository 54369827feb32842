/// Errors raised while building or advancing a simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Storage for the body sequence could not be allocated.
    Allocation(usize),

    /// The time step is negative or not finite.
    InvalidTimeStep(f64),

    /// A body has a non-positive or non-finite mass.
    InvalidMass { index: usize, mass: f64 },

    /// A dynamic field of a body is NaN or infinite.
    NonFinite { index: usize, field: &'static str },

    /// Two bodies share a position, so their mutual force is unbounded.
    CoincidentBodies { i: usize, j: usize },

    /// Configuration could not be parsed or failed validation.
    Config(String),

    /// IO error while loading a configuration file.
    Io(String),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::Allocation(n) => write!(f, "Failed to allocate storage for {} bodies", n),
            SimError::InvalidTimeStep(dt) => write!(f, "Invalid time step: {}", dt),
            SimError::InvalidMass { index, mass } => {
                write!(f, "Body {} has invalid mass {}", index, mass)
            }
            SimError::NonFinite { index, field } => {
                write!(f, "Body {} has a non-finite {}", index, field)
            }
            SimError::CoincidentBodies { i, j } => {
                write!(f, "Bodies {} and {} are at the same position", i, j)
            }
            SimError::Config(s) => write!(f, "Config error: {}", s),
            SimError::Io(s) => write!(f, "IO error: {}", s),
        }
    }
}

impl std::error::Error for SimError {}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for SimError {
    fn from(e: serde_yaml::Error) -> Self {
        SimError::Config(e.to_string())
    }
}
