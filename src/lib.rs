pub mod body;
pub mod c_api;
pub mod config;
pub mod error;
pub mod gravity;
pub mod simulation;
pub mod utils;

pub use body::{Body, Color};
pub use config::{BeltConfig, SimulationConfig};
pub use error::SimError;
pub use gravity::Gravity;
pub use simulation::Simulation;
pub use utils::{RandomSource, asteroid_belt, central_mass, configure_asteroid};
