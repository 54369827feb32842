use crate::{
    body::{Body, Color},
    config::BeltConfig,
    gravity::Gravity,
    simulation::Simulation,
    utils,
};
use std::ffi::{CStr, c_char};
use ultraviolet::DVec3;

/// Initial state of one body, as authored by the host program.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct BodyDesc {
    /// NUL-terminated UTF-8 name, or null for an unnamed body.
    pub name: *const c_char,
    pub mass: f64,
    pub radius: f64,
    pub color: Color,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub secondary: bool,
}

/// Read-only snapshot of one body for rendering.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyState {
    pub mass: f64,
    pub radius: f64,
    pub color: Color,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub secondary: bool,
}

impl BodyDesc {
    unsafe fn to_body(&self) -> Body {
        let name = if self.name.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(self.name) }
                .to_string_lossy()
                .into_owned()
        };
        let [px, py, pz] = self.position;
        let [vx, vy, vz] = self.velocity;
        let position = DVec3::new(px, py, pz);
        let velocity = DVec3::new(vx, vy, vz);
        let body = if self.secondary {
            Body::secondary(name, self.mass, self.radius, position, velocity)
        } else {
            Body::new(name, self.mass, self.radius, position, velocity)
        };
        body.with_color(self.color)
    }
}

impl From<&Body> for BodyState {
    fn from(body: &Body) -> Self {
        Self {
            mass: body.mass,
            radius: body.radius,
            color: body.color,
            position: [body.position.x, body.position.y, body.position.z],
            velocity: [body.velocity.x, body.velocity.y, body.velocity.z],
            secondary: body.secondary,
        }
    }
}

/// Copies `count` bodies into a new simulation. Returns null if the input is
/// invalid or storage cannot be allocated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Create(
    time_step: f64,
    bodies: *const BodyDesc,
    count: usize,
) -> *mut Simulation {
    let descs: &[BodyDesc] = if count == 0 {
        &[]
    } else if bodies.is_null() {
        return std::ptr::null_mut();
    } else {
        unsafe { std::slice::from_raw_parts(bodies, count) }
    };

    let bodies: Vec<Body> = descs.iter().map(|d| unsafe { d.to_body() }).collect();
    match Simulation::new(time_step, &bodies) {
        Ok(sim) => Box::into_raw(Box::new(sim)),
        Err(e) => {
            tracing::error!(error = %e, "failed to create simulation");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Destroy(handle: *mut Simulation) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Step(handle: *mut Simulation) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.step();
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.len())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetTimeStep(handle: *const Simulation) -> f64 {
    unsafe { handle.as_ref() }.map_or(0.0, |sim| sim.time_step())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetElapsedTime(handle: *const Simulation) -> f64 {
    unsafe { handle.as_ref() }.map_or(0.0, |sim| sim.elapsed_time())
}

/// Writes the state of body `index` into `out`. Returns false if the handle,
/// index or output pointer is invalid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyState(
    handle: *const Simulation,
    index: usize,
    out: *mut BodyState,
) -> bool {
    let Some(sim) = (unsafe { handle.as_ref() }) else {
        return false;
    };
    let (Some(body), Some(out)) = (sim.body(index), unsafe { out.as_mut() }) else {
        return false;
    };
    *out = BodyState::from(body);
    true
}

/// Copies the name of body `index` into `buf` as a NUL-terminated string,
/// truncating to `len - 1` bytes. Returns the full name length in bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyName(
    handle: *const Simulation,
    index: usize,
    buf: *mut c_char,
    len: usize,
) -> usize {
    let Some(body) = (unsafe { handle.as_ref() }).and_then(|sim| sim.body(index)) else {
        return 0;
    };
    let name = body.name.as_bytes();
    if !buf.is_null() && len > 0 {
        let n = name.len().min(len - 1);
        unsafe {
            std::ptr::copy_nonoverlapping(name.as_ptr().cast::<c_char>(), buf, n);
            *buf.add(n) = 0;
        }
    }
    name.len()
}

/// Fills `out` with `count` asteroids orbiting `center_mass` at a mean radius
/// of `mean_radius`, using the default belt parameters. `name` is left null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GenerateAsteroids(
    out: *mut BodyDesc,
    count: usize,
    center_mass: f64,
    mean_radius: f64,
    seed: u64,
) -> bool {
    if out.is_null() && count > 0 {
        return false;
    }
    let belt = BeltConfig {
        count,
        mean_radius,
        seed: Some(seed),
        ..BeltConfig::default()
    };
    if belt.validate().is_err() || !(center_mass.is_finite() && center_mass > 0.0) {
        return false;
    }

    let bodies = utils::seeded_asteroid_belt(&belt, center_mass, Gravity::G);
    for (i, body) in bodies.iter().enumerate() {
        let state = BodyState::from(body);
        unsafe {
            *out.add(i) = BodyDesc {
                name: std::ptr::null(),
                mass: state.mass,
                radius: state.radius,
                color: state.color,
                position: state.position,
                velocity: state.velocity,
                secondary: state.secondary,
            };
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn desc(name: &CStr, mass: f64, x: f64) -> BodyDesc {
        BodyDesc {
            name: name.as_ptr(),
            mass,
            radius: 1.0,
            color: Color::YELLOW,
            position: [x, 0.0, 0.0],
            velocity: [0.0; 3],
            secondary: false,
        }
    }

    #[test]
    fn create_step_read_destroy() {
        let sun = CString::new("Sun").unwrap();
        let earth = CString::new("Earth").unwrap();
        let descs = [desc(&sun, 1e20, 0.0), desc(&earth, 1e10, 1e6)];

        unsafe {
            let handle = Simulation_Create(10.0, descs.as_ptr(), descs.len());
            assert!(!handle.is_null());
            assert_eq!(Simulation_GetBodyCount(handle), 2);

            Simulation_Step(handle);
            assert_eq!(Simulation_GetElapsedTime(handle), 10.0);
            assert_eq!(Simulation_GetTimeStep(handle), 10.0);

            let mut state = BodyState::default();
            assert!(Simulation_GetBodyState(handle, 1, &mut state));
            assert!(state.position[0] < 1e6);
            assert_eq!(state.color, Color::YELLOW);
            assert!(!Simulation_GetBodyState(handle, 2, &mut state));

            let mut buf = [0 as c_char; 4];
            let len = Simulation_GetBodyName(handle, 1, buf.as_mut_ptr(), buf.len());
            assert_eq!(len, 5);
            assert_eq!(CStr::from_ptr(buf.as_ptr()).to_str().unwrap(), "Ear");

            Simulation_Destroy(handle);
            Simulation_Destroy(std::ptr::null_mut());
        }
    }

    #[test]
    fn create_returns_null_on_invalid_bodies() {
        let name = CString::new("bad").unwrap();
        let descs = [desc(&name, -1.0, 0.0)];
        unsafe {
            assert!(Simulation_Create(1.0, descs.as_ptr(), 1).is_null());
            assert!(Simulation_Create(1.0, std::ptr::null(), 3).is_null());
            assert_eq!(Simulation_GetBodyCount(std::ptr::null()), 0);
        }
    }

    #[test]
    fn generated_asteroids_feed_create() {
        let mut descs = vec![
            BodyDesc {
                name: std::ptr::null(),
                mass: 0.0,
                radius: 0.0,
                color: Color::WHITE,
                position: [0.0; 3],
                velocity: [0.0; 3],
                secondary: false,
            };
            8
        ];
        unsafe {
            assert!(Simulation_GenerateAsteroids(descs.as_mut_ptr(), 8, 1.989e30, 4e11, 1));
            assert!(descs.iter().all(|d| d.secondary && d.mass == 1e12));

            let handle = Simulation_Create(1.0, descs.as_ptr(), descs.len());
            assert!(!handle.is_null());
            Simulation_Destroy(handle);
        }
    }
}
