use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use orbital_sim::{BeltConfig, Body, Gravity, Simulation, asteroid_belt};
use ultraviolet::DVec3;

const SUN_MASS: f64 = 1.989e30;

fn sun_and_belt(count: usize) -> Vec<Body> {
    let belt = BeltConfig {
        count,
        ..BeltConfig::default()
    };
    let mut rng = fastrand::Rng::with_seed(0);

    let mut bodies = vec![Body::new("Sun", SUN_MASS, 6.96e8, DVec3::zero(), DVec3::zero())];
    bodies.extend(asteroid_belt(&mut rng, &belt, SUN_MASS, Gravity::G));
    bodies
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("orbital_sim_step");
    group.sample_size(10);

    let bodies = sun_and_belt(1000);
    group.throughput(Throughput::Elements(bodies.len() as u64));

    let mut sequential = Simulation::new(Simulation::DEFAULT_TIME_STEP, &bodies).unwrap();
    sequential.step();
    group.bench_function("sequential", |b| b.iter(|| sequential.step()));

    let mut parallel = Simulation::new(Simulation::DEFAULT_TIME_STEP, &bodies).unwrap();
    parallel.set_use_rayon(true);
    parallel.step();
    group.bench_function("rayon", |b| b.iter(|| parallel.step()));

    // Skipping asteroid-asteroid pull on a uniform-mass belt has no effect, so
    // this mostly measures the cost of the ratio checks.
    let gravity = Gravity::default().with_negligible_mass_ratio(Some(Gravity::DEFAULT_NEGLIGIBLE_RATIO));
    let mut skipping = Simulation::with_gravity(Simulation::DEFAULT_TIME_STEP, &bodies, gravity).unwrap();
    skipping.step();
    group.bench_function("negligible_ratio_skip", |b| b.iter(|| skipping.step()));

    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
