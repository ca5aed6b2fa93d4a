use criterion::{criterion_group, criterion_main, Criterion};

use amrpic::prelude::*;

fn setup(n_particles: usize) -> Result<ParticleContainer, Box<dyn std::error::Error>> {
    let dim = SpaceDim::ThreeD;
    let geometry =
        CartesianAmrGeometry::from_boundaries_and_n_cells(dim, [0.0; 3], [1.0; 3], [32; 3])?
            .with_tile_size([8; 3])?;
    let species = Species::new("electrons", PhysicalSpecies::Electron, None, None)?;
    let mut container = ParticleContainer::new(species, dim, BufferSettings::default(), 0)?;
    let injector = InjectorPosition::random([0.0; 3], [1.0; 3], dim)?;
    let momentum = MomentumDistribution::Gaussian {
        mean: [0.0; 3],
        spread: [1e7; 3],
    };
    let ppc = n_particles.div_ceil(32 * 32 * 32);
    container.inject_particles(0, &geometry, &injector, ppc, &momentum, 1.0)?;
    container.save_all_momenta();
    Ok(container)
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("RelativisticPusher");
    group.sample_size(40);

    for n_particles in [32_768, 262_144, 1_048_576] {
        let mut container = setup(n_particles).unwrap();
        for scheme in [PushScheme::Explicit, PushScheme::Implicit] {
            group.bench_function(format!("{scheme:?} {n_particles} Particles"), |b| {
                b.iter(|| container.advance_all_positions(1e-12, scheme).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
