use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use amrpic::prelude::*;

fn setup(
    n_cells: usize,
    ppc: usize,
) -> Result<(CartesianAmrGeometry, ParticleContainer, MaskArray, MaskArray), Box<dyn std::error::Error>>
{
    let dim = SpaceDim::ThreeD;
    let geometry =
        CartesianAmrGeometry::from_boundaries_and_n_cells(dim, [0.0; 3], [1.0; 3], [n_cells; 3])?
            .with_tile_size([8; 3])?;
    let species = Species::new("electrons", PhysicalSpecies::Electron, None, None)?;
    let buffers = BufferSettings {
        n_current_deposition_buffer: 2,
        n_field_gather_buffer: 3,
        ..Default::default()
    };
    let mut container = ParticleContainer::new(species, dim, buffers, 0)?;
    let injector = InjectorPosition::random([0.0; 3], [1.0; 3], dim)?;
    container.inject_particles(
        0,
        &geometry,
        &injector,
        ppc,
        &MomentumDistribution::default(),
        1.0,
    )?;

    // Fine patch covering the central half of the domain
    let lo = [(n_cells / 4) as i64; 3];
    let hi = [(3 * n_cells / 4) as i64; 3];
    let current_mask = MaskArray::from_fine_patch(lo, hi, 2, dim)?;
    let gather_mask = MaskArray::from_fine_patch(lo, hi, 3, dim)?;
    Ok((geometry, container, current_mask, gather_mask))
}

fn partition_all(
    container: &mut ParticleContainer,
    geometry: &CartesianAmrGeometry,
    current_mask: &MaskArray,
    gather_mask: &MaskArray,
) -> Result<usize, IndexError> {
    let keys: Vec<TileKey> = container.tiles().map(|(key, _)| *key).collect();
    let mut n_fine = 0;
    for (level, tile) in keys {
        let res =
            container.partition_for_buffers(level, tile, geometry, current_mask, gather_mask)?;
        n_fine += res.n_fine_gather;
    }
    Ok(n_fine)
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("BufferPartitioner-RandomParticles");
    group.sample_size(20);

    for n_cells in [16, 32, 64] {
        let (geometry, container, current_mask, gather_mask) = setup(n_cells, 4).unwrap();
        group.bench_function(format!("{n_cells}^3 Cells"), |b| {
            b.iter_batched(
                || container.clone(),
                |mut container| {
                    partition_all(&mut container, &geometry, &current_mask, &gather_mask)
                        .unwrap()
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
