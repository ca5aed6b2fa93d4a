use amrpic::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const N_CELLS: i64 = 16;

fn geometry() -> Result<CartesianAmrGeometry, Box<dyn std::error::Error>> {
    Ok(CartesianAmrGeometry::from_boundaries_and_n_cells(
        SpaceDim::OneDZ,
        [0.0; 3],
        [1.0, 1.0, N_CELLS as f64],
        [1, 1, N_CELLS as usize],
    )?
    .with_refinement(2, 2)?)
}

fn container(
    n_current: i32,
    n_gather: i32,
    deposit_on_main_grid: bool,
    gather_from_main_grid: bool,
) -> Result<ParticleContainer, Box<dyn std::error::Error>> {
    let species = Species::new("electrons", PhysicalSpecies::Electron, None, None)?;
    let buffers = BufferSettings {
        n_current_deposition_buffer: n_current,
        n_field_gather_buffer: n_gather,
        deposit_on_main_grid,
        gather_from_main_grid,
    };
    Ok(ParticleContainer::new(species, SpaceDim::OneDZ, buffers, 0)?)
}

/// Places one particle at the center of each given cell on `level`.
/// Particle ids are assigned in the given order, starting at 1.
fn add_particles_in_cells(
    pc: &mut ParticleContainer,
    level: usize,
    cells: &[i64],
) -> Result<(), Box<dyn std::error::Error>> {
    let geometry = geometry()?;
    let dz = geometry.cell_size(level)[2];
    let particles = cells.iter().map(|c| ParticleInit {
        pos: [0.0, 0.0, (*c as f64 + 0.5) * dz],
        weight: 1.0,
        ..Default::default()
    });
    pc.add_n_particles(level, &geometry, particles)?;
    Ok(())
}

fn mask_from_flags(flags: &[bool]) -> Result<MaskArray, SetupError> {
    MaskArray::from_fn([0, 0, 0], [1, 1, flags.len() as i64], |c| {
        flags[c[2] as usize] as i32
    })
}

fn ids(pc: &ParticleContainer, level: usize) -> Vec<u64> {
    pc.tile(level, 0)
        .map(|t| t.ids().iter().map(|p| p.id).collect())
        .unwrap_or_default()
}

#[test]
fn four_particle_worked_trace() -> Result<(), Box<dyn std::error::Error>> {
    // Particles 1, 2, 3, 4 sit in cells 0, 1, 2, 3
    let mut pc = container(2, 1, false, false)?;
    add_particles_in_cells(&mut pc, 0, &[0, 1, 2, 3])?;
    let current = mask_from_flags(&[true, true, false, false])?;
    let gather = mask_from_flags(&[true, false, true, false])?;

    // The current buffer is larger and decides the first split: [1, 2 | 3, 4].
    // The suffix [3, 4] is then split against the gather mask: [3 | 4].
    let res = pc.partition_for_buffers(0, 0, &geometry()?, &current, &gather)?;
    assert_eq!(res.n_fine_current, 2);
    assert_eq!(res.n_fine_gather, 3);
    assert_eq!(ids(&pc, 0), vec![1, 2, 3, 4]);
    Ok(())
}

#[test]
fn worked_trace_with_reordering() -> Result<(), Box<dyn std::error::Error>> {
    let mut pc = container(2, 1, false, false)?;
    add_particles_in_cells(&mut pc, 0, &[0, 1, 2, 3])?;
    let current = mask_from_flags(&[false, true, false, true])?;
    let gather = mask_from_flags(&[true, true, false, false])?;

    // First split by current mask: [2, 4 | 1, 3]
    // Suffix [1, 3] against gather mask: [1 | 3]
    let res = pc.partition_for_buffers(0, 0, &geometry()?, &current, &gather)?;
    assert_eq!(res.n_fine_current, 2);
    assert_eq!(res.n_fine_gather, 3);
    assert_eq!(ids(&pc, 0), vec![2, 4, 1, 3]);

    // Partitioning again is stable
    let res2 = pc.partition_for_buffers(0, 0, &geometry()?, &current, &gather)?;
    assert_eq!(res, res2);
    assert_eq!(ids(&pc, 0), vec![2, 4, 1, 3]);
    Ok(())
}

#[test]
fn equal_buffers_use_gather_mask_only() -> Result<(), Box<dyn std::error::Error>> {
    let mut pc = container(1, 1, false, false)?;
    add_particles_in_cells(&mut pc, 0, &[0, 1, 2])?;
    // The current mask is never consulted for equal widths
    let current = mask_from_flags(&[false, false, false])?;
    let gather = mask_from_flags(&[false, true, true])?;
    let res = pc.partition_for_buffers(0, 0, &geometry()?, &current, &gather)?;
    assert_eq!(res.n_fine_current, 2);
    assert_eq!(res.n_fine_gather, 2);
    assert_eq!(ids(&pc, 0), vec![2, 3, 1]);
    assert!(pc
        .check_mask_consistency(0, 0, &geometry()?, &current, &gather)
        .is_err());
    Ok(())
}

#[test]
fn empty_tile_returns_zero() -> Result<(), Box<dyn std::error::Error>> {
    let mut pc = container(2, 1, true, true)?;
    add_particles_in_cells(&mut pc, 0, &[0])?;
    pc.apply_boundary_conditions([0.0; 3], [0.0, 0.0, 0.1]);
    assert_eq!(pc.tile(0, 0).map(|t| t.len()), Some(0));
    let mask = mask_from_flags(&[true; 16])?;
    let res = pc.partition_for_buffers(0, 0, &geometry()?, &mask, &mask)?;
    assert_eq!(res, BufferPartition::default());
    Ok(())
}

#[test]
fn overrides_force_coarse_level() -> Result<(), Box<dyn std::error::Error>> {
    let geometry = geometry()?;
    let all_fine = MaskArray::filled([0, 0, 0], [1, 1, 2 * N_CELLS], 1)?;
    for (deposit, gather) in [(true, false), (false, true), (true, true)] {
        let mut pc = container(2, 1, deposit, gather)?;
        add_particles_in_cells(&mut pc, 1, &[0, 5, 9, 14])?;
        let res = pc.partition_for_buffers(1, 0, &geometry, &all_fine, &all_fine)?;
        assert_eq!(res.n_fine_current, if deposit { 0 } else { 4 });
        assert_eq!(res.n_fine_gather, if gather { 0 } else { 4 });
        assert_eq!(ids(&pc, 1), vec![1, 2, 3, 4]);

        // Level 0 is not affected
        add_particles_in_cells(&mut pc, 0, &[1, 2])?;
        let res = pc.partition_for_buffers(0, 0, &geometry, &all_fine, &all_fine)?;
        assert_eq!((res.n_fine_current, res.n_fine_gather), (2, 2));
    }
    Ok(())
}

/// Relative order of the original insertion is kept.
fn is_ordered(ids: &[u64]) -> bool {
    ids.windows(2).all(|w| w[0] < w[1])
}

#[test]
fn random_masks_stability_and_conservation() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let geometry = geometry()?;
    for (n_current, n_gather) in [(1, 2), (2, 1), (0, 3), (3, 0), (2, 2), (0, 0)] {
        for _ in 0..20 {
            let np = rng.gen_range(1..200);
            let cells: Vec<i64> = (0..np).map(|_| rng.gen_range(0..N_CELLS)).collect();
            let current_flags: Vec<bool> = (0..N_CELLS).map(|_| rng.gen_bool(0.5)).collect();
            let gather_flags: Vec<bool> = (0..N_CELLS).map(|_| rng.gen_bool(0.5)).collect();
            let current = mask_from_flags(&current_flags)?;
            let gather = mask_from_flags(&gather_flags)?;

            let mut pc = container(n_current, n_gather, false, false)?;
            add_particles_in_cells(&mut pc, 0, &cells)?;
            let res = pc.partition_for_buffers(0, 0, &geometry, &current, &gather)?;
            let after = ids(&pc, 0);

            // Count conservation
            let mut sorted = after.clone();
            sorted.sort();
            assert_eq!(sorted, (1..=np as u64).collect::<Vec<_>>());
            assert!(res.n_fine_current <= np && res.n_fine_gather <= np);
            if n_current == n_gather {
                assert_eq!(res.n_fine_current, res.n_fine_gather);
            }

            // The first split belongs to the larger buffer
            let (n_first, n_second, n_other_buf) = if n_gather >= n_current {
                (res.n_fine_gather, res.n_fine_current, n_current)
            } else {
                (res.n_fine_current, res.n_fine_gather, n_gather)
            };
            let (first_flags, second_flags) = if n_gather >= n_current {
                (&gather_flags, &current_flags)
            } else {
                (&current_flags, &gather_flags)
            };
            let cell_of = |id: u64| cells[id as usize - 1] as usize;
            assert!(after[..n_first].iter().all(|id| first_flags[cell_of(*id)]));
            assert!(after[n_first..].iter().all(|id| !first_flags[cell_of(*id)]));
            assert!(is_ordered(&after[..n_first]));
            if n_current != n_gather && n_other_buf > 0 && n_first < np {
                assert!(n_second >= n_first);
                assert!(after[n_first..n_second]
                    .iter()
                    .all(|id| second_flags[cell_of(*id)]));
                assert!(after[n_second..]
                    .iter()
                    .all(|id| !second_flags[cell_of(*id)]));
                assert!(is_ordered(&after[n_first..n_second]));
                assert!(is_ordered(&after[n_second..]));
            } else {
                assert!(is_ordered(&after[n_first..]));
            }
            if n_current != n_gather && n_other_buf == 0 {
                assert_eq!(n_second, np);
            }
        }
    }
    Ok(())
}
