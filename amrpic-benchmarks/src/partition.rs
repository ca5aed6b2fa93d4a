use amrpic::prelude::*;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// BENCHMARK SPECIFIC CODE

#[derive(Clone, Debug, Eq, Deserialize, PartialEq, Serialize)]
struct PartitionSettings {
    /// Number of particles per cell
    ppc: usize,
    /// Number of cells along each axis
    n_cells: usize,
    n_threads: std::num::NonZeroUsize,
    n_current_deposition_buffer: i32,
    n_field_gather_buffer: i32,
}

struct Setup {
    geometry: CartesianAmrGeometry,
    container: ParticleContainer,
    current_mask: MaskArray,
    gather_mask: MaskArray,
}

fn setup(settings: &PartitionSettings) -> Result<Setup, PicError> {
    let dim = SpaceDim::ThreeD;
    let n_cells = settings.n_cells;
    let geometry =
        CartesianAmrGeometry::from_boundaries_and_n_cells(dim, [0.0; 3], [1.0; 3], [n_cells; 3])?
            .with_tile_size([8; 3])?;
    let species = Species::new("electrons", PhysicalSpecies::Electron, None, None)?;
    let buffers = BufferSettings {
        n_current_deposition_buffer: settings.n_current_deposition_buffer,
        n_field_gather_buffer: settings.n_field_gather_buffer,
        ..Default::default()
    };
    let mut container = ParticleContainer::new(species, dim, buffers, 1)?;
    let injector = InjectorPosition::random([0.0; 3], [1.0; 3], dim)?;
    container.inject_particles(
        0,
        &geometry,
        &injector,
        settings.ppc,
        &MomentumDistribution::default(),
        1.0,
    )?;

    let lo = [(n_cells / 4) as i64; 3];
    let hi = [(3 * n_cells / 4) as i64; 3];
    let width = |n: i32| n.max(0) as usize;
    let current_mask =
        MaskArray::from_fine_patch(lo, hi, width(settings.n_current_deposition_buffer), dim)?;
    let gather_mask =
        MaskArray::from_fine_patch(lo, hi, width(settings.n_field_gather_buffer), dim)?;
    Ok(Setup {
        geometry,
        container,
        current_mask,
        gather_mask,
    })
}

/// Partitions every tile once and returns the elapsed time in nanoseconds.
fn run_partition(settings: &PartitionSettings) -> Result<u128, Box<dyn std::error::Error>> {
    let Setup {
        geometry,
        mut container,
        current_mask,
        gather_mask,
    } = setup(settings)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.n_threads.get())
        .build()?;
    let keys: Vec<TileKey> = container.tiles().map(|(key, _)| *key).collect();

    let now = std::time::Instant::now();
    pool.install(|| -> Result<(), IndexError> {
        for (level, tile) in keys {
            let res = container.partition_for_buffers(
                level,
                tile,
                &geometry,
                &current_mask,
                &gather_mask,
            )?;
            std::hint::black_box(res);
        }
        Ok(())
    })?;
    Ok(now.elapsed().as_nanos())
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct BenchmarkResult {
    partition_settings: PartitionSettings,
    times: Vec<u128>,
}

impl BenchmarkResult {
    fn get_file_path(args: &CLIArgs, save_prefix: &str) -> std::path::PathBuf {
        args.get_storage_base_path()
            .join(format!("{save_prefix}.json"))
    }

    fn store_all(
        results: &[Self],
        args: &CLIArgs,
        save_prefix: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let file_path = Self::get_file_path(args, save_prefix);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let buffer = std::fs::File::create(file_path)?;
        serde_json::to_writer_pretty(buffer, results)?;
        Ok(())
    }
}

fn run_samples(
    args: &CLIArgs,
    settings: Vec<PartitionSettings>,
    formatter: impl Fn(&PartitionSettings) -> String,
    save_prefix: &str,
) -> Result<Vec<BenchmarkResult>, Box<dyn std::error::Error>> {
    let mut results = vec![];
    for setting in settings.into_iter() {
        // Do warm-up run before main
        run_partition(&setting)?;

        let mut times = vec![];
        for _ in 0..args.sample_size {
            times.push(run_partition(&setting)?);
        }
        if !args.no_output {
            let mean = times.iter().sum::<u128>() / times.len().max(1) as u128;
            println!("{} Mean: {:.3}ms", formatter(&setting), mean as f64 * 1e-6);
        }
        results.push(BenchmarkResult {
            partition_settings: setting,
            times,
        });
    }
    if !args.no_save {
        BenchmarkResult::store_all(&results, args, save_prefix)?;
    }
    Ok(results)
}

fn thread_scaling(
    args: &CLIArgs,
    threads: Vec<usize>,
) -> Result<Vec<BenchmarkResult>, Box<dyn std::error::Error>> {
    let settings = threads
        .into_iter()
        .map(|n_threads| -> Result<PartitionSettings, Box<dyn std::error::Error>> {
            Ok(PartitionSettings {
                ppc: 8,
                n_cells: 64,
                n_threads: n_threads.try_into()?,
                n_current_deposition_buffer: 2,
                n_field_gather_buffer: 3,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    run_samples(
        args,
        settings,
        |setting| format!("Threads: {}", setting.n_threads),
        "thread-scaling",
    )
}

fn problem_size_scaling(
    args: &CLIArgs,
    n_cells: Vec<usize>,
    n_threads: usize,
) -> Result<Vec<BenchmarkResult>, Box<dyn std::error::Error>> {
    let n_threads: std::num::NonZeroUsize = n_threads.try_into()?;
    let settings = n_cells
        .into_iter()
        .map(|n_cells| PartitionSettings {
            ppc: 8,
            n_cells,
            n_threads,
            n_current_deposition_buffer: 2,
            n_field_gather_buffer: 3,
        })
        .collect();
    run_samples(
        args,
        settings,
        |setting| format!("Cells: {}^3", setting.n_cells),
        "problem-size",
    )
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Thread scaling benchmark
    Threads {
        /// List of thread configurations to benchmark
        threads: Vec<usize>,
    },
    /// Problem size scaling benchmark
    ProblemSize {
        /// Number of cells along each axis
        n_cells: Vec<usize>,
        #[arg(short, default_value_t = 1)]
        n_threads: usize,
    },
}

/// Benchmark the buffer partitioning of particles for thread or problem size scaling
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CLIArgs {
    /// Name of the current runs such as name of the device to be benchmarked
    #[arg(required = true)]
    name: String,

    /// Output directory of benchmark results
    #[arg(short, long, default_value_t = format!("benchmark_results"))]
    output_directory: String,

    #[command(subcommand)]
    commands: Option<SubCommand>,

    /// Number of samples to be generated for each measurement
    #[arg(short, long, default_value_t = 5)]
    sample_size: usize,

    /// Do not save results
    #[arg(long, default_value_t = false)]
    no_save: bool,

    /// Disables output
    #[arg(long, default_value_t = false)]
    no_output: bool,
}

impl CLIArgs {
    fn get_storage_base_path(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.output_directory).join(&self.name)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CLIArgs::parse();

    if let Some(command) = &args.commands {
        if !args.no_output {
            println!("Generating Results for device {}", args.name);
        }
        match command {
            SubCommand::Threads { threads } => {
                thread_scaling(&args, threads.clone())?;
            }
            SubCommand::ProblemSize { n_cells, n_threads } => {
                problem_size_scaling(&args, n_cells.clone(), *n_threads)?;
            }
        }
    }
    Ok(())
}
