use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use std::error::Error;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use hd_engine::collective::Collective;
use hd_engine::generators;
use hd_engine::partition::Partition;
use hd_engine::resolver::Worker;
use hd_engine::scenario::{OutputMode, Scenario, SimulationInput};
use hd_engine::{Particle, World};

/// Simulates hard disks in a square box, advancing in unit time steps
/// resolved by a group of lock-stepped workers.
///
/// The scene is read from standard input as `N L r S command` followed
/// by up to N lines `index x y vx vy`; particles the input does not
/// supply are synthesized. With `command = print` every step is
/// reported, otherwise only the final state.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Number of cooperating workers.
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Read the scene from a YAML file instead of standard input.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Seed for synthesizing particles the input does not supply.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if cli.workers == 0 {
        return Err("at least one worker is required".into());
    }

    // The master acquires the scene; everyone else receives it through
    // the initial broadcast.
    let input = match &cli.scenario {
        Some(path) => Scenario::from_file(path)?.into_input(),
        None => SimulationInput::from_text(io::stdin().lock())?,
    };
    let world = input.world;
    let mode = input.mode;
    if world.particle_count == 0 {
        return Err("the scene must contain at least one particle".into());
    }

    let mut particles = input.particles;
    particles.truncate(world.particle_count);
    let supplied = particles.len();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    particles.extend(generators::generate_missing(&world, supplied, &mut rng));

    let partition = Partition::new(world.particle_count, cli.workers);
    let endpoints = Collective::connect(
        cli.workers,
        2 * partition.padded_len(),
        5 * partition.padded_len(),
    );
    info!(
        "{} particle(s) ({} from input), box {}, radius {}, {} step(s), {} worker(s)",
        world.particle_count, supplied, world.box_size, world.radius, world.steps, cli.workers
    );

    thread::scope(|scope| -> Result<(), Box<dyn Error>> {
        let particles = &particles;
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|link| {
                scope.spawn(move || -> io::Result<()> {
                    if link.rank() == 0 {
                        master_loop(world, mode, partition, link, particles)
                    } else {
                        worker_loop(world, partition, link)
                    }
                })
            })
            .collect();
        for handle in handles {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => return Err("a worker terminated abnormally".into()),
            }
        }
        Ok(())
    })?;
    Ok(())
}

/// The master worker: participates in every collective like everyone
/// else and owns all of the output.
fn master_loop(
    world: World,
    mode: OutputMode,
    partition: Partition,
    link: Collective,
    initial: &[Particle],
) -> io::Result<()> {
    let mut worker = Worker::new(world, partition, link);
    worker.load_particles(initial);
    worker.distribute_initial();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for step in 0..world.steps {
        if mode == OutputMode::EveryStep {
            for particle in worker.particles() {
                writeln!(out, "{} {}", step, particle.report())?;
            }
        }
        worker.step();
    }

    let totals = worker.collision_totals();
    for (particle, (pair, wall)) in worker.particles().iter().zip(totals) {
        writeln!(out, "{} {} {} {}", world.steps, particle.report(), pair, wall)?;
    }
    out.flush()?;
    Ok(())
}

fn worker_loop(world: World, partition: Partition, link: Collective) -> io::Result<()> {
    let mut worker = Worker::new(world, partition, link);
    worker.distribute_initial();
    for _ in 0..world.steps {
        worker.step();
    }
    worker.collision_totals();
    Ok(())
}
