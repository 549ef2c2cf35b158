use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colony::{DistanceMatrix, Params, RandomStream, load_distances, load_randoms};
use log::info;
use node::{RunPlan, RunSummary, Worker, bootstrap, launch_local};

const DEFAULT_ADDR: &str = "127.0.0.1:7700";

#[derive(Parser)]
#[command(name = "node")]
#[command(about = "Distributed ant colony optimization for the traveling salesman problem")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the instance, wait for every member and run as rank 0
    Coordinator {
        /// Address to accept members on
        #[arg(long, env = "COLONY_ADDR", default_value = DEFAULT_ADDR)]
        listen: String,

        /// Amount of workers, the coordinator included
        #[arg(short, long)]
        workers: usize,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Join a coordinator's run
    Member {
        /// Address of the coordinator
        #[arg(long, env = "COLONY_ADDR", default_value = DEFAULT_ADDR)]
        connect: String,
    },

    /// Run every worker inside this process
    Local {
        /// Amount of workers
        #[arg(short, long, default_value = "1")]
        workers: usize,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Distance matrix file
    distances: PathBuf,

    /// Random number file
    randoms: PathBuf,

    /// Amount of ants across every worker
    ants: usize,

    /// Amount of synchronization rounds
    external: u64,

    /// Amount of local iterations per round
    on_node: u64,

    /// Weight of the inverse distance
    alpha: f64,

    /// Weight of the pheromone
    beta: f64,

    /// Factor pheromones are multiplied by after each iteration
    evaporation: f64,
}

impl RunArgs {
    fn load(&self, workers: usize) -> anyhow::Result<(RunPlan, DistanceMatrix, RandomStream)> {
        let distances = load_distances(&self.distances)
            .with_context(|| format!("failed to load distances from {}", self.distances.display()))?;

        let randoms = load_randoms(&self.randoms)
            .with_context(|| format!("failed to load randoms from {}", self.randoms.display()))?;
        let stream = RandomStream::new(randoms)?;

        let params = Params::new(self.alpha, self.beta, self.evaporation)?;
        let plan = RunPlan::new(
            workers,
            self.ants,
            distances.cities(),
            self.external,
            self.on_node,
            params,
        )
        .context("invalid run parameters")?;

        Ok((plan, distances, stream))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Coordinator {
            listen,
            workers,
            run,
        } => {
            let (plan, distances, stream) = run.load(workers)?;
            print_plan(&plan, &run);

            let hub = bootstrap::listen(&listen, &plan, &distances, &stream)
                .await
                .with_context(|| format!("failed to set up the run at {listen}"))?;

            let summary = Worker::new(0, plan, distances, stream).run(hub).await?;
            print_summary(&summary, start);
        }
        Commands::Member { connect } => {
            let (enrollment, spoke) = bootstrap::connect(&connect)
                .await
                .with_context(|| format!("failed to join the run at {connect}"))?;

            let summary = Worker::from(enrollment).run(spoke).await?;
            info!(rank = summary.rank; "run finished");
        }
        Commands::Local { workers, run } => {
            let (plan, distances, stream) = run.load(workers)?;
            print_plan(&plan, &run);

            let summaries = launch_local(plan, distances, stream).await?;
            if let Some(summary) = summaries.first() {
                print_summary(summary, start);
            }
        }
    }

    Ok(())
}

fn print_plan(plan: &RunPlan, run: &RunArgs) {
    let schedule = &plan.schedule;

    println!("Ant colony optimization");
    println!("=======================");
    println!("  Distances:  {}", run.distances.display());
    println!("  Randoms:    {}", run.randoms.display());
    println!("  Cities:     {}", schedule.cities());
    println!("  Workers:    {}", schedule.workers());
    println!("  Ants:       {} {:?}", schedule.total_ants(), schedule.ants());
    println!("  Rounds:     {} x {} iterations", schedule.external(), schedule.on_node());
    println!(
        "  Alpha/Beta: {} / {}",
        plan.params.alpha, plan.params.beta
    );
    println!("  Evaporation: {}", plan.params.evaporation);
    println!();
}

fn print_summary(summary: &RunSummary, start: Instant) {
    match &summary.best {
        Some(best) => println!("Best cost: {}", best.cost),
        None => println!("Best cost: none"),
    }

    println!(
        "Rounds: {}{}",
        summary.history.len(),
        if summary.stopped_early {
            " (stagnation budget exhausted)"
        } else {
            ""
        }
    );
    println!("Elapsed: {:.3}s", start.elapsed().as_secs_f64());
}
