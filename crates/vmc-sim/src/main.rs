use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;

use vmc_core::{substream_seed, Optimizer, SampleRng, Tree};
use vmc_driver::{DistributedInfo, DriverExt, Observables, RunOptions, VariationalDriver};
use vmc_ising::{
    JastrowMachine, Magnetization, MetropolisSampler, Observable, SpinChain, SpinCorrelation,
    TransverseFieldIsing, Vmc,
};
use vmc_optim::{AdaGrad, Momentum, Sgd};

mod config;

use config::{OptimizerConfig, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "vmc-sim", about = "Variational Monte Carlo driver CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute an optimization run from a YAML configuration.
    Run(RunArgs),
    /// Print a description of the driver a configuration builds.
    Info(InfoArgs),
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// YAML configuration describing the simulation.
    #[arg(long)]
    config: PathBuf,
    /// Output prefix for the JSON log and parameter snapshots.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Override the configuration seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Disable the progress bar.
    #[arg(long)]
    quiet: bool,
}

#[derive(ClapArgs, Debug)]
struct InfoArgs {
    /// YAML configuration describing the simulation.
    #[arg(long)]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_simulation(args),
        Command::Info(args) => print_info(args),
    }
}

fn load_config(path: &PathBuf) -> Result<SimConfig, Box<dyn Error>> {
    Ok(serde_yaml::from_str(&fs::read_to_string(path)?)?)
}

fn build_optimizer(config: &OptimizerConfig) -> Box<dyn Optimizer> {
    match config {
        OptimizerConfig::Sgd {
            learning_rate,
            l2_reg,
        } => Box::new(Sgd::new(*learning_rate).with_l2_reg(*l2_reg)),
        OptimizerConfig::Momentum {
            learning_rate,
            beta,
        } => Box::new(Momentum::new(*learning_rate, *beta)),
        OptimizerConfig::AdaGrad { learning_rate } => Box::new(AdaGrad::new(*learning_rate)),
    }
}

fn build_driver(config: &SimConfig, seed: u64) -> Vmc<Box<dyn Optimizer>> {
    let chain = SpinChain::new(config.chain.sites, config.chain.periodic);
    let mut init_rng = SampleRng::for_stream(seed, 0);
    let machine = JastrowMachine::with_random_init(chain, 0.01, &mut init_rng);
    let sampler = MetropolisSampler::new(&chain, substream_seed(seed, 1));
    let hamiltonian =
        TransverseFieldIsing::new(config.hamiltonian.coupling, config.hamiltonian.field);
    Vmc::with_distributed(
        machine,
        build_optimizer(&config.optimizer),
        sampler,
        hamiltonian,
        config.sampler.samples,
        config.sampler.discard,
        DistributedInfo::from_env(),
    )
}

fn default_observables() -> Observables<Observable> {
    let mut observables = Observables::new();
    observables.insert(
        "Magnetization".to_string(),
        Tree::Leaf(Arc::new(Magnetization) as Observable),
    );
    observables.insert(
        "Correlation".to_string(),
        Tree::Leaf(Arc::new(SpinCorrelation::new(1)) as Observable),
    );
    observables
}

fn run_simulation(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let seed = args.seed.unwrap_or(config.seed);
    let mut driver = build_driver(&config, seed);

    let options = || {
        RunOptions::default()
            .with_observables(default_observables())
            .with_step_size(config.run.step_size)
            .with_save_params_every(config.run.save_params_every)
            .with_write_every(config.run.write_every)
            .with_show_progress(config.run.progress && !args.quiet)
    };

    match &args.out {
        Some(prefix) => driver.run(config.run.iterations, prefix.as_path(), options())?,
        None => driver.run(config.run.iterations, (), options())?,
    }

    let summary = json!({
        "seed": seed,
        "steps": driver.step_count(),
        "energy": driver.loss_stats().copied(),
        "acceptance": driver.sampler().acceptance(),
        "log": args.out.as_ref().map(|prefix| format!("{}.log", prefix.display())),
        "params": args.out.as_ref().map(|prefix| format!("{}.params.json", prefix.display())),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_info(args: InfoArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let driver = build_driver(&config, config.seed);
    println!("{}", driver.info(0));
    Ok(())
}
