//! somap CLI - Self-Organizing Maps
//!
//! Command-line interface for training maps and inspecting grid topologies.

use clap::{Parser, Subcommand};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::error;
use somap::{
    adjacency_matrix, load_samples, InitSpec, IterationEvent, Lattice, Result,
    SelfOrganizingMap, SomConfig, TrainingObserver,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "somap")]
#[command(version)]
#[command(about = "Self-Organizing Map trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a map on a sample file and print one label per sample
    Train {
        /// Input samples (one per line, comma or whitespace separated)
        #[arg(short, long)]
        input: PathBuf,

        /// Lattice side length
        #[arg(short, long, default_value = "16")]
        size: usize,

        /// Number of training iterations
        #[arg(short = 'n', long, default_value = "64")]
        iterations: usize,

        /// Initial learning rate
        #[arg(short, long, default_value = "1.0")]
        learning_rate: f64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the adjacency matrix of an orthotopic grid
    Adjacency {
        /// Extent of each grid axis
        #[arg(required = true)]
        dims: Vec<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = match cli.command {
        Commands::Train {
            input,
            size,
            iterations,
            learning_rate,
            seed,
        } => train_map(input, size, iterations, learning_rate, seed),

        Commands::Adjacency { dims } => print_adjacency(&dims),
    };

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Drives a progress bar from training events.
struct ProgressObserver {
    pb: ProgressBar,
}

impl TrainingObserver for ProgressObserver {
    fn on_iteration(&mut self, _lattice: &Lattice, event: &IterationEvent) {
        self.pb.set_position(event.iteration as u64);
        if event.iteration % 64 == 0 {
            self.pb
                .set_message(format!("lr={:.4} radius={:.2}", event.learning_rate, event.radius));
        }
    }

    fn on_finish(&mut self, _lattice: &Lattice) {
        self.pb.finish_and_clear();
    }
}

fn train_map(
    input: PathBuf,
    size: usize,
    iterations: usize,
    learning_rate: f64,
    seed: Option<u64>,
) -> Result<()> {
    let start_time = Instant::now();

    let samples = load_samples(&input)?;
    eprintln!(
        "✓ Loaded {} samples with {} features from {}",
        samples.nrows(),
        samples.ncols(),
        input.display()
    );

    let mut config = SomConfig::default()
        .with_iterations(iterations)
        .with_learning_rate(learning_rate);
    config.seed = seed;

    let mut som = SelfOrganizingMap::new(InitSpec::Random { size }, config)?;

    let bar_style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ");
    let pb = ProgressBar::new(iterations as u64);
    pb.set_style(bar_style);
    pb.set_message(format!("Training {}x{} map...", size, size));

    let mut progress = ProgressObserver { pb };
    som.fit_with_observer(samples.view(), &mut progress)?;

    let quantization = som.quantization_error(samples.view())?;
    let topographic = som.topographic_error(samples.view())?;

    if let Some(labels) = som.labels() {
        for pos in labels {
            println!("{} {}", pos.x, pos.y);
        }
    }

    eprintln!("✓ Trained in {}", HumanDuration(start_time.elapsed()));
    eprintln!("  Quantization error: {:.6}", quantization);
    eprintln!("  Topographic error:  {:.4}", topographic);
    Ok(())
}

fn print_adjacency(dims: &[usize]) -> Result<()> {
    let adjacency = adjacency_matrix(dims)?;
    for row in adjacency.outer_iter() {
        let line: Vec<&str> = row.iter().map(|&e| if e { "1" } else { "0" }).collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}
