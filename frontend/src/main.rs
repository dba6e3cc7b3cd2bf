use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use walker::generate::perfect_maze;
use walker::util::{draw_image, parse_img, Classifier};
use walker::{walk, Grid};

use crate::config::Config;

mod config;

/// Find a way through a maze bitmap
#[derive(Debug, Parser)]
#[command(name = "maze-walker", version)]
struct Cli {
    /// JSON file with solver, palette and ratio settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log more, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a maze bitmap and draw the route into a new one
    Solve(SolveArgs),
    /// Write a random maze bitmap
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct SolveArgs {
    /// Maze bitmap (gif, png, ...)
    input: PathBuf,

    /// Where to write the annotated maze bitmap
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where to write the route as JSON
    #[arg(long)]
    route: Option<PathBuf>,

    /// Number of solver workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Pixels per cell in the output bitmap
    #[arg(long)]
    ratio: Option<u32>,

    /// Pixels per cell in the input bitmap
    #[arg(long)]
    input_ratio: Option<u32>,

    /// How pixels are classified: exact or threshold
    #[arg(long)]
    classifier: Option<Classifier>,

    /// Do not print the solved maze
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Where to write the maze bitmap
    output: PathBuf,

    #[arg(long, default_value_t = 20)]
    columns: usize,

    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Seed for a reproducible maze
    #[arg(long)]
    seed: Option<u64>,

    /// Pixels per cell in the output bitmap
    #[arg(long)]
    ratio: Option<u32>,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Solve(args) => {
            if let Some(workers) = args.workers {
                config.solver.workers = workers;
            }
            if let Some(ratio) = args.ratio {
                config.ratio = ratio;
            }
            if let Some(ratio) = args.input_ratio {
                config.input_ratio = ratio;
            }
            if let Some(classifier) = args.classifier {
                config.classifier = classifier;
            }
            solve(&config, &args)
        }
        Command::Generate(args) => {
            if let Some(ratio) = args.ratio {
                config.ratio = ratio;
            }
            generate(&config, &args)
        }
    }
}

fn solve(config: &Config, args: &SolveArgs) -> Result<(), anyhow::Error> {
    debug!("{:?}", config);

    let img = image::open(&args.input)
        .with_context(|| format!("failed to open maze image {}", args.input.display()))?;
    let grid = parse_img(&img, config.classifier, &config.palette, config.input_ratio)?;
    info!(
        "loaded {}x{} maze from {}",
        grid.width(),
        grid.height(),
        args.input.display()
    );

    let solution = walk(&grid, &config.solver)
        .with_context(|| format!("failed to solve {}", args.input.display()))?;

    if !args.quiet {
        print!("{}", grid);
    }
    println!(
        "route from {} to {}: {} cells",
        solution.route.start(),
        solution.route.end(),
        solution.route.len()
    );

    if let Some(output) = &args.output {
        draw_image(&grid, &config.palette, config.ratio)?
            .save(output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!("wrote solved maze to {}", output.display());
    }

    if let Some(path) = &args.route {
        let json = serde_json::to_string_pretty(&solution.route)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote route to {}", path.display());
    }

    Ok(())
}

fn generate(config: &Config, args: &GenerateArgs) -> Result<(), anyhow::Error> {
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let tiles = perfect_maze(args.columns, args.rows, &mut rng)?;
    let grid = Grid::from_tiles(&tiles)?;

    draw_image(&grid, &config.palette, config.ratio)?
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        "wrote {}x{} maze to {}",
        args.columns,
        args.rows,
        args.output.display()
    );

    Ok(())
}
