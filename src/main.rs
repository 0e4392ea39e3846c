use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use grid_outbreak::generate::{generate, GeneratorOptions};
use grid_outbreak::output::{write_report, EchoWriter, Sinks, SvgWriter, TurnWriter};
use grid_outbreak::{logging, Scenario};
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Grid infection simulator")]
struct Cli {
    /// Enable logging at this level (off, error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "off")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario and write the turns and report files
    Run(RunArgs),
    /// Write a random scenario
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Scenario file to read
    #[arg(short, long, default_value = "INPUT.TXT")]
    input: PathBuf,

    /// Where to write the final report
    #[arg(short, long, default_value = "OUTPUT.TXT")]
    output: PathBuf,

    /// Where to write the per-turn boards
    #[arg(short, long, default_value = "TURNS.TXT")]
    turns: PathBuf,

    /// Also write every board as an SVG file into this directory
    #[arg(long)]
    svg_dir: Option<PathBuf>,

    /// Also print every board to stdout in colour
    #[arg(long)]
    echo: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Grid side length
    #[arg(long, default_value = "20")]
    size: i32,

    /// Number of entities
    #[arg(long, default_value = "40")]
    agents: usize,

    /// Number of turns
    #[arg(long, default_value = "60")]
    turns: usize,

    /// Number of entities infected at the start
    #[arg(long, default_value = "2")]
    infected: usize,

    /// Random seed
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Scenario file to write; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let scenario: Scenario = text
        .parse()
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    let mut sim = scenario.into_simulation()?;

    let mut sinks = Sinks::default();
    sinks.push(
        TurnWriter::create(&args.turns)
            .with_context(|| format!("failed to create {}", args.turns.display()))?,
    );
    if let Some(dir) = &args.svg_dir {
        sinks.push(
            SvgWriter::create(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?,
        );
    }
    if args.echo {
        sinks.push(EchoWriter::new(std::io::stdout()));
    }

    let report = sim.run(&mut sinks)?;
    write_report(&args.output, &report)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok(())
}

fn generate_scenario(args: GenerateArgs) -> anyhow::Result<()> {
    let scenario = generate(&GeneratorOptions {
        size: args.size,
        agents: args.agents,
        turns: args.turns,
        infected: args.infected,
        seed: args.seed,
    });

    match &args.output {
        Some(path) => fs::write(path, scenario.to_string())
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{scenario}"),
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level)?;

    match cli.command {
        Command::Run(args) => run(args),
        Command::Generate(args) => generate_scenario(args),
    }
}
