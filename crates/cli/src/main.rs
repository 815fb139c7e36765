//! Memory trace characterization and synthesis CLI.
//!
//! This binary provides a single entry point for both halves of the pipeline. It performs:
//! 1. **Profile:** Characterize a plain-text trace into a JSON profile (`[profiler]` section).
//! 2. **Generate:** Mix one or more profiles and synthesize a trace (`[generator]` section).
//!
//! Both subcommands read a TOML configuration; command-line flags override its values.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use memsynth_core::config::{Config, FormatKind, GeneratorConfig, ProfilerConfig};
use memsynth_core::model::{ProfileMixer, Profile};
use memsynth_core::sim::{Profiler, TraceSynthesizer};
use memsynth_core::stats::RunStats;
use memsynth_core::{Error, Result};

#[derive(Parser, Debug)]
#[command(
    name = "memsynth",
    author,
    version,
    about = "Memory-reference characterization and synthetic trace generation",
    long_about = "Learn a statistical model of an application's memory references from an address trace, then generate new traces from one or more mixed models.\n\nExamples:\n  memsynth profile app.toml\n  memsynth generate app.toml --length 100000 --seed 7\n  memsynth generate mix.toml --weights 3,1 --format ovp -o mix.trace"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Characterize a trace into a profile.
    Profile {
        /// TOML configuration with a `[profiler]` section.
        config: PathBuf,

        /// Trace to characterize (overrides `trace_file`).
        #[arg(short, long)]
        trace: Option<PathBuf>,

        /// Profile destination (overrides `output_file`).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Block size in bytes (overrides `block_size`).
        #[arg(long)]
        block_size: Option<u64>,

        /// Reuse-distance bins (overrides `bins`).
        #[arg(long)]
        bins: Option<usize>,
    },

    /// Synthesize a trace from one or more profiles.
    Generate {
        /// TOML configuration with a `[generator]` section.
        config: PathBuf,

        /// Trace destination (overrides `output_file`); `-` writes to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of references to synthesize (overrides `length`).
        #[arg(short, long)]
        length: Option<u64>,

        /// Random seed (overrides `seed`).
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output convention: `stl` or `ovp` (overrides `format`).
        #[arg(short, long)]
        format: Option<FormatKind>,

        /// Comma-separated mixing weights (overrides `weights`).
        #[arg(short, long, value_delimiter = ',')]
        weights: Option<Vec<f64>>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Profile {
            config,
            trace,
            output,
            block_size,
            bins,
        } => cmd_profile(&config, trace, output, block_size, bins),
        Commands::Generate {
            config,
            output,
            length,
            seed,
            format,
            weights,
        } => cmd_generate(&config, output, length, seed, format, weights),
    };

    if let Err(e) = result {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Reads `path` and returns its `[profiler]` section with overrides applied.
fn profiler_config(
    path: &Path,
    trace: Option<PathBuf>,
    output: Option<PathBuf>,
    block_size: Option<u64>,
    bins: Option<usize>,
) -> Result<ProfilerConfig> {
    let mut config = Config::from_file(path)?
        .profiler
        .ok_or_else(|| Error::InvalidConfig(format!("{}: missing [profiler] section", path.display())))?;
    if let Some(trace) = trace {
        config.trace_file = trace;
    }
    if let Some(output) = output {
        config.output_file = output;
    }
    if let Some(block_size) = block_size {
        config.block_size = block_size;
    }
    if let Some(bins) = bins {
        config.bins = bins;
    }
    config.validate()?;
    Ok(config)
}

/// Characterizes the configured trace and prints its statistics.
fn cmd_profile(
    path: &Path,
    trace: Option<PathBuf>,
    output: Option<PathBuf>,
    block_size: Option<u64>,
    bins: Option<usize>,
) -> Result<()> {
    let config = profiler_config(path, trace, output, block_size, bins)?;
    println!("[*] Profiling: {}", config.trace_file.display());
    println!(
        "    block_size={} bins={} output={}",
        config.block_size,
        config.bins,
        config.output_file.display()
    );

    let (profile, stats) = Profiler::profile_file(&config)?;
    stats.print("CHARACTERIZATION");
    println!(
        "\n[*] Profile written: {} ({} blocks)",
        config.output_file.display(),
        profile.working_set.len()
    );
    Ok(())
}

/// Reads `path` and returns its `[generator]` section with overrides applied.
fn generator_config(
    path: &Path,
    output: Option<PathBuf>,
    length: Option<u64>,
    seed: Option<u64>,
    format: Option<FormatKind>,
    weights: Option<Vec<f64>>,
) -> Result<GeneratorConfig> {
    let mut config = Config::from_file(path)?
        .generator
        .ok_or_else(|| Error::InvalidConfig(format!("{}: missing [generator] section", path.display())))?;
    if let Some(output) = output {
        config.output_file = (output.as_os_str() != "-").then_some(output);
    }
    if let Some(length) = length {
        config.length = length;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(format) = format {
        config.format = format;
    }
    if let Some(weights) = weights {
        config.weights = weights;
    }

    // Relative profile paths are resolved against the configuration file.
    if let Some(base) = path.parent() {
        for profile in &mut config.profiles {
            if profile.is_relative() && !profile.exists() {
                *profile = base.join(&*profile);
            }
        }
    }
    config.validate()?;
    Ok(config)
}

/// Mixes the configured profiles and writes the synthesized trace.
fn cmd_generate(
    path: &Path,
    output: Option<PathBuf>,
    length: Option<u64>,
    seed: Option<u64>,
    format: Option<FormatKind>,
    weights: Option<Vec<f64>>,
) -> Result<()> {
    let config = generator_config(path, output, length, seed, format, weights)?;

    let profiles = config
        .profiles
        .iter()
        .map(Profile::load)
        .collect::<Result<Vec<_>>>()?;
    let mixer = ProfileMixer::new(&profiles, &config.weights)?;
    info!(profiles = profiles.len(), weights = ?mixer.weights(), "mixing profiles");
    let model = mixer.mix()?;
    let mut synthesizer = TraceSynthesizer::new(model)?;

    let mut rng = config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let formatter = config.format.formatter();

    match &config.output_file {
        Some(file) => {
            let handle = File::create(file).map_err(|e| Error::io(file, e))?;
            let mut out = BufWriter::new(handle);
            let result = synthesizer.generate(config.length, &mut rng, formatter.as_ref(), &mut out);
            out.flush().map_err(|e| Error::io(file, e))?;
            let stats = result?;
            stats.print("SYNTHESIS");
            println!("\n[*] Trace written: {}", file.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let result = synthesizer.generate(config.length, &mut rng, formatter.as_ref(), &mut out);
            out.flush()?;
            report(result?);
        }
    }
    Ok(())
}

/// Logs a summary when the trace itself occupies stdout.
fn report(stats: &RunStats) {
    if stats.accesses == 0 {
        warn!("no references synthesized");
    }
    info!(
        cycles = stats.cycles,
        accesses = stats.accesses,
        loads = stats.loads,
        blocks = stats.blocks,
        "trace written to stdout"
    );
}
