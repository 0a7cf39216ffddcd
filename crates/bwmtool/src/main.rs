// bwmtool - walkmesh inspection and conversion tool
// Reads, rewrites and edits binary walkmeshes (.wok/.dwk/.pwk)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod batch;
mod commands;

use bwm_shared::config::Config;
use bwm_shared::log::{initialize_logging, map_log_level};

/// Default config file name
const BWMTOOL_CONFIG: &str = "bwmtool.conf";

/// Environment prefix for config overrides, e.g. `BwmTool_LogLevel`
const CONFIG_ENV_PREFIX: &str = "BwmTool_";

#[derive(Parser, Debug)]
#[command(name = "bwmtool")]
#[command(about = "Binary walkmesh inspection and conversion tool")]
#[command(version)]
struct Cli {
    /// Console log level override (0=Error, 1=Warning, 2=Detail, 3=Full/Debug, 4=Trace)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<i32>,

    /// Configuration file
    #[arg(short, long, default_value = BWMTOOL_CONFIG)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print counts of faces, vertices and derived tables
    Info(WalkmeshArgs),
    /// Dump the walkmesh and its derived tables as JSON
    Dump(DumpArgs),
    /// Load a walkmesh and write it back with regenerated tables
    Rewrite(RewriteArgs),
    /// Face under an (x, y) point
    FaceAt(FaceAtArgs),
    /// Face path between two walkable faces
    Path(PathArgs),
    /// Translate, rotate, mirror or relabel a walkmesh
    Transform(TransformArgs),
    /// Load and rebuild every walkmesh in a directory
    Batch(BatchArgs),
}

/// A walkmesh file, or a window of one inside a larger archive
#[derive(Args, Debug)]
struct WalkmeshArgs {
    file: PathBuf,

    /// Byte offset of the walkmesh inside `file`
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Byte size of the walkmesh; 0 reads to the end of `file`
    #[arg(long, default_value_t = 0)]
    size: usize,
}

#[derive(Args, Debug)]
struct DumpArgs {
    #[command(flatten)]
    input: WalkmeshArgs,

    /// Output JSON file; stdout when absent
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RewriteArgs {
    #[command(flatten)]
    input: WalkmeshArgs,

    /// Output walkmesh
    output: PathBuf,
}

#[derive(Args, Debug)]
struct FaceAtArgs {
    #[command(flatten)]
    input: WalkmeshArgs,

    #[arg(allow_negative_numbers = true)]
    x: f64,

    #[arg(allow_negative_numbers = true)]
    y: f64,
}

#[derive(Args, Debug)]
struct PathArgs {
    #[command(flatten)]
    input: WalkmeshArgs,

    start: usize,
    goal: usize,
}

#[derive(Clone, Copy, Debug)]
struct Offset {
    x: f64,
    y: f64,
    z: f64,
}

fn parse_offset(input: &str) -> Result<Offset, String> {
    let mut parts = input.split(',');
    let mut next = |name: &str| {
        parts
            .next()
            .ok_or_else(|| format!("Missing {}", name))?
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("Invalid {}", name))
    };
    let offset = Offset {
        x: next("X")?,
        y: next("Y")?,
        z: next("Z")?,
    };
    if parts.next().is_some() {
        return Err("Expected X,Y,Z".to_string());
    }
    Ok(offset)
}

#[derive(Clone, Copy, Debug)]
struct Relabel {
    old: u32,
    new: u32,
}

fn parse_relabel(input: &str) -> Result<Relabel, String> {
    let (old, new) = input
        .split_once(':')
        .ok_or_else(|| "Expected OLD:NEW".to_string())?;
    Ok(Relabel {
        old: old.trim().parse().map_err(|_| "Invalid OLD".to_string())?,
        new: new.trim().parse().map_err(|_| "Invalid NEW".to_string())?,
    })
}

#[derive(Args, Debug)]
struct TransformArgs {
    #[command(flatten)]
    input: WalkmeshArgs,

    /// Output walkmesh
    output: PathBuf,

    /// Move every vertex (format: X,Y,Z)
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true)]
    translate: Option<Offset>,

    /// Rotate counter-clockwise about Z, in degrees
    #[arg(long, allow_negative_numbers = true)]
    rotate: Option<f64>,

    /// Mirror across the Y axis (negate X)
    #[arg(long)]
    flip_x: bool,

    /// Mirror across the X axis (negate Y)
    #[arg(long)]
    flip_y: bool,

    /// Renumber room transitions (format: OLD:NEW), repeatable
    #[arg(long, value_parser = parse_relabel)]
    relabel: Vec<Relabel>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Directory searched recursively for walkmeshes
    dir: PathBuf,

    /// Number of threads to use
    #[arg(long = "threads")]
    threads: Option<usize>,
}

fn load_config(path: &str) -> Config {
    let mut config = Config::from_env(CONFIG_ENV_PREFIX);
    if !config.set_source(path, CONFIG_ENV_PREFIX) && path != BWMTOOL_CONFIG {
        eprintln!("Could not find configuration file {}.", path);
    }
    config
}

fn init_logging(config: &Config, log_level: Option<i32>) {
    let level = log_level.unwrap_or_else(|| config.get_int_default("LogLevel", 2));
    let logs_dir = config.get_string_default("LogsDir", "");
    let logs_dir = (!logs_dir.is_empty()).then_some(logs_dir.as_str());
    initialize_logging(logs_dir, map_log_level(level), None);
}

fn resolve_threads(config: &Config, threads: Option<usize>) -> usize {
    threads
        .or_else(|| usize::try_from(config.get_int_default("Threads", 0)).ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config);
    init_logging(&config, cli.log_level);

    match cli.command {
        Command::Info(args) => commands::run_info(&args),
        Command::Dump(args) => commands::run_dump(&args),
        Command::Rewrite(args) => commands::run_rewrite(&args),
        Command::FaceAt(args) => commands::run_face_at(&args),
        Command::Path(args) => commands::run_path(&args),
        Command::Transform(args) => commands::run_transform(&args),
        Command::Batch(args) => {
            let threads = resolve_threads(&config, args.threads);
            tracing::info!("Batch: dir='{}' threads={}", args.dir.display(), threads);
            batch::run_batch(&args.dir, threads)
        }
    }
}
