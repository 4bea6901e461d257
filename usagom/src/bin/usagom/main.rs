mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::init::{InitArgs, handle_init};
use commands::schema::{SchemaCommands, handle_schema_commands};
use output::{Output, OutputFormat, Tone};

/// Inspect field usages and validate records against model schemas.
#[derive(Parser)]
#[command(name = "usagom", version, about)]
#[command(after_long_help = "RUST_LOG overrides the log filter, e.g. RUST_LOG=usagom=trace.")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Only print failures
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log how each usage is resolved
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write .usagom/config.toml and create the schemas directory
    #[command(after_long_help = commands::init::EXAMPLES)]
    Init(InitArgs),

    /// Inspect and validate model schemas
    #[command(subcommand, after_long_help = commands::schema::EXAMPLES)]
    Schema(SchemaCommands),
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "usagom=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn run(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init(args) => handle_init(args, output),
        Commands::Schema(command) => handle_schema_commands(command, output),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = Output::new(cli.output, cli.quiet, !cli.no_color);
    if let Err(err) = run(cli.command, &output) {
        output.status(Tone::Fail, &format!("{err:#}"));
        std::process::exit(1);
    }
}
