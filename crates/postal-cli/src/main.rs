//! # postal CLI entry point
//!
//! Parses command-line arguments, loads the territory database, and
//! dispatches to subcommand handlers.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use postal_cli::address::{run_address, AddressArgs};
use postal_cli::dataset::load_resolver;
use postal_cli::territory::{
    run_aliases, run_attachment, run_children, run_country, run_default_subdivision,
    run_normalize, run_parents, ChildrenArgs, CodeArgs, NormalizeArgs, ParentsArgs,
};

/// ISO 3166 territory codes and postal addresses.
///
/// Normalizes country and subdivision codes, walks the containment
/// hierarchy, and validates structured postal addresses.
#[derive(Parser, Debug)]
#[command(name = "postal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Territory dataset document (JSON or YAML) to use instead of the
    /// bundled ISO 3166 data.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize a territory code to its canonical form.
    Normalize(NormalizeArgs),

    /// Country a dependent territory is politically attached to.
    Attachment(CodeArgs),

    /// Country a subdivision belongs to.
    Country(CodeArgs),

    /// Guess the subdivision standing for a country.
    DefaultSubdivision(CodeArgs),

    /// All subdivisions below a territory.
    Children(ChildrenArgs),

    /// Containment chain from a territory up to its country.
    Parents(ParentsArgs),

    /// Country codes equivalent to a territory.
    Aliases(CodeArgs),

    /// Normalize, validate, and render a postal address.
    Address(AddressArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<u8> {
    let resolver = load_resolver(cli.database.as_deref())?;
    match &cli.command {
        Commands::Normalize(args) => run_normalize(args, &resolver, out),
        Commands::Attachment(args) => run_attachment(args, &resolver, out),
        Commands::Country(args) => run_country(args, &resolver, out),
        Commands::DefaultSubdivision(args) => run_default_subdivision(args, &resolver, out),
        Commands::Children(args) => run_children(args, &resolver, out),
        Commands::Parents(args) => run_parents(args, &resolver, out),
        Commands::Aliases(args) => run_aliases(args, &resolver, out),
        Commands::Address(args) => run_address(args, &resolver, out),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&cli, &mut out) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
