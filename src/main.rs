use clap::Parser;
use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use tracing::{debug, info};

use zerocov::{find_zero_coverage, Config, ExclusionSet, JsonReporter};

/// zerocov - List functions with zero function and condition coverage in a BullseyeCoverage report
#[derive(Parser, Debug)]
#[command(name = "zerocov")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Exclusion file format: one folder or source-file name per line")]
struct Cli {
    /// BullseyeCoverage XML report to read
    report: PathBuf,

    /// JSON file to write the uncovered function paths to
    output: PathBuf,

    /// File listing folder names to exclude, one per line
    exclusions: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    info!("zerocov v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Config::from_default_locations(&cwd)
    }
}

fn run(config: &Config, cli: &Cli) -> Result<()> {
    // Step 1: Exclusions. An unreadable list aborts the run.
    let mut exclusions = ExclusionSet::load(&cli.exclusions)?;
    exclusions.extend(&config.exclude);
    debug!("Excluding {} name(s)", exclusions.len());

    // Step 2: Filter. Failures are logged and leave an empty list.
    info!("Scanning {}", cli.report.display());
    let outcome = find_zero_coverage(&cli.report, &exclusions);
    info!(
        "Found {} uncovered function(s) out of {} ({} subtree(s) pruned)",
        outcome.stats.functions_uncovered,
        outcome.stats.functions_seen,
        outcome.stats.pruned_subtrees
    );

    // Step 3: Report
    let reporter = JsonReporter::new(cli.output.clone()).with_indent(config.report.indent);
    reporter.write(&outcome.paths)?;

    println!(
        "{} Wrote {} result(s) to {}",
        "✓".green(),
        outcome.paths.len(),
        reporter.output_path().display()
    );

    Ok(())
}
