use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use refnorm_core::{Config, Mode, RunOutcome, DEFAULT_FILE};

/// refnorm: deduplicate and numerically sort color references
///
/// Rewrites every "references" list under "colors" in a palette JSON file.
#[derive(Parser)]
#[command(name = "refnorm", version, about, long_about = None)]
struct Cli {
    /// Path to the palette JSON file
    #[arg(default_value = DEFAULT_FILE)]
    file: PathBuf,

    /// Write the result here instead of overwriting FILE
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only check; exit 1 if the file is not already normalized
    #[arg(long)]
    check: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress output on success
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        let mode = if self.check { Mode::Check } else { Mode::Write };
        let config = Config::new(&self.file).with_mode(mode);
        match &self.output {
            Some(out) => config.with_output(out),
            None => config,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match refnorm_core::run(&cli.config()) {
        Ok(outcome) => report(&cli, &outcome),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            2
        }
    };

    process::exit(exit_code);
}

fn report(cli: &Cli, outcome: &RunOutcome) -> i32 {
    let code = if cli.check && outcome.changed { 1 } else { 0 };

    if cli.json {
        match serde_json::to_string_pretty(outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                return 2;
            }
        }
        return code;
    }

    if cli.check {
        if outcome.changed {
            eprintln!(
                "{} {} is not normalized",
                "✗".red().bold(),
                outcome.input.display()
            );
        } else if !cli.quiet {
            println!(
                "{} {} is normalized",
                "✓".green().bold(),
                outcome.input.display()
            );
        }
        return code;
    }

    if !cli.quiet {
        println!("Removed duplicates and sorted 'references' numerically for every color.");
    }
    code
}
