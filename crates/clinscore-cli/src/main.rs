//! clinscore CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "clinscore", version, about = "Clinical risk-score calculators")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one input record with a calculator
    Score {
        /// Calculator id (e.g. alvarado, air, apache-ii, bmi)
        calculator: String,

        /// Input record as inline JSON
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,

        /// Read the input record from a JSON file
        #[arg(long)]
        input_file: Option<PathBuf>,

        /// Input policy: strict or lenient
        #[arg(long)]
        policy: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score every case in a case set
    Run {
        /// Path to .toml case set or directory
        #[arg(long)]
        cases: PathBuf,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long)]
        format: Option<String>,

        /// Filter by tags (comma-separated)
        #[arg(long)]
        filter: Option<String>,

        /// Input policy: strict or lenient
        #[arg(long)]
        policy: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate case set TOML files
    Validate {
        /// Path to case set file or directory
        #[arg(long)]
        cases: PathBuf,

        /// Input policy to validate against
        #[arg(long, default_value = "strict")]
        policy: String,
    },

    /// Compare two score reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Minimum band-rank increase counted as an escalation
        #[arg(long)]
        threshold: Option<u8>,

        /// Exit code 1 if any case escalated or newly fails
        #[arg(long)]
        fail_on_escalation: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available calculators
    List {
        /// Filter to one clinical category
        #[arg(long)]
        category: Option<String>,
    },

    /// Create starter config and example case set
    Init,
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "clinscore=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            calculator,
            input,
            input_file,
            policy,
            json,
            config,
        } => commands::score::execute(calculator, input, input_file, policy, json, config),
        Commands::Run {
            cases,
            output,
            format,
            filter,
            policy,
            config,
        } => commands::run::execute(cases, output, format, filter, policy, config),
        Commands::Validate { cases, policy } => commands::validate::execute(cases, policy),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_escalation,
            format,
            config,
        } => commands::compare::execute(
            baseline,
            current,
            threshold,
            fail_on_escalation,
            format,
            config,
        ),
        Commands::List { category } => commands::list::execute(category),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
