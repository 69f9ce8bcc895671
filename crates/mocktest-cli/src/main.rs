//! mocktest CLI: drives a persisted mock-test attempt from the shell.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mocktest", version, about = "JEE mock-test session driver and scorer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter engine config, test config and answer key
    Init,

    /// Build the question set and report problems without starting a test
    Validate {
        /// Test configuration TOML
        #[arg(long)]
        test_config: PathBuf,

        /// Answer key (two columns: question number, answer)
        #[arg(long)]
        answer_key: Option<PathBuf>,
    },

    /// Start a new attempt
    Start {
        /// Test configuration TOML
        #[arg(long)]
        test_config: PathBuf,

        /// Answer key (two columns: question number, answer)
        #[arg(long)]
        answer_key: Option<PathBuf>,

        /// Discard any existing attempt first
        #[arg(long)]
        force: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Record or clear the answer to a question
    Answer {
        /// Question number as shown in the palette
        #[arg(long)]
        question: u32,

        /// Option letter, comma-separated letters, or a number
        #[arg(
            long,
            allow_hyphen_values = true,
            conflicts_with = "clear",
            required_unless_present = "clear"
        )]
        value: Option<String>,

        /// Remove the response and its review mark
        #[arg(long)]
        clear: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Toggle the review mark on a question
    Review {
        /// Question number as shown in the palette
        #[arg(long)]
        question: u32,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show remaining time and palette counts
    Status {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Submit the attempt and print its results
    Submit {
        /// Where to save the results JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mocktest=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate {
            test_config,
            answer_key,
        } => commands::validate::execute(test_config, answer_key),
        Commands::Start {
            test_config,
            answer_key,
            force,
            config,
        } => commands::start::execute(test_config, answer_key, force, config),
        Commands::Answer {
            question,
            value,
            clear,
            config,
        } => commands::answer::execute(question, value, clear, config),
        Commands::Review { question, config } => commands::review::execute(question, config),
        Commands::Status { config } => commands::status::execute(config),
        Commands::Submit {
            output,
            format,
            config,
        } => commands::submit::execute(output, format, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
