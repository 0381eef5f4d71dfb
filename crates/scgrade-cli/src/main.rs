//! scgrade CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "scgrade",
    version,
    about = "Single-choice question grading with distractors"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example question
    Init,

    /// Validate question TOML files
    Validate {
        /// Path to question file or directory
        #[arg(long)]
        question: PathBuf,
    },

    /// Start an attempt and print its display order
    Start {
        /// Path to question file
        #[arg(long)]
        question: PathBuf,

        /// Seed for the shuffle
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Grade the tries of one attempt
    Grade {
        /// Path to question file
        #[arg(long)]
        question: PathBuf,

        /// JSON file holding an array of responses, one per try
        #[arg(long)]
        responses: Option<PathBuf>,

        /// A single try as field pairs (e.g. "option2=1,distractor0=1"), repeatable
        #[arg(long = "response")]
        inline_responses: Vec<String>,

        /// Persisted order; a new one is created if absent
        #[arg(long)]
        order: Option<String>,

        /// Seed for a new order
        #[arg(long)]
        seed: Option<u64>,

        /// Save the report as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade many attempts concurrently
    Batch {
        /// Path to question file
        #[arg(long)]
        question: PathBuf,

        /// JSON file holding an array of jobs
        #[arg(long)]
        jobs: PathBuf,

        /// Max concurrent attempts (defaults to the config value)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Response statistics for one question
    Stats {
        /// Path to question file
        #[arg(long)]
        question: PathBuf,

        /// JSON file holding an array of responses
        #[arg(long)]
        responses: PathBuf,

        /// Display order the responses were given under
        #[arg(long)]
        order: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available scoring methods
    ListMethods,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scgrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { question } => commands::validate::execute(question),
        Commands::Start { question, seed } => commands::start::execute(question, seed),
        Commands::Grade {
            question,
            responses,
            inline_responses,
            order,
            seed,
            output,
            format,
            config,
        } => commands::grade::execute(commands::grade::GradeArgs {
            question,
            responses,
            inline_responses,
            order,
            seed,
            output,
            format,
            config,
        }),
        Commands::Batch {
            question,
            jobs,
            parallelism,
            format,
            config,
        } => commands::batch::execute(question, jobs, parallelism, format, config).await,
        Commands::Stats {
            question,
            responses,
            order,
            format,
            config,
        } => commands::stats::execute(question, responses, order, format, config),
        Commands::ListMethods => commands::list_methods::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
