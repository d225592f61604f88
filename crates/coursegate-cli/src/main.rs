//! coursegate CLI — quiz authoring checks, grading and learner progress.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "coursegate",
    version,
    about = "Assessment and progression engine for online courses"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check quiz files before they are saved or published
    Validate {
        /// Path to a quiz file or a directory of quizzes
        #[arg(long)]
        quiz: PathBuf,

        /// Accept work in progress (quizzes without questions yet)
        #[arg(long)]
        draft: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Grade an answer sheet against a quiz
    Grade {
        /// Quiz file (.toml or .json)
        #[arg(long)]
        quiz: PathBuf,

        /// Answers JSON file
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show a learner's progress through a course
    Progress {
        /// Course structure file (.json or .toml)
        #[arg(long)]
        course: PathBuf,

        /// Attempt log JSON file
        #[arg(long)]
        attempts: PathBuf,

        /// Learner id
        #[arg(long)]
        learner: u64,

        /// Lessons the learner has opened (comma-separated ids)
        #[arg(long)]
        viewed: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Resolve the display order of sibling items
    Order {
        /// JSON file with a list of {"order", "id"} entries
        #[arg(long)]
        siblings: PathBuf,
    },

    /// Create a starter config, quiz and course
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursegate=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Validate {
            quiz,
            draft,
            format,
        } => commands::validate::execute(quiz, draft, format, config),
        Commands::Grade {
            quiz,
            answers,
            format,
        } => commands::grade::execute(quiz, answers, format, config),
        Commands::Progress {
            course,
            attempts,
            learner,
            viewed,
            format,
        } => commands::progress::execute(course, attempts, learner, viewed, format, config).await,
        Commands::Order { siblings } => commands::order::execute(siblings),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
