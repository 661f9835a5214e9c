pub mod providers;
pub mod task;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use studybuddy_core::prompts::TaskType;

#[derive(Parser)]
#[command(name = "studybuddy", author, version, about = "AI study assistant: explanations, summaries, quizzes, and flashcards", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every study task
#[derive(Args)]
pub struct TaskArgs {
    /// The topic or pasted text to study
    pub topic: String,

    /// Notes file to index; responses are grounded in its content
    #[arg(short, long)]
    pub notes: Option<PathBuf>,

    /// Target difficulty: beginner, intermediate, advanced
    #[arg(short, long)]
    pub difficulty: Option<String>,

    /// Provider to use: openai, gemini (defaults to STUDYBUDDY_PROVIDER or gemini)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Chat model override (provider default applies otherwise)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Number of note chunks retrieved as context
    #[arg(long)]
    pub top_k: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Explain a topic clearly and thoroughly
    ///
    /// Examples:
    ///   studybuddy explain "photosynthesis"
    ///   studybuddy explain "the krebs cycle" --notes biology.txt -d beginner
    Explain {
        #[command(flatten)]
        args: TaskArgs,
    },

    /// Summarize a topic or pasted text concisely
    Summarize {
        #[command(flatten)]
        args: TaskArgs,
    },

    /// Generate a five-question multiple-choice quiz
    ///
    /// Examples:
    ///   studybuddy quiz "ww2 history"            # print quiz with answer key
    ///   studybuddy quiz "ww2 history" --take     # answer interactively and get a score
    Quiz {
        #[command(flatten)]
        args: TaskArgs,

        /// Answer the questions interactively and get a score
        #[arg(long)]
        take: bool,
    },

    /// Generate ten study flashcards
    Flashcards {
        #[command(flatten)]
        args: TaskArgs,
    },

    /// List providers and their configuration status
    Providers,
}

pub async fn run_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Explain { args } => task::run_prose(TaskType::Explain, args).await,
        Commands::Summarize { args } => task::run_prose(TaskType::Summarize, args).await,
        Commands::Quiz { args, take } => task::run_quiz(args, take).await,
        Commands::Flashcards { args } => task::run_flashcards(args).await,
        Commands::Providers => providers::handle_list(),
    }
}
