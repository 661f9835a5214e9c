//! Study task command handlers.
//!
//! Each invocation builds one service for one anonymous session: notes
//! given via `--notes` are indexed in-process before the task runs, so
//! retrieval grounding works within a single command.

use std::io::Write;

use anyhow::{Context, Result};
use console::style;
use futures::StreamExt;
use tracing::debug;
use uuid::Uuid;

use studybuddy_core::embedding::create_embedder;
use studybuddy_core::llm::create_chat_client;
use studybuddy_core::models::Quiz;
use studybuddy_core::prompts::{Difficulty, TaskType};
use studybuddy_core::rag::{RagService, SessionRegistry, DEFAULT_TOP_K};
use studybuddy_core::{AppConfig, Provider, StudyBuddyError, StudyService};

use super::TaskArgs;

struct TaskContext {
    service: StudyService,
    session_id: String,
    difficulty: Difficulty,
    topic: String,
    top_k: usize,
}

fn friendly(err: StudyBuddyError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

/// Build the service from environment and flags, indexing notes if given
async fn prepare(args: TaskArgs) -> Result<TaskContext> {
    let mut config = AppConfig::from_env();
    if let Some(p) = args.provider.as_deref() {
        config.provider = p.parse::<Provider>().map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    let provider = config.provider;

    let embedder = create_embedder(provider, &config).map_err(friendly)?;
    let chat = create_chat_client(provider, &config).map_err(friendly)?;
    eprintln!(
        "Using provider: {} (model: {})",
        provider,
        chat.model_name()
    );

    let rag = RagService::new(SessionRegistry::new(), embedder);
    let service = StudyService::new(rag, chat);
    let session_id = Uuid::new_v4().to_string();

    if let Some(path) = args.notes {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read notes file: {}", path.display()))?;
        let count = service
            .index_notes(&session_id, &text)
            .await
            .map_err(friendly)?;
        eprintln!(
            "{} Indexed {count} chunk(s) from {}",
            style("✓").green(),
            path.display()
        );
    }

    let difficulty = match args.difficulty.as_deref() {
        Some(d) => d.parse::<Difficulty>().map_err(|e| anyhow::anyhow!("{e}"))?,
        None => Difficulty::default(),
    };

    Ok(TaskContext {
        service,
        session_id,
        difficulty,
        topic: args.topic,
        top_k: args.top_k.unwrap_or(DEFAULT_TOP_K),
    })
}

/// Stream an explain or summarize response to stdout
pub async fn run_prose(task: TaskType, args: TaskArgs) -> Result<()> {
    let ctx = prepare(args).await?;
    let mut stream = ctx
        .service
        .stream_task(&ctx.session_id, task, ctx.difficulty, &ctx.topic, ctx.top_k)
        .await
        .map_err(friendly)?;

    let mut out = std::io::stdout();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment.map_err(|e| anyhow::anyhow!(e.user_message()))?;
        out.write_all(fragment.as_bytes())?;
        out.flush()?;
    }
    println!();
    Ok(())
}

pub async fn run_quiz(args: TaskArgs, take: bool) -> Result<()> {
    let ctx = prepare(args).await?;
    eprintln!("Generating quiz...");
    let quiz = ctx
        .service
        .generate_quiz(&ctx.session_id, &ctx.topic, ctx.difficulty, ctx.top_k)
        .await
        .map_err(friendly)?;
    debug!(questions = quiz.questions.len(), "quiz generated");

    if take {
        take_quiz(&quiz)
    } else {
        print_quiz_with_answers(&quiz);
        Ok(())
    }
}

pub async fn run_flashcards(args: TaskArgs) -> Result<()> {
    let ctx = prepare(args).await?;
    eprintln!("Generating flashcards...");
    let deck = ctx
        .service
        .generate_flashcards(&ctx.session_id, &ctx.topic, ctx.difficulty, ctx.top_k)
        .await
        .map_err(friendly)?;

    for (i, card) in deck.flashcards.iter().enumerate() {
        println!();
        println!(
            "{} {}",
            style(format!("Card {}:", i + 1)).bold().cyan(),
            style(&card.question).bold()
        );
        println!("  {}", card.answer);
    }
    Ok(())
}

fn option_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

fn print_question(number: usize, total: usize, question: &studybuddy_core::models::QuizQuestion) {
    println!();
    println!(
        "{} {}",
        style(format!("Question {number} of {total}:")).bold().cyan(),
        style(&question.question).bold()
    );
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", option_letter(i), option);
    }
}

fn print_quiz_with_answers(quiz: &Quiz) {
    let total = quiz.questions.len();
    for (i, question) in quiz.questions.iter().enumerate() {
        print_question(i + 1, total, question);
    }

    println!();
    println!("{}", style("Answer key:").bold());
    for (i, question) in quiz.questions.iter().enumerate() {
        let letter = question
            .options
            .iter()
            .position(|o| o == &question.answer)
            .map(option_letter)
            .unwrap_or('?');
        println!("  {}. {} ({})", i + 1, letter, question.answer);
    }
}

/// Ask each question on the terminal and score the answers
fn take_quiz(quiz: &Quiz) -> Result<()> {
    let term = console::Term::stdout();
    let total = quiz.questions.len();
    let mut answers = Vec::with_capacity(total);

    for (i, question) in quiz.questions.iter().enumerate() {
        print_question(i + 1, total, question);

        let chosen = loop {
            print!("Your answer [A-{}]: ", option_letter(question.options.len() - 1));
            std::io::stdout().flush()?;
            let line = term.read_line()?;
            let letter = line.trim().to_uppercase();
            let index = letter
                .chars()
                .next()
                .and_then(|c| (c as usize).checked_sub('A' as usize));
            match index.and_then(|i| question.options.get(i)) {
                Some(option) if letter.len() == 1 => break option.clone(),
                _ => println!("{}", style("Please enter a single letter option.").yellow()),
            }
        };
        answers.push(chosen);
    }

    let score = quiz.score(&answers);
    println!();
    println!(
        "{} You scored {score} out of {total}.",
        if score == total {
            style("★").green()
        } else {
            style("•").cyan()
        }
    );

    for (i, (question, given)) in quiz.questions.iter().zip(&answers).enumerate() {
        if !question.is_correct(given) {
            println!(
                "  {}. {} {}",
                i + 1,
                style("correct answer:").dim(),
                question.answer
            );
        }
    }
    Ok(())
}
