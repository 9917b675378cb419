use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wikiquiz::config::{Args, Command, LOG_ENV};
use wikiquiz::{HistoryEntry, HistoryResolver, HttpQuizService, QuizId, QuizRecord, SessionController, client};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("wikiquiz error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_file = args.is_interactive().then(|| args.log_path());
    init_tracing(log_file.as_deref())?;

    let service = Arc::new(
        HttpQuizService::new(&args.api_url, args.timeout())
            .context("failed to create quiz service client")?,
    );

    match args.command.clone().unwrap_or(Command::Play) {
        Command::Play => client::run(service, args.api_url, args.notify).await,
        Command::Generate { url, json } => {
            let mut session = SessionController::new();
            session.generate(service.as_ref(), &url).await?;
            if let Some(record) = session.record() {
                print_record(record, json)?;
            }
            Ok(())
        }
        Command::History => {
            let entries = HistoryResolver::new(service).list_all().await?;
            print_history(&entries);
            Ok(())
        }
        Command::Show { id, json } => {
            let record = HistoryResolver::new(service)
                .resolve_for_view(None, Some(QuizId::new(id)))
                .await?;
            print_record(&record, json)
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // The interactive client owns the terminal, so its logs go to a file.
    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn print_record(record: &QuizRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("#{}  {}", record.id, record.title);
    println!("{}", record.source_url);
    if !record.summary.is_empty() {
        println!("\n{}", record.summary);
    }
    if !record.key_entities.is_empty() {
        println!("\nKey entities: {}", record.key_entities.join(", "));
    }
    if !record.related_topics.is_empty() {
        println!("Related topics: {}", record.related_topics.join(", "));
    }

    for (index, question) in record.questions.iter().enumerate() {
        println!("\n{}. {} [{}]", index + 1, question.prompt, question.difficulty);
        for (label, option) in ('A'..='Z').zip(&question.options) {
            println!("   {label}. {option}");
        }
    }

    Ok(())
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No quizzes yet");
        return;
    }

    for entry in entries {
        let date = entry
            .date_generated
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:>6}  {:<16}  {}  {}", entry.id.as_str(), date, entry.title, entry.source_url);
    }
}
