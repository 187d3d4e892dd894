use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use tablechat::config::LlmConfig;
use tablechat::dataset::TABLE_NAME;
use tablechat::ingest;
use tablechat::llm::GeminiClient;
use tablechat::pipeline::Pipeline;
use tablechat::render;

/// Ask questions about tabular data in plain English
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// CSV file to load
    file: PathBuf,

    /// Ask a single question and exit instead of starting the prompt loop
    #[arg(long)]
    question: Option<String>,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = LlmConfig::load().unwrap_or_default();
    if let Some(model) = cli.model {
        config.model = model;
    }

    // Resolve the API key once: GEMINI_API_KEY env var, then interactive prompt
    if config.api_key.is_empty() {
        config.api_key = match std::env::var("GEMINI_API_KEY") {
            Ok(key) => key,
            Err(_) => rpassword::read_password_from_tty(Some("Gemini API key: "))?,
        };
    }

    let dataset = ingest::read_csv(&cli.file)?;
    println!("Preview of {}:", cli.file.display());
    println!("{}", render::table(&dataset.columns, &dataset.rows, 2));

    let client = Arc::new(GeminiClient::new(&config)?);
    let mut pipeline = Pipeline::new(client, config.explain_row_limit)?;
    pipeline.load(&dataset)?;
    println!(
        "Loaded {} rows into table {:?}.\n",
        dataset.rows.len(),
        TABLE_NAME
    );

    match cli.question {
        Some(question) => ask(&pipeline, &question).await,
        None => prompt_loop(&pipeline).await,
    }

    Ok(())
}

async fn ask(pipeline: &Pipeline, question: &str) {
    match pipeline.answer(question).await {
        Ok(answer) => {
            println!("Generated SQL:\n  {}\n", answer.sql);
            if answer.result.is_empty() {
                println!("Query returned no rows.\n");
            } else {
                println!("{}", render::result_table(&answer.result, 100));
            }
            println!("{}\n", answer.explanation);
        }
        Err(err) => eprintln!("Error: {err}\n"),
    }
}

async fn prompt_loop(pipeline: &Pipeline) {
    let stdin = io::stdin();
    loop {
        print!("ask> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        ask(pipeline, question).await;
    }
}
