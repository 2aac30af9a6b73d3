//! tabchat - ask natural-language questions over a spreadsheet.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tabchat::cli::Cli;
use tabchat::config::Config;
use tabchat::error::{ChatError, Result};
use tabchat::frame::load::load_table;
use tabchat::llm::{
    LlmClient, LlmProvider, MockLlmClient, OllamaClient, OllamaConfig, SamplingOptions,
};
use tabchat::render::render_result;
use tabchat::session::{Outcome, Session};

#[tokio::main]
async fn main() {
    // Logs go to stderr; default to warnings so they stay out of the REPL.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_from_file(&config_path)?;

    // CLI flags override the config file.
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    if let Some(url) = cli.url {
        config.llm.base_url = url;
    }
    if let Some(provider) = cli.llm {
        config.llm.provider = provider;
    }

    // Dataset absence is terminal; the loop is never reached without one.
    let dataset = load_table(&cli.data_file)?;
    info!(
        rows = dataset.n_rows(),
        cols = dataset.n_cols(),
        "Dataset loaded"
    );
    println!(
        "Loaded {} rows from {}",
        dataset.n_rows(),
        cli.data_file.display()
    );
    println!("Columns: {}\n", dataset.column_names().join(", "));

    let provider: LlmProvider = config.llm.provider.parse().map_err(ChatError::config)?;
    let client: Box<dyn LlmClient> = match provider {
        LlmProvider::Ollama => Box::new(OllamaClient::new(
            OllamaConfig::new(config.llm.model.clone())
                .with_url(config.llm.base_url.clone())
                .with_timeout(config.llm.timeout_secs),
        )?),
        LlmProvider::Mock => Box::new(MockLlmClient::new()),
    };

    let session = Session::new(
        Some(Arc::new(dataset)),
        client,
        SamplingOptions::default(),
    );

    if let Some(question) = cli.question {
        answer(&session, &question).await;
        return Ok(());
    }

    print_banner();

    // Interruption ends the session like a quit command would.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nGoodbye!");
            std::process::exit(0);
        }
    });

    let stdin = io::stdin();
    loop {
        print!("Ask a question: ");
        io::stdout()
            .flush()
            .map_err(|e| ChatError::internal(format!("Failed to flush stdout: {e}")))?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| ChatError::internal(format!("Failed to read input: {e}")))?;
        if read == 0 {
            break; // EOF
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        answer(&session, question).await;
        println!();
    }

    println!("Goodbye!");
    Ok(())
}

/// Runs one question through the session and prints the outcome.
async fn answer(session: &Session, question: &str) {
    println!("\nQuestion: {question}\n");
    println!("Generating query...");

    match session.ask(question).await {
        Outcome::Answer { result, program } => {
            println!("Generated program:\n{program}\n");
            println!("Results:\n");
            println!("{}", render_result(&result));
        }
        Outcome::Failure { stage, reason } => {
            println!("[{stage}] {reason}");
        }
    }
}

fn print_banner() {
    println!("Example questions you can ask:");
    println!("  - What's the total Net Amount by Department?");
    println!("  - Show me the first 10 rows");
    println!("  - How many patients per doctor?");
    println!("  - Show rows with Net Amount greater than 500");
    println!();
    println!("Type 'quit' to exit\n");
}
