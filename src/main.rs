use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyassist::{
    assist::HttpAssistClient, config, logging, orchestrator::Orchestrator, render, shell,
};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(
    name = "rusty-assist",
    version,
    about = "Summarize, question, and search text files through a remote model service"
)]
struct Cli {
    /// Override `ASSIST_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize one file.
    Summarize { file: PathBuf },
    /// Answer a question from one file.
    Ask {
        file: PathBuf,
        #[arg(long, short, default_value = "")]
        question: String,
    },
    /// Find the document closest to a query.
    Search {
        #[arg(long, short, default_value = "")]
        query: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Interactive session with background requests.
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::load_config().context("failed to load configuration")?;
    logging::init_tracing();
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }

    let client = HttpAssistClient::new(&config.api_url).context("failed to build HTTP client")?;
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(client),
        config.accepted_extensions.clone(),
    ));

    match cli.command {
        Command::Summarize { file } => {
            orchestrator.summarize.select_file(&file).await;
            orchestrator.summarize.summarize().await;
        }
        Command::Ask { file, question } => {
            orchestrator.answer.select_file(&file).await;
            orchestrator.answer.set_question(question);
            orchestrator.answer.ask().await;
        }
        Command::Search { query, paths } => {
            orchestrator.search.select_documents(&paths).await;
            orchestrator.search.set_query(query);
            orchestrator.search.search().await;
        }
        Command::Shell => {
            tracing::info!(api_url = %config.api_url, "Starting interactive session");
            shell::run_shell(Arc::clone(&orchestrator), tokio::io::stdin(), tokio::io::stdout())
                .await
                .context("interactive session failed")?;
            return Ok(());
        }
    }

    let view = render::render_view(&orchestrator.view());
    if !view.is_empty() {
        println!("{view}");
    }
    Ok(())
}
