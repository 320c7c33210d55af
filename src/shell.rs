//! Interactive line-oriented session.
//!
//! Selection commands update flow inputs; `summarize`, `ask`, and `search` dispatch in the
//! background. A renderer task re-projects the whole view every time a result cell changes.
//! All output is funnelled through one writer task so renders and command replies never
//! interleave mid-line.

use crate::{assist::ClosestDocument, orchestrator::Orchestrator, render::render_view};
use std::{path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};

const HELP: &str = "\
Commands:
  summary-file <path>      select the file to summarize
  summarize                summarize the selected file
  context-file <path>      select the file questions are answered from
  question <text>          set the question
  ask                      answer the question
  documents <path>...      read files (or directories) to search
                           (quote paths containing spaces: \"my notes.txt\")
  query <text>             set the search query
  search                   find the closest document
  show                     print the current results
  help                     print this help
  quit                     wait for pending requests and exit";

/// Errors produced while parsing a shell line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    /// Command word was not recognized.
    #[error("unknown command '{0}' (type 'help')")]
    UnknownCommand(String),
    /// Command requires an argument that was not supplied.
    #[error("'{0}' needs a path")]
    MissingPath(&'static str),
    /// A quoted argument was never closed.
    #[error("unterminated quote in '{0}'")]
    UnterminatedQuote(String),
}

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Select the summarization file.
    SummaryFile(PathBuf),
    /// Select the question answering context file.
    ContextFile(PathBuf),
    /// Replace the question text.
    Question(String),
    /// Select the search documents.
    Documents(Vec<PathBuf>),
    /// Replace the search query.
    Query(String),
    /// Dispatch summarization.
    Summarize,
    /// Dispatch question answering.
    Ask,
    /// Dispatch smart search.
    Search,
    /// Print the current view.
    Show,
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
///
/// Free-text arguments keep everything after the single separating space, so leading and
/// trailing whitespace inside a question or query is preserved.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, ShellError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    let line = line.trim_start();
    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line, ""),
    };

    // A single quoted argument is unquoted; otherwise the whole remainder is the path.
    let path = |name: &'static str| {
        let mut args = split_args(rest)?;
        match args.len() {
            0 => Err(ShellError::MissingPath(name)),
            1 => Ok(PathBuf::from(args.remove(0))),
            _ => Ok(PathBuf::from(rest.trim())),
        }
    };

    let command = match word {
        "summary-file" => ShellCommand::SummaryFile(path("summary-file")?),
        "context-file" => ShellCommand::ContextFile(path("context-file")?),
        "question" => ShellCommand::Question(rest.to_string()),
        "documents" => {
            let paths: Vec<PathBuf> = split_args(rest)?.into_iter().map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err(ShellError::MissingPath("documents"));
            }
            ShellCommand::Documents(paths)
        }
        "query" => ShellCommand::Query(rest.to_string()),
        "summarize" => ShellCommand::Summarize,
        "ask" => ShellCommand::Ask,
        "search" => ShellCommand::Search,
        "show" => ShellCommand::Show,
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ShellError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// Split on whitespace, treating `"..."` and `'...'` as single arguments.
fn split_args(input: &str) -> Result<Vec<String>, ShellError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_arg = true;
            }
            None if ch.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(ch);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ShellError::UnterminatedQuote(input.trim().to_string()));
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// Run a session reading commands from `input` and writing renders to `output`.
///
/// Returns the writer once input is exhausted (or `quit` is read) and every in-flight request
/// has completed and been rendered.
pub async fn run_shell<R, W>(
    orchestrator: Arc<Orchestrator>,
    input: R,
    output: W,
) -> std::io::Result<W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(rx, output));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let receivers = ResultReceivers {
        summary: orchestrator.summarize.result().subscribe(),
        answer: orchestrator.answer.result().subscribe(),
        closest: orchestrator.search.result().subscribe(),
    };
    let renderer = tokio::spawn(render_on_change(
        Arc::clone(&orchestrator),
        receivers,
        tx.clone(),
        shutdown_rx,
    ));

    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                let _ = tx.send(error.to_string());
                continue;
            }
        };

        match command {
            ShellCommand::SummaryFile(path) => orchestrator.summarize.select_file(&path).await,
            ShellCommand::ContextFile(path) => orchestrator.answer.select_file(&path).await,
            ShellCommand::Question(text) => orchestrator.answer.set_question(text),
            ShellCommand::Documents(paths) => orchestrator.search.select_documents(&paths).await,
            ShellCommand::Query(text) => orchestrator.search.set_query(text),
            ShellCommand::Summarize => in_flight.push(orchestrator.spawn_summarize()),
            ShellCommand::Ask => in_flight.push(orchestrator.spawn_ask()),
            ShellCommand::Search => in_flight.push(orchestrator.spawn_search()),
            ShellCommand::Show => {
                let _ = tx.send(render_view(&orchestrator.view()));
            }
            ShellCommand::Help => {
                let _ = tx.send(HELP.to_string());
            }
            ShellCommand::Quit => break,
        }
        in_flight.retain(|handle| !handle.is_finished());
    }

    if !in_flight.is_empty() {
        tracing::info!(pending = in_flight.len(), "Waiting for in-flight requests");
    }
    for handle in in_flight {
        if let Err(error) = handle.await {
            tracing::error!(%error, "Dispatch task failed");
        }
    }

    let _ = shutdown_tx.send(());
    if let Err(error) = renderer.await {
        tracing::error!(%error, "Renderer task failed");
    }
    drop(tx);

    writer.await.map_err(std::io::Error::other)?
}

struct ResultReceivers {
    summary: watch::Receiver<Option<String>>,
    answer: watch::Receiver<Option<String>>,
    closest: watch::Receiver<Option<ClosestDocument>>,
}

async fn render_on_change(
    orchestrator: Arc<Orchestrator>,
    receivers: ResultReceivers,
    tx: mpsc::UnboundedSender<String>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let ResultReceivers {
        mut summary,
        mut answer,
        mut closest,
    } = receivers;

    loop {
        // Pending changes win over shutdown so the final results always render.
        let changed = tokio::select! {
            biased;
            changed = summary.changed() => changed,
            changed = answer.changed() => changed,
            changed = closest.changed() => changed,
            _ = &mut shutdown => break,
        };
        if changed.is_err() {
            break;
        }
        drop(summary.borrow_and_update());
        drop(answer.borrow_and_update());
        drop(closest.borrow_and_update());

        let view = render_view(&orchestrator.view());
        if !view.is_empty() && tx.send(view).is_err() {
            break;
        }
    }
}

async fn write_lines<W>(mut rx: mpsc::UnboundedReceiver<String>, mut output: W) -> std::io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(text) = rx.recv().await {
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::testing::FakeAssist;
    use std::fs;

    #[test]
    fn parses_free_text_verbatim() {
        assert_eq!(
            parse_command("question  who? ").expect("parse"),
            Some(ShellCommand::Question(" who? ".into()))
        );
        assert_eq!(
            parse_command("query").expect("parse"),
            Some(ShellCommand::Query(String::new()))
        );
    }

    #[test]
    fn parses_document_lists() {
        assert_eq!(
            parse_command("documents a.txt  b.txt").expect("parse"),
            Some(ShellCommand::Documents(vec!["a.txt".into(), "b.txt".into()]))
        );
    }

    #[test]
    fn quoted_paths_keep_their_spaces() {
        assert_eq!(
            parse_command(r#"documents "my notes.txt" 'old drafts' plain.txt"#).expect("parse"),
            Some(ShellCommand::Documents(vec![
                "my notes.txt".into(),
                "old drafts".into(),
                "plain.txt".into(),
            ]))
        );
        assert_eq!(
            parse_command(r#"summary-file "my notes.txt""#).expect("parse"),
            Some(ShellCommand::SummaryFile("my notes.txt".into()))
        );
        assert_eq!(
            parse_command("context-file my notes.txt").expect("parse"),
            Some(ShellCommand::ContextFile("my notes.txt".into()))
        );
        assert_eq!(
            parse_command(r#"documents "open.txt"#),
            Err(ShellError::UnterminatedQuote(r#""open.txt"#.into()))
        );
    }

    #[tokio::test]
    async fn session_reads_documents_with_spaces_in_their_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spaced = dir.path().join("my notes.txt");
        fs::write(&spaced, "alpha").expect("write");

        let orchestrator = Arc::new(Orchestrator::new(
            Arc::new(FakeAssist::default()),
            vec!["txt".into()],
        ));
        let script = format!("documents \"{}\"\n", spaced.display());
        run_shell(Arc::clone(&orchestrator), script.as_bytes(), Vec::new())
            .await
            .expect("session");

        assert_eq!(
            orchestrator.search.documents().get().as_slice(),
            ["alpha".to_string()]
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command("   \r\n").expect("parse"), None);
    }

    #[test]
    fn rejects_unknown_and_incomplete_commands() {
        assert_eq!(
            parse_command("frobnicate"),
            Err(ShellError::UnknownCommand("frobnicate".into()))
        );
        assert_eq!(
            parse_command("summary-file   "),
            Err(ShellError::MissingPath("summary-file"))
        );
    }

    #[tokio::test]
    async fn session_renders_results_as_they_arrive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let alpha = dir.path().join("alpha.txt");
        let beta = dir.path().join("beta.txt");
        fs::write(&alpha, "alpha").expect("write");
        fs::write(&beta, "beta").expect("write");

        let fake = Arc::new(FakeAssist {
            closest: Some(ClosestDocument {
                document: "alpha".into(),
                similarity: 0.9,
            }),
            ..FakeAssist::default()
        });
        let orchestrator = Arc::new(Orchestrator::new(fake, vec!["txt".into()]));
        let script = format!(
            "documents {} {}\nquery a\nsearch\nquit\n",
            alpha.display(),
            beta.display()
        );

        let output = run_shell(orchestrator, script.as_bytes(), Vec::new())
            .await
            .expect("session");
        let text = String::from_utf8(output).expect("utf8");

        assert!(text.contains("Closest Document:\nalpha\nSimilarity: 0.9"));
    }

    #[tokio::test]
    async fn session_reports_bad_commands_and_failures_stay_silent() {
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::new(FakeAssist::failing()),
            vec!["txt".into()],
        ));
        let script = "bogus\nsearch\nshow\n";

        let output = run_shell(orchestrator, script.as_bytes(), Vec::new())
            .await
            .expect("session");
        let text = String::from_utf8(output).expect("utf8");

        assert!(text.contains("unknown command 'bogus'"));
        assert!(!text.contains("Closest Document:"));
    }
}
