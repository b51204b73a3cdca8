use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

use crate::assistant::Assistant;
use crate::model_gateway::ModelGateway;

const EXIT_KEYWORD: &str = "quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction<'a> {
    Quit,
    Skip,
    Query(&'a str),
}

pub fn classify_line(line: &str) -> LineAction<'_> {
    let prompt = line.trim();
    if prompt.eq_ignore_ascii_case(EXIT_KEYWORD) {
        LineAction::Quit
    } else if prompt.is_empty() {
        LineAction::Skip
    } else {
        LineAction::Query(prompt)
    }
}

pub fn write_outcome<W: Write, E: std::fmt::Display>(
    output: &mut W,
    outcome: &std::result::Result<String, E>,
) -> io::Result<()> {
    match outcome {
        Ok(answer) => writeln!(output, "Assistant: {answer}"),
        Err(err) => writeln!(output, "请求失败: {err}"),
    }
}

pub async fn run_repl<G: ModelGateway>(assistant: &Assistant<G>) -> Result<()> {
    info!(model = %assistant.model(), "starting interactive loop");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_loop(assistant, stdin.lock(), &mut stdout).await
}

/// Reads queries line by line until `quit` or end of input.
///
/// A failed query is reported and the loop keeps going; only I/O failures
/// on the console itself end it early.
pub async fn run_loop<G, R, W>(assistant: &Assistant<G>, mut input: R, output: &mut W) -> Result<()>
where
    G: ModelGateway,
    R: BufRead,
    W: Write,
{
    write!(output, "Type your queries or '{EXIT_KEYWORD}' to exit.")
        .context("Failed to write to stdout")?;

    loop {
        write!(output, "\nUser: ").context("Failed to write to stdout")?;
        output.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read stdin")?;
        if read == 0 {
            info!("input closed");
            break;
        }

        let prompt = match classify_line(&line) {
            LineAction::Quit => break,
            LineAction::Skip => continue,
            LineAction::Query(prompt) => prompt,
        };

        let outcome = assistant.process_query(prompt).await;
        if let Err(err) = &outcome {
            warn!(error = %err, "query failed");
        }
        write_outcome(output, &outcome).context("Failed to write to stdout")?;
    }

    writeln!(output).context("Failed to write to stdout")?;
    Ok(())
}
