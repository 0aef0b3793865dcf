//! Interactive evaluation loop.
//!
//! The rules and the validated client are set up once by the caller; every
//! request error is reported and the loop goes back to awaiting input.

use crate::config::OutputFormat;
use crate::error::{IcpError, Result};
use crate::input::InputManager;
use crate::llm::{Evaluator, GenerativeModel};
use crate::output::progress::with_spinner;
use crate::output::{EvaluationResult, ReportGenerator};
use crate::processing::EvaluationInputs;
use log::{debug, warn};
use std::future::Future;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::watch;

const END_OF_BLOCK: &str = ".";

/// Exit status of a process ended by Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub evaluated: usize,
    pub failed: usize,
}

/// Counts Ctrl-C presses and hands them to whoever is waiting.
pub struct Interrupts {
    presses: watch::Receiver<u64>,
}

impl Interrupts {
    /// Installs the process-wide Ctrl-C listener. Once every `Interrupts`
    /// fed by it is dropped, the next Ctrl-C exits the process.
    pub fn ctrl_c() -> Self {
        let (trigger, interrupts) = Self::channel();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if trigger.is_closed() {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
                debug!("Ctrl-C received");
                trigger.send_modify(|presses| *presses += 1);
            }
        });
        interrupts
    }

    /// Interrupts fed by hand through the returned sender.
    pub fn channel() -> (watch::Sender<u64>, Self) {
        let (trigger, presses) = watch::channel(0);
        (trigger, Self { presses })
    }

    /// Resolves on the next press not yet seen. Never resolves once the
    /// sender is gone.
    pub async fn next(&mut self) {
        if self.presses.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Runs `future` until it finishes or Ctrl-C is pressed.
    pub async fn cancellable<T, F>(&mut self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            result = future => result,
            _ = self.next() => {
                warn!("Evaluation cancelled by user");
                Err(IcpError::Cancelled)
            }
        }
    }
}

enum Line {
    Text(String),
    Eof,
    Interrupted,
}

enum Block {
    Text(String),
    Eof,
    Quit,
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit")
}

async fn next_line<R>(lines: &mut Lines<R>, interrupts: &mut Interrupts) -> Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        biased;
        line = lines.next_line() => Ok(line?.map_or(Line::Eof, Line::Text)),
        _ = interrupts.next() => Ok(Line::Interrupted),
    }
}

/// Reads lines until a lone `.` or EOF. `quit`/`exit` on the first line or
/// Ctrl-C yields [`Block::Quit`]; EOF before any line yields [`Block::Eof`].
async fn read_block<R>(lines: &mut Lines<R>, interrupts: &mut Interrupts) -> Result<Block>
where
    R: AsyncBufRead + Unpin,
{
    let mut collected: Vec<String> = Vec::new();
    let mut first = true;

    loop {
        match next_line(lines, interrupts).await? {
            Line::Interrupted => return Ok(Block::Quit),
            Line::Eof if first => return Ok(Block::Eof),
            Line::Eof => break,
            Line::Text(line) if first && is_quit(&line) => return Ok(Block::Quit),
            Line::Text(line) if line.trim() == END_OF_BLOCK => break,
            Line::Text(line) => collected.push(line),
        }
        first = false;
    }

    Ok(Block::Text(collected.join("\n")))
}

pub async fn run_session<M, R, W>(
    evaluator: &Evaluator<M>,
    reader: R,
    writer: &mut W,
    format: OutputFormat,
    use_colors: bool,
    mut interrupts: Interrupts,
) -> Result<SessionSummary>
where
    M: GenerativeModel,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    let inputs = InputManager::new();
    let generator = ReportGenerator::new(use_colors);
    let mut summary = SessionSummary::default();

    writeln!(
        writer,
        "ICP fit session ({} rules, model {}). Type 'quit' or press Ctrl-C to leave.",
        evaluator.rules().len(),
        evaluator.model_name()
    )?;

    loop {
        writeln!(
            writer,
            "\nJob description (finish with a line containing only '.'):"
        )?;
        let job_description = match read_block(&mut lines, &mut interrupts).await? {
            Block::Text(text) => text,
            Block::Eof | Block::Quit => break,
        };

        writeln!(writer, "Candidate about text (finish with '.'; '.' alone to skip):")?;
        let about_text = match read_block(&mut lines, &mut interrupts).await? {
            Block::Text(text) => text,
            Block::Eof => String::new(),
            Block::Quit => break,
        };

        writeln!(writer, "Resume file path (.txt/.pdf; blank to skip):")?;
        let resume_path = match next_line(&mut lines, &mut interrupts).await? {
            Line::Text(line) if is_quit(&line) => break,
            Line::Text(line) => Some(line.trim().to_string()).filter(|l| !l.is_empty()),
            Line::Eof => None,
            Line::Interrupted => break,
        };

        let outcome: Result<EvaluationResult> = async {
            let resume_document = inputs
                .load_optional(resume_path.as_deref().map(Path::new))
                .await?;

            let request = EvaluationInputs {
                job_description_text: Some(job_description),
                about_text: Some(about_text),
                resume_document,
                ..Default::default()
            }
            .into_request()?;

            with_spinner(
                "Analyzing candidate fit...",
                interrupts.cancellable(evaluator.evaluate(&request)),
            )
            .await
        }
        .await;

        match outcome {
            Ok(result) => {
                summary.evaluated += 1;
                writeln!(writer, "{}", generator.generate(format, &result)?)?;
            }
            Err(e) if e.is_recoverable() => {
                summary.failed += 1;
                writeln!(writer, "❌ {}", e)?;
            }
            Err(e) => return Err(e),
        }
    }

    writeln!(
        writer,
        "Session finished: {} evaluated, {} failed.",
        summary.evaluated, summary.failed
    )?;
    Ok(summary)
}
