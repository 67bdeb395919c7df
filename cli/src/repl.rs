//! Interactive loop: read a question per line, answer it, repeat until EOF or quit.

use std::io::Write;

use ragroute::Router;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::run::{ask, CliError, RunOptions};

fn is_quit_command(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    matches!(lower.as_str(), "quit" | "exit" | "/quit")
}

/// Runs the loop over `input`, writing answers to `out`.
///
/// Blank lines are skipped. A failed question is reported on stderr and the loop
/// continues with the next line.
pub async fn run_repl_loop<R, W>(
    router: &dyn Router,
    opts: &RunOptions,
    input: R,
    out: &mut W,
) -> Result<usize, CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut answered = 0;
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let line = match lines.next_line().await? {
            None => break,
            Some(s) if s.trim().is_empty() => continue,
            Some(s) if is_quit_command(&s) => break,
            Some(s) => s,
        };
        match ask(router, line.trim(), opts).await {
            Ok(rendered) => {
                writeln!(out, "{}", rendered)?;
                answered += 1;
            }
            Err(e) => eprintln!("error: {}", e),
        }
    }
    writeln!(out, "Bye.")?;
    Ok(answered)
}
