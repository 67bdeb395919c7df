//! Logging setup for the `ragroute` binary: logs go to a file or nowhere, never to stdout.
//!
//! - **RUST_LOG**: filter, e.g. `info` or `ragroute=debug`. Default: [`DEFAULT_FILTER`].
//! - **LOG_FILE**: when set, events are appended there as plain text; when unset they
//!   are dropped so stdout carries only answers.

use std::io::Write;
use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::log_format::SpanTaggedText;

pub const DEFAULT_FILTER: &str = "info,hyper_util=off,reqwest=warn";

/// Installs the global subscriber from `RUST_LOG` and `LOG_FILE`.
pub fn init() -> Result<(), std::io::Error> {
    let log_file = std::env::var_os("LOG_FILE");
    init_with(log_file.as_deref().map(Path::new))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_with(log_file: Option<&Path>) -> Result<(), std::io::Error> {
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let writer = std::sync::Mutex::new(StripAnsiWriter::new(file));
            let layer = tracing_subscriber::fmt::layer()
                .event_format(SpanTaggedText::new())
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            tracing_subscriber::registry().with(layer).init();
            tracing::info!(path = %path.display(), "ragroute logging to file");
        }
        None => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter());
            tracing_subscriber::registry().with(layer).init();
        }
    }
    Ok(())
}

/// Drops ANSI CSI sequences (`ESC [ params final`) so file logs stay plain text.
/// A lone ESC not followed by `[` is written through unchanged.
struct StripAnsiWriter<W> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> StripAnsiWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(16),
        }
    }

    fn flush_pending(&mut self) -> std::io::Result<()> {
        self.inner.write_all(&self.pending)?;
        self.pending.clear();
        Ok(())
    }
}

const ESC: u8 = 0x1b;
const MAX_SEQUENCE: usize = 64;

impl<W: Write> Write for StripAnsiWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut rest = buf;
        while let Some((&b, tail)) = rest.split_first() {
            match self.pending.len() {
                0 => match rest.iter().position(|&c| c == ESC) {
                    Some(i) => {
                        self.inner.write_all(&rest[..i])?;
                        self.pending.push(ESC);
                        rest = &rest[i + 1..];
                        continue;
                    }
                    None => {
                        self.inner.write_all(rest)?;
                        break;
                    }
                },
                1 => {
                    self.pending.push(b);
                    if b != b'[' {
                        self.flush_pending()?;
                    }
                }
                _ => {
                    if (0x40..=0x7e).contains(&b) {
                        self.pending.clear();
                    } else if b.is_ascii_digit() || matches!(b, b';' | b'?' | b':') {
                        self.pending.push(b);
                        if self.pending.len() > MAX_SEQUENCE {
                            self.flush_pending()?;
                        }
                    } else {
                        self.pending.push(b);
                        self.flush_pending()?;
                    }
                }
            }
            rest = tail;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            self.flush_pending()?;
        }
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(chunks: &[&[u8]]) -> String {
        let mut w = StripAnsiWriter::new(Vec::new());
        for c in chunks {
            w.write_all(c).unwrap();
        }
        w.flush().unwrap();
        String::from_utf8(w.inner).unwrap()
    }

    #[test]
    fn strip_removes_color_codes() {
        assert_eq!(strip(&[b"\x1b[32mINFO\x1b[0m done"]), "INFO done");
        assert_eq!(strip(&[b"\x1b[1;31mERR\x1b[0m"]), "ERR");
    }

    /// **Scenario**: A sequence split across two writes is still removed.
    #[test]
    fn strip_handles_sequence_split_across_writes() {
        assert_eq!(strip(&[b"a\x1b", b"[3", b"3mb"]), "ab");
    }

    #[test]
    fn strip_keeps_plain_text_and_lone_escape() {
        assert_eq!(strip(&[b"route=web answer=ok"]), "route=web answer=ok");
        assert_eq!(strip(&[b"x\x1bZy"]), "x\x1bZy");
    }

    #[test]
    fn strip_flushes_unterminated_sequence() {
        assert_eq!(strip(&[b"tail\x1b[12"]), "tail\x1b[12");
    }
}
