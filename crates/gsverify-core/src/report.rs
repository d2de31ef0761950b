use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;

const EXCERPT_LEN: usize = 100;
// Cursor up one line, then clear it.
const OVERWRITE_PREVIOUS: &str = "\x1b[1A\x1b[2K";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Slow,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Slow => "SLOW",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub solution: PathBuf,
    pub verdict: Verdict,
    pub actual: Vec<u8>,
    pub expected: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub passes: u64,
    /// Includes `slow`.
    pub fails: u64,
    pub slow: u64,
}

impl Totals {
    pub fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pass => self.passes += 1,
            Verdict::Fail => self.fails += 1,
            Verdict::Slow => {
                self.fails += 1;
                self.slow += 1;
            }
        }
    }

    pub fn summary_line(&self) -> String {
        format!("{} passes, {} fails", self.passes, self.fails)
    }
}

/// Prints one status line per outcome and keeps the run totals.
///
/// In compact mode a PASS directly after another PASS replaces the previous
/// line in place; FAIL and SLOW always start a fresh line.
pub struct Reporter<W: Write> {
    out: W,
    compact: bool,
    last_was_pass: bool,
    totals: Totals,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, compact: bool) -> Self {
        Self {
            out,
            compact,
            last_was_pass: false,
            totals: Totals::default(),
        }
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn record(&mut self, outcome: &Outcome) -> io::Result<()> {
        self.totals.add(outcome.verdict);
        let label = match outcome.verdict {
            Verdict::Pass => outcome.verdict.as_str().green(),
            Verdict::Fail => outcome.verdict.as_str().red(),
            Verdict::Slow => outcome.verdict.as_str().yellow(),
        };
        if outcome.verdict.is_pass() {
            if self.compact && self.last_was_pass {
                write!(self.out, "{OVERWRITE_PREVIOUS}")?;
            }
            writeln!(self.out, "{} {}", label, outcome.solution.display())?;
            self.last_was_pass = true;
        } else {
            writeln!(self.out, "{} {}", label, outcome.solution.display())?;
            writeln!(
                self.out,
                "  actual={} expected={}",
                excerpt(&outcome.actual),
                excerpt(&outcome.expected)
            )?;
            self.last_was_pass = false;
        }
        self.out.flush()
    }

    pub fn finish(mut self) -> io::Result<Totals> {
        writeln!(self.out, "{}", self.totals.summary_line())?;
        self.out.flush()?;
        Ok(self.totals)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn excerpt(bytes: &[u8]) -> String {
    let end = bytes.len().min(EXCERPT_LEN);
    format!("\"{}\"", bytes[..end].escape_ascii())
}
