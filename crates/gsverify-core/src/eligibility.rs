use crate::config::EligibilityConfig;
use crate::error::TimestampError;
use crate::problem::ProblemData;
use crate::solution::Solution;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligible {
    NoExpectedOutput,
    EmptySolution,
    MalformedTimestamp(TimestampError),
    BeforeMinDate(i64),
    CarveOut { author_prefix: String },
    NotText,
    ContainsNul,
    RejectedPattern(String),
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligible::NoExpectedOutput => write!(f, "problem has no expected output"),
            Ineligible::EmptySolution => write!(f, "solution is empty"),
            Ineligible::MalformedTimestamp(err) => write!(f, "{err}"),
            Ineligible::BeforeMinDate(ts) => write!(f, "timestamp {ts} is before the minimum date"),
            Ineligible::CarveOut { author_prefix } => {
                write!(f, "inside the excluded window for {author_prefix:?}")
            }
            Ineligible::NotText => write!(f, "solution is not valid utf-8"),
            Ineligible::ContainsNul => write!(f, "solution contains a NUL byte"),
            Ineligible::RejectedPattern(pattern) => write!(f, "solution contains {pattern:?}"),
        }
    }
}

/// Runs every eligibility rule in order and reports the first one that fails.
///
/// All rules except the text-decoding rule inspect the raw bytes.
pub fn check(
    config: &EligibilityConfig,
    problem: &ProblemData,
    solution: &Solution,
) -> Result<(), Ineligible> {
    if !problem.is_judgeable() {
        return Err(Ineligible::NoExpectedOutput);
    }
    if solution.is_empty() {
        return Err(Ineligible::EmptySolution);
    }

    let timestamp = solution
        .timestamp()
        .map_err(Ineligible::MalformedTimestamp)?;
    if timestamp < config.min_date.timestamp() {
        return Err(Ineligible::BeforeMinDate(timestamp));
    }
    if let Some(carve_out) = config
        .carve_outs
        .iter()
        .find(|carve_out| carve_out.covers(&solution.file_name, timestamp))
    {
        return Err(Ineligible::CarveOut {
            author_prefix: carve_out.author_prefix.clone(),
        });
    }

    if std::str::from_utf8(&solution.bytes).is_err() {
        return Err(Ineligible::NotText);
    }
    if solution.bytes.contains(&0) {
        return Err(Ineligible::ContainsNul);
    }
    for pattern in &config.rejected_patterns {
        if contains_subslice(&solution.bytes, pattern.as_bytes()) {
            return Err(Ineligible::RejectedPattern(pattern.clone()));
        }
    }
    Ok(())
}

pub fn is_eligible(
    config: &EligibilityConfig,
    problem: &ProblemData,
    solution: &Solution,
) -> bool {
    check(config, problem, solution).is_ok()
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}
