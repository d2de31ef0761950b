use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const EXCLUDED_PROBLEMS: &[&str] = &[
    // luck or self-reference
    "123",
    "123 Reloaded",
    "Error",
    "Inverse Quine",
    "Not Quine",
    "Palindromic Quine",
    "Quine",
    "Timeout",
    // float / rational behaviour differs across interpreter hosts
    "area of triangle",
    "0_5 broken keyboard",
    "Cancel fractions",
    "Equal Temperament",
    "MIDI note number to frequency",
    "Numloop",
];

// The corpus dump collapsed these case-insensitively, mixing wrong answers in.
const EXCLUDED_PROBLEMS_CASELESS: &[&str] =
    &["helloworld", "christmas tree", "multiplication table"];

// 2008-01-01T00:00:00Z
const MIN_DATE_SECS: i64 = 1_199_145_600;

const REJECTED_PATTERNS: &[&str] = &["../s/", "rand", "#{"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub corpus_dir: PathBuf,
    pub solutions_subdir: String,
    pub metadata_file: String,
    pub metadata_url: String,
    pub interpreter: InterpreterConfig,
    pub timeout_ms: u64,
    pub exclude: ExcludeConfig,
    pub eligibility: EligibilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcludeConfig {
    pub problems: Vec<String>,
    pub problems_case_insensitive: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EligibilityConfig {
    pub min_date: DateTime<Utc>,
    pub carve_outs: Vec<CarveOut>,
    pub rejected_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarveOut {
    pub author_prefix: String,
    pub center: i64,
    pub radius_secs: i64,
}

impl CarveOut {
    pub fn covers(&self, file_name: &str, timestamp: i64) -> bool {
        file_name.starts_with(&self.author_prefix)
            && self.center.saturating_sub(self.radius_secs) < timestamp
            && timestamp < self.center.saturating_add(self.radius_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("problems"),
            solutions_subdir: "gs".to_string(),
            metadata_file: "problem.json".to_string(),
            metadata_url: "http://golf.shinh.org/jsonp.rb?".to_string(),
            interpreter: InterpreterConfig::default(),
            timeout_ms: 5000,
            exclude: ExcludeConfig::default(),
            eligibility: EligibilityConfig::default(),
        }
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            program: "ruby".to_string(),
            args: vec![
                "--encoding".to_string(),
                "ASCII-8BIT".to_string(),
                "golfscript.rb".to_string(),
            ],
        }
    }
}

impl Default for ExcludeConfig {
    fn default() -> Self {
        Self {
            problems: to_strings(EXCLUDED_PROBLEMS),
            problems_case_insensitive: to_strings(EXCLUDED_PROBLEMS_CASELESS),
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_date: DateTime::from_timestamp(MIN_DATE_SECS, 0).unwrap_or_default(),
            carve_outs: vec![CarveOut {
                author_prefix: "lynn".to_string(),
                center: 1_531_576_304,
                radius_secs: 10_000,
            }],
            rejected_patterns: to_strings(REJECTED_PATTERNS),
        }
    }
}

impl ExcludeConfig {
    pub fn excludes(&self, problem: &str) -> bool {
        if self.problems.iter().any(|name| name == problem) {
            return true;
        }
        let lowered = problem.to_lowercase();
        self.problems_case_insensitive
            .iter()
            .any(|name| name.to_lowercase() == lowered)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be >= 1".to_string()));
        }
        if self.solutions_subdir.is_empty() {
            return Err(ConfigError::Invalid(
                "solutions_subdir must not be empty".to_string(),
            ));
        }
        if self.metadata_file.is_empty() {
            return Err(ConfigError::Invalid(
                "metadata_file must not be empty".to_string(),
            ));
        }
        if self.interpreter.program.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter.program must not be empty".to_string(),
            ));
        }
        if let Some(idx) = self
            .eligibility
            .rejected_patterns
            .iter()
            .position(|pattern| pattern.is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "eligibility.rejected_patterns[{idx}] is empty"
            )));
        }
        for carve_out in &self.eligibility.carve_outs {
            if carve_out.radius_secs < 0 {
                return Err(ConfigError::Invalid(format!(
                    "carve-out for {:?} has a negative radius",
                    carve_out.author_prefix
                )));
            }
            let start = carve_out.center.checked_sub(carve_out.radius_secs);
            let end = carve_out.center.checked_add(carve_out.radius_secs);
            if start.is_none() || end.is_none() {
                return Err(ConfigError::Invalid(format!(
                    "carve-out window for {:?} overflows a unix timestamp",
                    carve_out.author_prefix
                )));
            }
        }
        Ok(())
    }

    pub fn min_timestamp(&self) -> i64 {
        self.eligibility.min_date.timestamp()
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
