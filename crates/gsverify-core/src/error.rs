use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus root not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("file name has no timestamp segment: {0}")]
    MissingSegment(String),
    #[error("timestamp segment {segment:?} is not an integer in {name}")]
    NotAnInteger { name: String, segment: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http GET {url}: {message}")]
    Http { url: String, message: String },
    #[error("write {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("spawn interpreter {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("wait for interpreter {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("rayon pool: {0}")]
    Pool(String),
    #[error("write report: {0}")]
    Output(#[source] std::io::Error),
}
