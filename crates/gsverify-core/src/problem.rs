use crate::corpus::ProblemEntry;
use crate::error::FetchError;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProblemData {
    pub input: String,
    pub output: String,
}

#[derive(Deserialize)]
struct RawProblem {
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

impl ProblemData {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw: RawProblem = serde_json::from_slice(bytes).ok()?;
        Some(Self {
            input: raw.input.unwrap_or_default(),
            output: raw.output.unwrap_or_default(),
        })
    }

    pub fn is_judgeable(&self) -> bool {
        !self.output.is_empty()
    }

    pub fn input_bytes(&self) -> Vec<u8> {
        crlf_to_lf(self.input.as_bytes())
    }

    pub fn expected_bytes(&self) -> Vec<u8> {
        crlf_to_lf(self.output.as_bytes())
    }
}

fn crlf_to_lf(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}

pub trait ProblemSource: Sync {
    fn fetch(&self, problem: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpProblemSource {
    base_url: String,
}

impl HttpProblemSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, problem: &str) -> String {
        format!("{}{}", self.base_url, problem.replace(' ', "+"))
    }
}

impl ProblemSource for HttpProblemSource {
    fn fetch(&self, problem: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(problem);
        let http_err = |message: String| FetchError::Http {
            url: url.clone(),
            message,
        };
        let resp = ureq::get(url.as_str())
            .call()
            .map_err(|err| http_err(err.to_string()))?;
        let mut reader = resp.into_body().into_reader();
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|err| http_err(format!("read response: {err}")))?;
        Ok(buf)
    }
}

/// Cached metadata bytes, or `None` when no cache file exists yet.
pub fn load_cached(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Fetches the problem's metadata and writes the response verbatim to the cache.
pub fn fetch_and_store(
    source: &dyn ProblemSource,
    problem: &ProblemEntry,
) -> Result<Vec<u8>, FetchError> {
    tracing::info!(problem = %problem.name, "Fetching {}", problem.name);
    let bytes = source.fetch(&problem.name)?;
    fs::write(&problem.metadata_path, &bytes).map_err(|source| FetchError::Store {
        path: problem.metadata_path.clone(),
        source,
    })?;
    Ok(bytes)
}

/// Loads a problem's expected input and output, fetching them on first use.
///
/// Every failure is reported and mapped to `None`: the caller skips the
/// problem without touching the run totals.
pub fn resolve(source: &dyn ProblemSource, problem: &ProblemEntry) -> Option<ProblemData> {
    let bytes = match load_cached(&problem.metadata_path) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => match fetch_and_store(source, problem) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(problem = %problem.name, "metadata fetch failed: {err}");
                return None;
            }
        },
        Err(err) => {
            tracing::warn!(
                path = %problem.metadata_path.display(),
                "read cached metadata: {err}"
            );
            return None;
        }
    };
    let data = ProblemData::parse(&bytes);
    if data.is_none() {
        tracing::warn!(problem = %problem.name, "cached metadata is not valid json, skipping");
    }
    data
}
