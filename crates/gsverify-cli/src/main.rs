use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use gsverify_core::{
    Config, CorpusError, Harness, HttpProblemSource, Outcome, Reporter, ResumeCursor,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const CORPUS_URL: &str =
    "https://drive.google.com/file/d/1kvFxYh2fo3bHfVj1OKKLX8YzuxswHvYg/view?usp=sharing";

#[derive(Parser)]
#[command(name = "gsverify")]
#[command(version)]
struct Cli {
    /// Skip problems whose name sorts before this one.
    resume_from: Option<String>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    corpus: Option<PathBuf>,

    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Overwrite consecutive PASS lines in place.
    #[arg(long)]
    compact: bool,

    #[arg(long, default_value_t = 1)]
    jobs: usize,

    #[arg(long)]
    list: bool,

    #[arg(long)]
    summary_json: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunSummary {
    schema_version: String,
    tool: ToolInfo,
    invocation: Invocation,
    started_at: String,
    finished_at: String,
    duration_ms: u64,
    problems: u64,
    passes: u64,
    fails: u64,
    slow: u64,
    skipped: u64,
    failures: Vec<FailureInfo>,
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct Invocation {
    resume_from: Option<String>,
    corpus: String,
    interpreter: String,
    timeout_ms: u64,
    jobs: usize,
    compact: bool,
}

#[derive(Serialize)]
struct FailureInfo {
    solution: String,
    verdict: String,
    sha256: String,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("tool error: {err:#}");
            2
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    if cli.jobs == 0 {
        anyhow::bail!("--jobs must be >= 1");
    }
    let config = load_config(&cli)?;
    let cursor = cli.resume_from.as_deref().map(ResumeCursor::new);
    let source = HttpProblemSource::new(config.metadata_url.clone());
    let harness = Harness::new(&config, &source);

    let problems = match harness.problems(cursor.as_ref()) {
        Ok(problems) => problems,
        Err(CorpusError::Missing(root)) => {
            println!(
                "Download {CORPUS_URL} and extract it to a directory named '{}' in this folder.",
                root.display()
            );
            return Ok(1);
        }
        Err(err) => return Err(err).context("scan corpus"),
    };

    if cli.list {
        for problem in &problems {
            println!("{}", problem.name);
        }
        return Ok(0);
    }

    let started_at = Utc::now();
    let timer = Instant::now();

    let mut reporter = Reporter::new(io::stdout().lock(), cli.compact);
    let mut failures = Vec::new();
    let mut sink = |outcome: Outcome| {
        if !outcome.verdict.is_pass() {
            failures.push(FailureInfo {
                solution: outcome.solution.to_string_lossy().to_string(),
                verdict: outcome.verdict.as_str().to_string(),
                sha256: compute_sha256(&outcome.solution).unwrap_or_else(|err| {
                    tracing::warn!("hash solution: {err}");
                    "UNKNOWN".to_string()
                }),
            });
        }
        reporter.record(&outcome)
    };
    let stats = if cli.jobs == 1 {
        harness.run(&problems, &mut sink)
    } else {
        harness.run_parallel(&problems, cli.jobs, &mut sink)
    }
    .context("verify corpus")?;
    let totals = reporter.finish().context("write totals")?;

    if let Some(path) = &cli.summary_json {
        let finished_at = Utc::now();
        let summary = RunSummary {
            schema_version: "0.1".to_string(),
            tool: ToolInfo {
                name: "gsverify".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            invocation: Invocation {
                resume_from: cli.resume_from.clone(),
                corpus: config.corpus_dir.to_string_lossy().to_string(),
                interpreter: config.interpreter.program.clone(),
                timeout_ms: config.timeout_ms,
                jobs: cli.jobs,
                compact: cli.compact,
            },
            started_at: started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            finished_at: finished_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            duration_ms: timer.elapsed().as_millis() as u64,
            problems: stats.problems,
            passes: totals.passes,
            fails: totals.fails,
            slow: totals.slow,
            skipped: stats.skipped,
            failures,
        };
        let payload = serde_json::to_string_pretty(&summary).context("serialize summary json")?;
        write_atomic(path, payload.as_bytes())?;
    }

    Ok(0)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("load {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(corpus) = &cli.corpus {
        config.corpus_dir = corpus.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn compute_sha256(path: &Path) -> Result<String, String> {
    let data = fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents).with_context(|| format!("write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("rename {}", path.display()))?;
    Ok(())
}
