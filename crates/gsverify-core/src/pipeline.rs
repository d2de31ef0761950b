use crate::compare;
use crate::config::Config;
use crate::corpus::{self, ProblemEntry};
use crate::cursor::ResumeCursor;
use crate::eligibility::{self, Ineligible};
use crate::error::{CorpusError, HarnessError};
use crate::exec::{ExecutionResult, Interpreter};
use crate::problem::{resolve, ProblemSource};
use crate::report::{Outcome, Verdict};
use crate::solution::Solution;
use rayon::ThreadPoolBuilder;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

pub type Sink<'s> = dyn FnMut(Outcome) -> io::Result<()> + 's;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemStats {
    pub resolved: bool,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub problems: u64,
    pub skipped: u64,
}

impl RunStats {
    fn absorb(&mut self, stats: ProblemStats) {
        if stats.resolved {
            self.problems += 1;
        }
        self.skipped += stats.skipped;
    }
}

pub struct Harness<'a> {
    config: &'a Config,
    source: &'a dyn ProblemSource,
    interpreter: Interpreter,
}

impl<'a> Harness<'a> {
    pub fn new(config: &'a Config, source: &'a dyn ProblemSource) -> Self {
        Self {
            config,
            source,
            interpreter: Interpreter::from_config(config),
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn problems(
        &self,
        cursor: Option<&ResumeCursor>,
    ) -> Result<Vec<ProblemEntry>, CorpusError> {
        corpus::scan_problems(&self.config.corpus_dir, self.config, cursor)
    }

    pub fn judge(
        &self,
        solution: &Path,
        input: &[u8],
        expected: &[u8],
    ) -> Result<Outcome, HarnessError> {
        let result = self.interpreter.execute(solution, input)?;
        let verdict = match &result {
            ExecutionResult::TimedOut { .. } => Verdict::Slow,
            ExecutionResult::Completed { stdout, .. } if compare::matches(stdout, expected) => {
                Verdict::Pass
            }
            ExecutionResult::Completed {
                exit_code, stderr, ..
            } => {
                tracing::debug!(
                    solution = %solution.display(),
                    exit_code = ?exit_code,
                    stderr = %String::from_utf8_lossy(stderr),
                    "interpreter output mismatch"
                );
                Verdict::Fail
            }
        };
        Ok(Outcome {
            solution: solution.to_path_buf(),
            verdict,
            actual: result.stdout().to_vec(),
            expected: expected.to_vec(),
        })
    }

    pub fn verify_problem(
        &self,
        problem: &ProblemEntry,
        sink: &mut Sink<'_>,
    ) -> Result<ProblemStats, HarnessError> {
        let Some(data) = resolve(self.source, problem) else {
            return Ok(ProblemStats::default());
        };
        let solutions = match corpus::list_solutions(problem) {
            Ok(solutions) => solutions,
            Err(err) => {
                tracing::warn!(problem = %problem.name, "skipping problem: {err}");
                return Ok(ProblemStats::default());
            }
        };
        let input = data.input_bytes();
        let expected = data.expected_bytes();

        let mut stats = ProblemStats {
            resolved: true,
            skipped: 0,
        };
        for path in solutions {
            let solution = match Solution::read(&path) {
                Ok(solution) => solution,
                Err(err) => {
                    tracing::warn!(solution = %path.display(), "read solution: {err}");
                    stats.skipped += 1;
                    continue;
                }
            };
            if let Err(reason) = eligibility::check(&self.config.eligibility, &data, &solution) {
                if let Ineligible::MalformedTimestamp(_) = reason {
                    tracing::warn!(solution = %path.display(), "skipping: {reason}");
                } else {
                    tracing::debug!(solution = %path.display(), "skipping: {reason}");
                }
                stats.skipped += 1;
                continue;
            }
            let outcome = self.judge(&solution.path, &input, &expected)?;
            sink(outcome).map_err(HarnessError::Output)?;
        }
        Ok(stats)
    }

    pub fn run(
        &self,
        problems: &[ProblemEntry],
        sink: &mut Sink<'_>,
    ) -> Result<RunStats, HarnessError> {
        let mut stats = RunStats::default();
        for problem in problems {
            stats.absorb(self.verify_problem(problem, sink)?);
        }
        Ok(stats)
    }

    /// Verifies problems on `jobs` threads. Each problem's outcomes are
    /// buffered until every earlier problem has been handed to `sink`, so the
    /// sink sees the same sequence as a sequential run, as soon as it can.
    pub fn run_parallel(
        &self,
        problems: &[ProblemEntry],
        jobs: usize,
        sink: &mut Sink<'_>,
    ) -> Result<RunStats, HarnessError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|err| HarnessError::Pool(err.to_string()))?;
        let abort = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel();

        pool.in_place_scope(|scope| {
            for (idx, problem) in problems.iter().enumerate() {
                let tx = tx.clone();
                let abort = &abort;
                scope.spawn(move |_| {
                    if abort.load(Ordering::Relaxed) {
                        return;
                    }
                    let mut outcomes = Vec::new();
                    let result = self.verify_problem(problem, &mut |outcome: Outcome| {
                        outcomes.push(outcome);
                        Ok(())
                    });
                    let _ = tx.send((idx, outcomes, result));
                });
            }
            drop(tx);

            let mut stats = RunStats::default();
            let mut pending = BTreeMap::new();
            let mut next = 0;
            for (idx, outcomes, result) in rx {
                pending.insert(idx, (outcomes, result));
                while let Some((outcomes, result)) = pending.remove(&next) {
                    next += 1;
                    if let Err(err) = replay(outcomes, result, &mut stats, sink) {
                        abort.store(true, Ordering::Relaxed);
                        return Err(err);
                    }
                }
            }
            Ok(stats)
        })
    }
}

fn replay(
    outcomes: Vec<Outcome>,
    result: Result<ProblemStats, HarnessError>,
    stats: &mut RunStats,
    sink: &mut Sink<'_>,
) -> Result<(), HarnessError> {
    for outcome in outcomes {
        sink(outcome).map_err(HarnessError::Output)?;
    }
    stats.absorb(result?);
    Ok(())
}
