pub mod compare;
pub mod config;
pub mod corpus;
pub mod cursor;
pub mod eligibility;
pub mod error;
pub mod exec;
pub mod pipeline;
pub mod problem;
pub mod report;
pub mod solution;

pub use compare::{matches, normalize};
pub use config::{CarveOut, Config, EligibilityConfig, ExcludeConfig, InterpreterConfig};
pub use corpus::{list_solutions, scan_problems, ProblemEntry};
pub use cursor::ResumeCursor;
pub use eligibility::{is_eligible, Ineligible};
pub use error::{
    ConfigError, CorpusError, ExecError, FetchError, HarnessError, TimestampError,
};
pub use exec::{ExecutionResult, Interpreter};
pub use pipeline::{Harness, ProblemStats, RunStats, Sink};
pub use problem::{
    fetch_and_store, load_cached, resolve, HttpProblemSource, ProblemData, ProblemSource,
};
pub use report::{Outcome, Reporter, Totals, Verdict};
pub use solution::{parse_timestamp, Solution};
