use crate::config::Config;
use crate::error::ExecError;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

// How long the pipes get to reach EOF once the child is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Completed {
        exit_code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    /// The wall-clock limit expired and the child was killed.
    TimedOut { stdout: Vec<u8> },
}

impl ExecutionResult {
    pub fn stdout(&self) -> &[u8] {
        match self {
            ExecutionResult::Completed { stdout, .. } => stdout,
            ExecutionResult::TimedOut { stdout } => stdout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Interpreter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Interpreter {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.interpreter.program.clone(),
            config.interpreter.args.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs `solution` with `input` on stdin under a single wall-clock
    /// deadline. The child is killed when it outlives the deadline, and a run
    /// whose output pipes are still held open by a descendant at the deadline
    /// counts as timed out as well.
    pub fn execute(&self, solution: &Path, input: &[u8]) -> Result<ExecutionResult, ExecError> {
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(solution)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // The child may exit without reading its input; a failed write is expected then.
        let stdin = child.stdin.take();
        let input = input.to_vec();
        thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                let _ = stdin.write_all(&input);
            }
        });
        let stdout = Capture::start(child.stdout.take());
        let stderr = Capture::start(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(status) => status,
            Err(source) => {
                child.kill().ok();
                let _ = child.wait();
                return Err(ExecError::Wait {
                    program: self.program.clone(),
                    source,
                });
            }
        };
        match status {
            Some(status) => {
                let drain_until = deadline.max(Instant::now() + DRAIN_GRACE);
                let (stdout, stdout_closed) = stdout.collect(drain_until);
                let (stderr, stderr_closed) = stderr.collect(drain_until);
                if stdout_closed && stderr_closed {
                    Ok(ExecutionResult::Completed {
                        exit_code: status.code(),
                        stdout,
                        stderr,
                    })
                } else {
                    tracing::debug!(
                        solution = %solution.display(),
                        "interpreter exited but its output is still open at the deadline"
                    );
                    Ok(ExecutionResult::TimedOut { stdout })
                }
            }
            None => {
                child.kill().ok();
                let _ = child.wait();
                let (stdout, _closed) = stdout.collect(Instant::now() + DRAIN_GRACE);
                Ok(ExecutionResult::TimedOut { stdout })
            }
        }
    }
}

/// Reads a pipe on its own thread so the child never blocks on a full buffer.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    closed: mpsc::Receiver<()>,
}

impl Capture {
    fn start<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, closed) = mpsc::channel();
        let sink = Arc::clone(&buf);
        thread::spawn(move || {
            if let Some(mut pipe) = pipe {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => match sink.lock() {
                            Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                            Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..n]),
                        },
                        Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
            }
            let _ = tx.send(());
        });
        Self { buf, closed }
    }

    /// Bytes read so far, and whether the pipe reached EOF before `until`.
    fn collect(self, until: Instant) -> (Vec<u8>, bool) {
        let closed = self
            .closed
            .recv_timeout(until.saturating_duration_since(Instant::now()))
            .is_ok();
        let bytes = match self.buf.lock() {
            Ok(mut buf) => std::mem::take(&mut *buf),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        (bytes, closed)
    }
}
