use crate::config::Config;
use crate::cursor::ResumeCursor;
use crate::error::CorpusError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemEntry {
    pub name: String,
    pub dir: PathBuf,
    pub solutions_dir: PathBuf,
    pub metadata_path: PathBuf,
}

/// Problem directories under `root`, sorted by name, with denylisted entries,
/// entries before `cursor`, non-directories and directories lacking a
/// solutions subdirectory left out.
pub fn scan_problems(
    root: &Path,
    config: &Config,
    cursor: Option<&ResumeCursor>,
) -> Result<Vec<ProblemEntry>, CorpusError> {
    if !root.is_dir() {
        return Err(CorpusError::Missing(root.to_path_buf()));
    }
    let io_err = |source| CorpusError::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut named = Vec::new();
    for entry in fs::read_dir(root).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %entry.path().display(), "skipping non-utf8 problem name");
            continue;
        };
        named.push((name, entry.path()));
    }
    named.sort_by(|a, b| a.0.cmp(&b.0));

    let mut problems = Vec::new();
    for (name, dir) in named {
        if config.exclude.excludes(&name) {
            continue;
        }
        if let Some(cursor) = cursor {
            if !cursor.admits(&name) {
                continue;
            }
        }
        if !dir.is_dir() {
            continue;
        }
        let solutions_dir = dir.join(&config.solutions_subdir);
        if !solutions_dir.is_dir() {
            continue;
        }
        let metadata_path = dir.join(&config.metadata_file);
        problems.push(ProblemEntry {
            name,
            dir,
            solutions_dir,
            metadata_path,
        });
    }
    Ok(problems)
}

/// Regular files in the problem's solutions directory, sorted by file name.
pub fn list_solutions(problem: &ProblemEntry) -> Result<Vec<PathBuf>, CorpusError> {
    let io_err = |source| CorpusError::Io {
        path: problem.solutions_dir.clone(),
        source,
    };
    let mut solutions = Vec::new();
    for entry in fs::read_dir(&problem.solutions_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        solutions.push(entry.path());
    }
    solutions.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(solutions)
}
