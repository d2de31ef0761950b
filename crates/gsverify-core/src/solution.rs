use crate::error::TimestampError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Solution {
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn author(&self) -> &str {
        self.file_name
            .split_once('.')
            .map(|(author, _)| author)
            .unwrap_or(&self.file_name)
    }

    pub fn timestamp(&self) -> Result<i64, TimestampError> {
        parse_timestamp(&self.file_name)
    }
}

/// Submission time encoded as the second-to-last dot-separated segment of a
/// solution file name, e.g. `name.1230000000.gs`.
pub fn parse_timestamp(file_name: &str) -> Result<i64, TimestampError> {
    let mut segments = file_name.rsplit('.');
    let _extension = segments.next();
    let Some(segment) = segments.next() else {
        return Err(TimestampError::MissingSegment(file_name.to_string()));
    };
    segment
        .parse::<i64>()
        .map_err(|_| TimestampError::NotAnInteger {
            name: file_name.to_string(),
            segment: segment.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_second_to_last_segment() {
        assert_eq!(parse_timestamp("solver.1230000000.gs"), Ok(1230000000));
        assert_eq!(parse_timestamp("a.b.1300000000.gs"), Ok(1300000000));
    }

    #[test]
    fn timestamp_errors_are_explicit() {
        assert_eq!(
            parse_timestamp("solver"),
            Err(TimestampError::MissingSegment("solver".to_string()))
        );
        assert!(matches!(
            parse_timestamp("solver.abc.gs"),
            Err(TimestampError::NotAnInteger { .. })
        ));
    }

    #[test]
    fn author_is_text_before_first_dot() {
        let solution = Solution {
            path: PathBuf::from("lynn.1531576304.gs"),
            file_name: "lynn.1531576304.gs".to_string(),
            bytes: b"1".to_vec(),
        };
        assert_eq!(solution.author(), "lynn");
    }
}
