use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::dataset_error::DatasetError;

/// Loads a timestamps file: one numeric value per line, parsed as a float
/// and truncated toward zero.
///
/// A missing file is not an error: it is logged and yields an empty
/// sequence, which callers treat as "no external timestamps". Blank lines
/// are skipped; any other unparsable line aborts the load.
pub fn read_timestamps(path: &Path) -> Result<Vec<i64>, DatasetError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Timestamps file not found: {}", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(DatasetError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut timestamps = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let value = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| DatasetError::MalformedTimestamp {
                path: path.to_path_buf(),
                line: i + 1,
                content: token.to_string(),
            })?;
        timestamps.push(value.trunc() as i64);
    }

    log::debug!("Loaded {} timestamps from {}", timestamps.len(), path.display());
    Ok(timestamps)
}

/// An externally supplied timestamp sequence read front to back.
///
/// Every read yields the `(current, next)` pair, so `n` reads need `n + 1`
/// entries. The cursor only moves forward.
#[derive(Clone, Debug, PartialEq)]
pub struct TimestampSequence {
    values: Vec<i64>,
    cursor: usize,
}

impl TimestampSequence {
    pub fn new(values: Vec<i64>) -> Self {
        Self { values, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of pairs consumed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The `(values[i], values[i + 1])` pair, if both exist.
    pub fn pair_at(&self, i: usize) -> Result<(i64, i64), DatasetError> {
        match (self.values.get(i), self.values.get(i + 1)) {
            (Some(&current), Some(&next)) => Ok((current, next)),
            _ => Err(DatasetError::TimestampsExhausted {
                consumed: i,
                available: self.values.len(),
            }),
        }
    }

    /// Returns the pair under the cursor and moves past it.
    ///
    /// The cursor does not move when the sequence is exhausted.
    pub fn advance(&mut self) -> Result<(i64, i64), DatasetError> {
        let pair = self.pair_at(self.cursor)?;
        self.cursor += 1;
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    fn write_file(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("times.txt");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_reads_one_value_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "100\n200\n300\n");
        assert_eq!(read_timestamps(&path).unwrap(), vec![100, 200, 300]);
    }

    #[test]
    fn test_fractional_values_truncate_toward_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "1.9\n2.5e3\n-3.7\n1403636579763555584\n");
        assert_eq!(
            read_timestamps(&path).unwrap(),
            vec![1, 2500, -3, 1403636579763555584]
        );
    }

    #[test]
    fn test_missing_file_yields_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_timestamps(&dir.path().join("absent.txt")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_blank_lines_and_whitespace_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "  10 \n\n20\r\n   \n30");
        assert_eq!(read_timestamps(&path).unwrap(), vec![10, 20, 30]);
    }

    #[rstest]
    #[case::text("10\nabc\n30\n", 2)]
    #[case::two_tokens("10 20\n", 1)]
    #[case::not_a_number("1\n2\nNaN\n", 3)]
    fn test_malformed_line_aborts(#[case] contents: &str, #[case] expected_line: usize) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), contents);
        match read_timestamps(&path) {
            Err(DatasetError::MalformedTimestamp { line, .. }) => assert_eq!(line, expected_line),
            other => panic!("expected malformed timestamp error, got {other:?}"),
        }
    }

    #[test]
    fn test_sequence_yields_consecutive_pairs() {
        let mut seq = TimestampSequence::new(vec![100, 200, 300]);
        assert_eq!(seq.advance().unwrap(), (100, 200));
        assert_eq!(seq.advance().unwrap(), (200, 300));
        assert_eq!(seq.cursor(), 2);
    }

    #[test]
    fn test_sequence_exhaustion_is_reported_and_cursor_holds() {
        let mut seq = TimestampSequence::new(vec![100, 200]);
        seq.advance().unwrap();
        match seq.advance() {
            Err(DatasetError::TimestampsExhausted {
                consumed,
                available,
            }) => {
                assert_eq!(consumed, 1);
                assert_eq!(available, 2);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(seq.cursor(), 1);
    }

    #[test]
    fn test_pair_at_random_access() {
        let seq = TimestampSequence::new(vec![5, 6, 7]);
        assert_eq!(seq.pair_at(1).unwrap(), (6, 7));
        assert!(seq.pair_at(2).is_err());
        assert_eq!(seq.len(), 3);
        assert!(!seq.is_empty());
    }
}
