use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("cannot open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("dataset directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("failed to decode frame {frame_id}: {reason}")]
    Decode { frame_id: usize, reason: String },
    #[error("failed to seek to frame {frame_id}: {reason}")]
    Seek { frame_id: usize, reason: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed timestamp in {path} at line {line}: {content:?}")]
    MalformedTimestamp {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("timestamp sequence exhausted after {consumed} frames ({available} timestamps loaded)")]
    TimestampsExhausted { consumed: usize, available: usize },
    #[error("invalid dataset config: {0}")]
    Config(String),
}
