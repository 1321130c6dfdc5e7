use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::pipeline::frame_sink::{FrameSink, FrameTimestamps};
use crate::shared::frame::Frame;

/// Appends one `frame_id timestamp next_timestamp` line per fed frame.
/// Unknown timestamps are written as `NaN`.
pub struct TimestampLogSink {
    path: PathBuf,
    out: BufWriter<File>,
}

impl TimestampLogSink {
    pub fn create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(File::create(path)?),
        })
    }
}

impl FrameSink for TimestampLogSink {
    fn consume(
        &mut self,
        frame_id: usize,
        _frame: &Frame,
        timestamps: FrameTimestamps,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        let current = timestamps.current.unwrap_or(f64::NAN);
        let next = timestamps.next.unwrap_or(f64::NAN);
        writeln!(self.out, "{frame_id} {current} {next}")?;
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.out.flush()?;
        log::info!("Timestamps written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_one_line_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("times.log");
        let mut sink = TimestampLogSink::create(&path).unwrap();
        let frame = Frame::new(vec![0; 3], 1, 1, 3, 0);

        sink.consume(
            0,
            &frame,
            FrameTimestamps {
                current: Some(100.0),
                next: Some(200.0),
            },
        )
        .unwrap();
        sink.consume(1, &frame, FrameTimestamps::default()).unwrap();
        sink.finish().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "0 100 200\n1 NaN NaN\n");
    }
}
