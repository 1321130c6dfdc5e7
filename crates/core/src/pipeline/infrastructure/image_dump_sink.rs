use std::path::PathBuf;

use crate::pipeline::frame_sink::{FrameSink, FrameTimestamps};
use crate::shared::constants::DUMP_FRAME_DIGITS;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes every fed frame to `<dir>/frame_<id>.png`, with the logical id
/// zero-padded.
pub struct ImageDumpSink {
    dir: PathBuf,
    writer: Box<dyn ImageWriter>,
    written: usize,
}

impl ImageDumpSink {
    pub fn new(dir: impl Into<PathBuf>, writer: Box<dyn ImageWriter>) -> Self {
        Self {
            dir: dir.into(),
            writer,
            written: 0,
        }
    }

    pub fn frame_path(&self, frame_id: usize) -> PathBuf {
        self.dir
            .join(format!("frame_{frame_id:0width$}.png", width = DUMP_FRAME_DIGITS))
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for ImageDumpSink {
    fn consume(
        &mut self,
        frame_id: usize,
        frame: &Frame,
        _timestamps: FrameTimestamps,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        self.writer.write(&self.frame_path(frame_id), frame)?;
        self.written += 1;
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Wrote {} frames to {}", self.written, self.dir.display());
        Ok(())
    }
}
