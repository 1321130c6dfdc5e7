use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Pull-based frame decoder over a continuous video stream.
///
/// The reader owns an implicit sequential cursor: every successful
/// [`read_frame`](VideoReader::read_frame) advances it by one frame.
/// Implementations handle codec and container details; the dataset layer
/// only sees [`Frame`] and [`VideoMetadata`].
pub trait VideoReader: Send {
    /// Opens the stream and returns its probed metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Decodes the frame under the cursor and advances past it.
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Moves the cursor so the next `read_frame` yields `frame_index`.
    fn seek(&mut self, frame_index: usize) -> Result<(), Box<dyn std::error::Error>>;

    /// Presentation time, in seconds, of the most recently decoded frame.
    fn position_secs(&self) -> Option<f64>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
