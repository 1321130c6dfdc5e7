use std::path::Path;

use crate::shared::frame::Frame;

/// Decodes a single image file into a frame.
pub trait ImageReader: Send {
    /// Reads the image at `path`, tagging the result with `index`.
    fn read(&self, path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>>;
}
