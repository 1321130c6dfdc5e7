use crate::shared::frame::Frame;

/// The timestamp pair reported by a dataset alongside a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTimestamps {
    pub current: Option<f64>,
    pub next: Option<f64>,
}

impl FrameTimestamps {
    /// `next - current`, when both are known.
    pub fn step(&self) -> Option<f64> {
        self.current.zip(self.next).map(|(t, n)| n - t)
    }
}

/// Downstream consumer of the feed loop.
pub trait FrameSink: Send {
    /// Handles one frame. Returning `Ok(false)` stops the feed.
    fn consume(
        &mut self,
        frame_id: usize,
        frame: &Frame,
        timestamps: FrameTimestamps,
    ) -> Result<bool, Box<dyn std::error::Error>>;

    /// Called once after the last frame. Default: no-op.
    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
