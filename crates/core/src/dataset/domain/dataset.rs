use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;

use super::dataset_error::DatasetError;

/// State shared by every dataset: identity, acquisition rate, start
/// offset, liveness flag, and the timestamp pair of the last fetched frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetState {
    path: PathBuf,
    name: String,
    fps: Option<f64>,
    ts: Option<f64>,
    start_frame_id: usize,
    is_ok: bool,
    timestamp: Option<f64>,
    next_timestamp: Option<f64>,
}

impl DatasetState {
    pub fn new(path: PathBuf, name: String, fps: Option<f64>, start_frame_id: usize) -> Self {
        let mut state = Self {
            path,
            name,
            fps: None,
            ts: None,
            start_frame_id,
            is_ok: true,
            timestamp: None,
            next_timestamp: None,
        };
        state.set_fps(fps);
        state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    /// Frame period `1 / fps`; `None` when the rate is unknown or zero.
    pub fn ts(&self) -> Option<f64> {
        self.ts
    }

    pub fn start_frame_id(&self) -> usize {
        self.start_frame_id
    }

    pub fn is_ok(&self) -> bool {
        self.is_ok
    }

    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    pub fn next_timestamp(&self) -> Option<f64> {
        self.next_timestamp
    }

    /// Sets the acquisition rate and recomputes the frame period.
    pub fn set_fps(&mut self, fps: Option<f64>) {
        self.fps = fps;
        self.ts = fps.filter(|&f| f != 0.0).map(|f| 1.0 / f);
    }

    /// Records the timestamp pair of the frame just fetched.
    pub fn set_timestamps(&mut self, current: Option<f64>, next: Option<f64>) {
        self.timestamp = current;
        self.next_timestamp = next;
    }

    /// Flags the source as exhausted. There is no way back.
    pub fn mark_exhausted(&mut self) {
        self.is_ok = false;
    }
}

/// A sequential source of frames for a visual odometry front end.
///
/// A consumer polls [`is_ok`](Dataset::is_ok) and fetches frames with
/// increasing logical ids through [`get_image_color`](Dataset::get_image_color)
/// (or [`get_image_color_right`](Dataset::get_image_color_right)), which apply
/// the start offset and never fail: problems are logged and come back as
/// `None`. The raw `get_image*` methods take already-offset indices.
///
/// Sources only implement the modalities they have; the others default to
/// `Ok(None)`.
pub trait Dataset: Send {
    fn state(&self) -> &DatasetState;

    /// The raw image at `frame_id` (already offset).
    ///
    /// `Ok(None)` signals exhaustion, after which `is_ok()` is false.
    fn get_image(&mut self, _frame_id: usize) -> Result<Option<Frame>, DatasetError> {
        Ok(None)
    }

    /// The right image of a stereo pair at `frame_id` (already offset).
    fn get_image_right(&mut self, _frame_id: usize) -> Result<Option<Frame>, DatasetError> {
        Ok(None)
    }

    /// The depth image at `frame_id` (already offset).
    fn get_depth(&mut self, _frame_id: usize) -> Result<Option<Frame>, DatasetError> {
        Ok(None)
    }

    /// Total number of frames, when the source knows it.
    fn num_frames(&self) -> Option<usize> {
        None
    }

    fn is_ok(&self) -> bool {
        self.state().is_ok()
    }

    fn timestamp(&self) -> Option<f64> {
        self.state().timestamp()
    }

    fn next_timestamp(&self) -> Option<f64> {
        self.state().next_timestamp()
    }

    fn name(&self) -> &str {
        self.state().name()
    }

    fn path(&self) -> &Path {
        self.state().path()
    }

    /// `frame_id` shifted by the start frame, or `None` (logged) when the
    /// shifted id does not fit in `usize`.
    fn offset_frame_id(&self, frame_id: usize) -> Option<usize> {
        let start = self.state().start_frame_id();
        let shifted = frame_id.checked_add(start);
        if shifted.is_none() {
            log::warn!(
                "Cannot open dataset: {}, path: {} (frame {frame_id} + start {start} is out of range)",
                self.name(),
                self.path().display()
            );
        }
        shifted
    }

    /// Offsets `frame_id` by the start frame and returns the first channel
    /// of the image found there.
    fn get_image_color(&mut self, frame_id: usize) -> Option<Frame> {
        let frame_id = self.offset_frame_id(frame_id)?;
        match self.get_image(frame_id) {
            Ok(Some(frame)) => Some(frame.first_channel()),
            Ok(None) => {
                log::warn!(
                    "Cannot open dataset: {}, path: {} (no image at frame {frame_id})",
                    self.name(),
                    self.path().display()
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "Cannot open dataset: {}, path: {} ({e})",
                    self.name(),
                    self.path().display()
                );
                None
            }
        }
    }

    /// Offsets `frame_id` by the start frame and returns the right image,
    /// expanded to three channels when it is single-channel.
    fn get_image_color_right(&mut self, frame_id: usize) -> Option<Frame> {
        let frame_id = self.offset_frame_id(frame_id)?;
        match self.get_image_right(frame_id) {
            Ok(frame) => frame.map(|f| f.to_three_channel()),
            Err(e) => {
                log::warn!(
                    "Cannot open dataset: {}, path: {}, right image ({e})",
                    self.name(),
                    self.path().display()
                );
                None
            }
        }
    }
}
