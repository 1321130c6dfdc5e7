use crate::dataset::domain::dataset::{Dataset, DatasetState};
use crate::dataset::domain::dataset_config::DatasetConfig;
use crate::dataset::domain::dataset_error::DatasetError;
use crate::dataset::domain::timestamps::{read_timestamps, TimestampSequence};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

/// A dataset backed by a single video file.
///
/// Frames come off the decoder's sequential cursor. The only explicit
/// positioning is a one-time catch-up seek on the first call when its
/// `frame_id` is greater than zero; every later call simply decodes the
/// next frame and ignores the exact `frame_id` it was given.
///
/// **Callers must request strictly increasing, consecutive ids.** Asking
/// for frames out of order silently returns whatever frame is next in the
/// stream.
///
/// Timestamps come from the optional timestamps file when it has entries;
/// otherwise the current timestamp is the decoder's presentation time in
/// seconds and the next one is extrapolated by one frame period.
pub struct VideoDataset {
    state: DatasetState,
    reader: Box<dyn VideoReader>,
    metadata: VideoMetadata,
    is_init: bool,
    timestamps: Option<TimestampSequence>,
}

impl VideoDataset {
    /// Opens the video at `config.source_path()` with the ffmpeg decoder.
    pub fn open(config: &DatasetConfig) -> Result<Self, DatasetError> {
        Self::with_reader(config, Box::new(FfmpegReader::new()))
    }

    /// Opens the video through the given decoder.
    ///
    /// Failing to open the stream is fatal. The probed frame rate replaces
    /// any rate in `config`.
    pub fn with_reader(
        config: &DatasetConfig,
        mut reader: Box<dyn VideoReader>,
    ) -> Result<Self, DatasetError> {
        let filename = config.source_path();
        let metadata = reader.open(&filename).map_err(|e| DatasetError::Open {
            path: filename.clone(),
            reason: e.to_string(),
        })?;

        let mut state = DatasetState::new(
            config.base_path.clone(),
            config.name.clone(),
            config.fps,
            config.start_frame_id,
        );
        state.set_fps(Some(metadata.fps));

        let timestamps = match config.timestamps_path() {
            Some(path) => {
                let values = read_timestamps(&path)?;
                (!values.is_empty()).then(|| TimestampSequence::new(values))
            }
            None => None,
        };

        log::info!(
            "Processing video input {}: {} frames, {}x{}, {:.3} fps",
            filename.display(),
            metadata
                .total_frames
                .map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            metadata.width,
            metadata.height,
            metadata.fps
        );

        Ok(Self {
            state,
            reader,
            metadata,
            is_init: false,
            timestamps,
        })
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    pub fn has_external_timestamps(&self) -> bool {
        self.timestamps.is_some()
    }
}

impl Dataset for VideoDataset {
    fn state(&self) -> &DatasetState {
        &self.state
    }

    fn get_image(&mut self, frame_id: usize) -> Result<Option<Frame>, DatasetError> {
        if !self.is_init && frame_id > 0 {
            self.is_init = true;
            log::debug!("Seeking {} to frame {frame_id}", self.state.name());
            if let Err(e) = self.reader.seek(frame_id) {
                self.state.mark_exhausted();
                return Err(DatasetError::Seek {
                    frame_id,
                    reason: e.to_string(),
                });
            }
        }
        self.is_init = true;

        let frame = match self.reader.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("End of video {}", self.state.name());
                self.state.mark_exhausted();
                return Ok(None);
            }
            Err(e) => {
                log::warn!("Decoding {} failed, stopping: {e}", self.state.name());
                self.state.mark_exhausted();
                return Ok(None);
            }
        };

        match self.timestamps.as_mut() {
            Some(sequence) => match sequence.advance() {
                Ok((current, next)) => {
                    self.state
                        .set_timestamps(Some(current as f64), Some(next as f64));
                }
                Err(e) => {
                    self.state.mark_exhausted();
                    return Err(e);
                }
            },
            None => {
                let current = self.reader.position_secs();
                let next = current.zip(self.state.ts()).map(|(t, ts)| t + ts);
                self.state.set_timestamps(current, next);
            }
        }

        Ok(Some(frame.first_channel()))
    }

    fn num_frames(&self) -> Option<usize> {
        self.metadata.total_frames
    }
}

impl Drop for VideoDataset {
    fn drop(&mut self) {
        self.reader.close();
    }
}
