use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::dataset::domain::dataset::Dataset;

use super::frame_sink::{FrameSink, FrameTimestamps};
use super::pipeline_logger::PipelineLogger;

/// Outcome of a feed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Frames handed to the sink.
    pub frames_delivered: usize,
    /// Ids that produced no image while the dataset was still live.
    pub frames_skipped: usize,
}

/// Pulls frames from a dataset with consecutive logical ids and pushes
/// them into a sink, the way a tracking front end consumes its input.
///
/// The loop ends when the dataset reports `is_ok() == false`, when
/// `max_frames` ids have been requested, when the sink declines more
/// frames, or when the cancel flag is raised. Single-use: `execute`
/// consumes the owned components.
pub struct FeedFramesUseCase {
    dataset: Option<Box<dyn Dataset>>,
    sink: Option<Box<dyn FrameSink>>,
    logger: Box<dyn PipelineLogger>,
    max_frames: Option<usize>,
    cancelled: Arc<AtomicBool>,
}

impl FeedFramesUseCase {
    pub fn new(
        dataset: Box<dyn Dataset>,
        sink: Box<dyn FrameSink>,
        logger: Box<dyn PipelineLogger>,
        max_frames: Option<usize>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            dataset: Some(dataset),
            sink: Some(sink),
            logger,
            max_frames,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(&mut self) -> Result<FeedSummary, Box<dyn std::error::Error>> {
        let mut dataset = self.dataset.take().ok_or("Feed already executed")?;
        let mut sink = self.sink.take().ok_or("Feed already executed")?;

        let available = dataset
            .num_frames()
            .map(|n| n.saturating_sub(dataset.state().start_frame_id()));
        let total = match (available, self.max_frames) {
            (Some(n), Some(max)) => n.min(max),
            (Some(n), None) => n,
            (None, Some(max)) => max,
            (None, None) => 0,
        };
        self.logger.info(&format!(
            "Feeding {} from {} (start frame {})",
            dataset.name(),
            dataset.path().display(),
            dataset.state().start_frame_id()
        ));

        let mut summary = FeedSummary::default();
        let mut frame_id = 0;
        while dataset.is_ok() {
            if self.max_frames.is_some_and(|max| frame_id >= max) {
                break;
            }
            if self.cancelled.load(Ordering::Relaxed) {
                self.logger.info("Feed cancelled");
                break;
            }

            let read_start = Instant::now();
            let frame = dataset.get_image_color(frame_id);
            self.logger
                .timing("read", read_start.elapsed().as_secs_f64() * 1000.0);

            let mut stop = false;
            match frame {
                Some(frame) => {
                    let timestamps = FrameTimestamps {
                        current: dataset.timestamp(),
                        next: dataset.next_timestamp(),
                    };
                    if let Some(step) = timestamps.step() {
                        self.logger.metric("timestamp_step", step);
                    }

                    let sink_start = Instant::now();
                    let keep_going = sink.consume(frame_id, &frame, timestamps)?;
                    self.logger
                        .timing("sink", sink_start.elapsed().as_secs_f64() * 1000.0);
                    summary.frames_delivered += 1;
                    if !keep_going {
                        self.logger.info("Sink requested stop");
                        stop = true;
                    }
                }
                None if dataset.is_ok() => summary.frames_skipped += 1,
                None => {}
            }

            frame_id += 1;
            self.logger.progress(frame_id, total);
            if stop {
                break;
            }
        }

        sink.finish()?;
        self.logger.info(&format!(
            "Delivered {} frames, skipped {}",
            summary.frames_delivered, summary.frames_skipped
        ));
        self.logger.summary();
        Ok(summary)
    }
}
