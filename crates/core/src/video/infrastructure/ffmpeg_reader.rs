use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Frames are pulled one at a time; each decoded picture is converted to
/// RGB24 and wrapped in a [`Frame`] carrying its position in the stream.
pub struct FfmpegReader {
    state: Option<DecodeState>,
    metadata: Option<VideoMetadata>,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            state: None,
            metadata: None,
        }
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.metadata.as_ref()
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let fps = rational_to_f64(stream.rate())
            .or_else(|| rational_to_f64(stream.avg_frame_rate()))
            .unwrap_or(0.0);
        let time_base = rational_to_f64(stream.time_base()).unwrap_or(0.0);
        let start_secs = ticks_to_secs(stream.start_time(), time_base).unwrap_or(0.0);
        let duration_secs = ticks_to_secs(stream.duration(), time_base)
            .filter(|&d| d > 0.0)
            .or_else(|| {
                let micros = ictx.duration();
                (micros > 0).then(|| micros as f64 / MICROS_PER_SEC)
            });
        let total_frames = estimate_frame_count(stream.frames(), duration_secs, fps);

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.state = Some(DecodeState {
            ictx,
            decoder,
            scaler,
            width,
            height,
            video_stream_index,
            time_base,
            start_secs,
            fps,
            next_index: 0,
            seek_target: None,
            last_position: None,
            flushing: false,
            done: false,
        });
        self.metadata = Some(metadata.clone());

        Ok(metadata)
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let state = self.state.as_mut().ok_or("FfmpegReader: not opened")?;

        loop {
            let Some(decoded) = state.receive_next()? else {
                return Ok(None);
            };
            let secs = state.presentation_secs(&decoded);

            if let Some(target) = state.seek_target {
                let index = secs
                    .filter(|_| state.fps > 0.0)
                    .map(|s| (s * state.fps).round() as usize)
                    .unwrap_or(state.next_index);
                if index < target {
                    state.next_index = index + 1;
                    continue;
                }
                state.seek_target = None;
                state.next_index = index;
            }

            let frame = state.convert(&decoded)?;
            state.last_position = secs.or_else(|| {
                (state.fps > 0.0).then(|| state.next_index as f64 / state.fps)
            });
            state.next_index += 1;
            return Ok(Some(frame));
        }
    }

    fn seek(&mut self, frame_index: usize) -> Result<(), Box<dyn std::error::Error>> {
        let state = self.state.as_mut().ok_or("FfmpegReader: not opened")?;

        if state.fps > 0.0 {
            let target_secs = state.start_secs + frame_index as f64 / state.fps;
            let target_us = (target_secs * MICROS_PER_SEC) as i64;
            match state.ictx.seek(target_us, ..target_us) {
                Ok(()) => {
                    state.decoder.flush();
                    state.flushing = false;
                    state.done = false;
                    log::debug!("Seeked container to frame {frame_index} ({target_us}us)");
                }
                Err(e) if frame_index < state.next_index => {
                    return Err(format!("cannot seek back to frame {frame_index}: {e}").into());
                }
                Err(e) => {
                    log::debug!("Container seek failed ({e}), decoding forward instead");
                }
            }
        } else if frame_index < state.next_index {
            return Err(format!("cannot seek back to frame {frame_index} without a frame rate").into());
        }

        state.seek_target = Some(frame_index);
        Ok(())
    }

    fn position_secs(&self) -> Option<f64> {
        self.state.as_ref().and_then(|s| s.last_position)
    }

    fn close(&mut self) {
        self.state = None;
        self.metadata = None;
    }
}

/// Decoder context for an open stream plus the sequential cursor.
struct DecodeState {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    /// Seconds per timestamp tick.
    time_base: f64,
    /// Presentation time of the first frame; reported positions are relative to it.
    start_secs: f64,
    fps: f64,
    next_index: usize,
    seek_target: Option<usize>,
    last_position: Option<f64>,
    flushing: bool,
    done: bool,
}

impl DecodeState {
    /// Pulls the next decoded picture, feeding packets and draining the
    /// decoder at end of input.
    fn receive_next(
        &mut self,
    ) -> Result<Option<ffmpeg_next::util::frame::video::Video>, Box<dyn std::error::Error>> {
        if self.done {
            return Ok(None);
        }

        loop {
            let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }

            if self.flushing {
                self.done = true;
                return Ok(None);
            }

            match self.ictx.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.video_stream_index {
                        continue;
                    }
                    // Corrupt packets are skipped; the decoder resyncs on the next keyframe.
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        log::debug!("Dropping undecodable packet: {e}");
                    }
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.flushing = true;
                }
            }
        }
    }

    fn presentation_secs(&self, decoded: &ffmpeg_next::util::frame::video::Video) -> Option<f64> {
        if self.time_base <= 0.0 {
            return None;
        }
        decoded
            .timestamp()
            .or_else(|| decoded.pts())
            .map(|ts| ts as f64 * self.time_base - self.start_secs)
    }

    fn convert(
        &mut self,
        decoded: &ffmpeg_next::util::frame::video::Video,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(decoded, &mut rgb_frame)?;
        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        Ok(Frame::new(pixels, self.width, self.height, 3, self.next_index))
    }
}

/// Converts a stream timestamp to seconds; `None` when ffmpeg marks it unset.
fn ticks_to_secs(ticks: i64, time_base: f64) -> Option<f64> {
    (ticks != ffmpeg_next::ffi::AV_NOPTS_VALUE && time_base > 0.0).then(|| ticks as f64 * time_base)
}

/// The container's frame count when it reports one, otherwise
/// `duration * fps`.
fn estimate_frame_count(reported: i64, duration_secs: Option<f64>, fps: f64) -> Option<usize> {
    if reported > 0 {
        return Some(reported as usize);
    }
    duration_secs
        .filter(|_| fps > 0.0)
        .map(|d| (d * fps).round() as usize)
        .filter(|&n| n > 0)
}

fn rational_to_f64(rate: ffmpeg_next::Rational) -> Option<f64> {
    if rate.denominator() != 0 && rate.numerator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may pad each row (stride > width*3); the padding is dropped.
pub(crate) fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
