use std::path::PathBuf;
use std::process;

use clap::Parser;

use slamlab_core::dataset::domain::dataset_config::{DatasetConfig, DatasetKind};
use slamlab_core::dataset::infrastructure::dataset_factory::create_dataset;
use slamlab_core::pipeline::feed_frames_use_case::FeedFramesUseCase;
use slamlab_core::pipeline::frame_sink::{FrameSink, FrameTimestamps};
use slamlab_core::pipeline::infrastructure::image_dump_sink::ImageDumpSink;
use slamlab_core::pipeline::infrastructure::timestamp_log_sink::TimestampLogSink;
use slamlab_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use slamlab_core::shared::frame::Frame;
use slamlab_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Feed a video or image folder through the dataset front end.
#[derive(Parser)]
#[command(name = "slamlab")]
struct Cli {
    /// Directory holding the video file or image folder.
    input_dir: Option<PathBuf>,

    /// Video file name or image folder name inside INPUT_DIR.
    name: Option<String>,

    /// JSON dataset config; flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source kind: video or folder.
    #[arg(long)]
    kind: Option<DatasetKind>,

    /// Acquisition rate in frames per second.
    #[arg(long)]
    fps: Option<f64>,

    /// Timestamps file, relative to INPUT_DIR.
    #[arg(long)]
    timestamps: Option<String>,

    /// Skip this many frames at the start of the source.
    #[arg(long)]
    start_frame: Option<usize>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Write every fed frame as PNG into this directory.
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Write `frame_id timestamp next_timestamp` lines to this file.
    #[arg(long)]
    timestamp_log: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    let dataset = create_dataset(&config)?;
    let sink = build_sink(&cli)?;

    let mut use_case = FeedFramesUseCase::new(
        dataset,
        sink,
        Box::new(StdoutPipelineLogger::default()),
        cli.max_frames,
        None,
    );
    let summary = use_case.execute()?;
    log::info!(
        "Done: {} frames delivered, {} skipped",
        summary.frames_delivered,
        summary.frames_skipped
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<DatasetConfig, Box<dyn std::error::Error>> {
    let mut config = match (&cli.config, &cli.input_dir, &cli.name) {
        (Some(path), _, _) => DatasetConfig::from_json_file(path)?,
        (None, Some(dir), Some(name)) => DatasetConfig::video(dir, name.as_str()),
        _ => return Err("Either --config or INPUT_DIR and NAME are required".into()),
    };

    if cli.config.is_some() {
        if let Some(dir) = &cli.input_dir {
            config.base_path = dir.clone();
        }
        if let Some(name) = &cli.name {
            config.name = name.clone();
        }
    }
    if let Some(kind) = cli.kind {
        config.kind = kind;
    }
    if let Some(fps) = cli.fps {
        config.fps = Some(fps);
    }
    if let Some(timestamps) = &cli.timestamps {
        config.timestamps = Some(timestamps.clone());
    }
    if let Some(start) = cli.start_frame {
        config.start_frame_id = start;
    }
    Ok(config)
}

fn build_sink(cli: &Cli) -> Result<Box<dyn FrameSink>, Box<dyn std::error::Error>> {
    let mut sinks: Vec<Box<dyn FrameSink>> = Vec::new();
    if let Some(dir) = &cli.dump_dir {
        sinks.push(Box::new(ImageDumpSink::new(
            dir,
            Box::new(ImageFileWriter::new()),
        )));
    }
    if let Some(path) = &cli.timestamp_log {
        sinks.push(Box::new(TimestampLogSink::create(path)?));
    }
    Ok(Box::new(FanOutSink(sinks)))
}

/// Hands every frame to each inner sink; stops when any of them declines.
struct FanOutSink(Vec<Box<dyn FrameSink>>);

impl FrameSink for FanOutSink {
    fn consume(
        &mut self,
        frame_id: usize,
        frame: &Frame,
        timestamps: FrameTimestamps,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        let mut keep_going = true;
        for sink in &mut self.0 {
            keep_going &= sink.consume(frame_id, frame, timestamps)?;
        }
        Ok(keep_going)
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        for sink in &mut self.0 {
            sink.finish()?;
        }
        Ok(())
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(config) = &cli.config {
        if !config.exists() {
            return Err(format!("Config file not found: {}", config.display()).into());
        }
    } else if cli.input_dir.is_none() || cli.name.is_none() {
        return Err("Either --config or INPUT_DIR and NAME are required".into());
    }
    if let Some(dir) = &cli.input_dir {
        if !dir.is_dir() {
            return Err(format!("Input directory not found: {}", dir.display()).into());
        }
    }
    if let Some(fps) = cli.fps {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(format!("FPS must be a positive number, got {fps}").into());
        }
    }
    if cli.max_frames == Some(0) {
        return Err("Max frames must be at least 1".into());
    }
    Ok(())
}
