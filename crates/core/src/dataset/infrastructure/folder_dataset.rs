use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::domain::dataset::{Dataset, DatasetState};
use crate::dataset::domain::dataset_config::DatasetConfig;
use crate::dataset::domain::dataset_error::DatasetError;
use crate::dataset::domain::timestamps::{read_timestamps, TimestampSequence};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::image_reader::ImageReader;
use crate::video::infrastructure::image_file_reader::ImageFileReader;

/// A dataset backed by a directory of image files, one frame per file in
/// lexicographic order.
///
/// Unlike [`VideoDataset`](super::video_dataset::VideoDataset) every id maps
/// straight to a file, so frames can be fetched in any order.
pub struct FolderDataset {
    state: DatasetState,
    reader: Box<dyn ImageReader>,
    files: Vec<PathBuf>,
    timestamps: Option<TimestampSequence>,
}

impl FolderDataset {
    pub fn open(config: &DatasetConfig) -> Result<Self, DatasetError> {
        Self::with_reader(config, Box::new(ImageFileReader::new()))
    }

    pub fn with_reader(
        config: &DatasetConfig,
        reader: Box<dyn ImageReader>,
    ) -> Result<Self, DatasetError> {
        let dir = config.source_path();
        let files = list_images(&dir)?;
        if files.is_empty() {
            log::warn!("No images found in {}", dir.display());
        }

        let timestamps = match config.timestamps_path() {
            Some(path) => {
                let values = read_timestamps(&path)?;
                (!values.is_empty()).then(|| TimestampSequence::new(values))
            }
            None => None,
        };

        log::info!(
            "Processing image folder {}: {} frames",
            dir.display(),
            files.len()
        );

        Ok(Self {
            state: DatasetState::new(
                config.base_path.clone(),
                config.name.clone(),
                config.fps,
                config.start_frame_id,
            ),
            reader,
            files,
            timestamps,
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn update_timestamps(&mut self, frame_id: usize) -> Result<(), DatasetError> {
        match &self.timestamps {
            Some(sequence) => match sequence.pair_at(frame_id) {
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
                let current = self.state.ts().map(|ts| frame_id as f64 * ts);
                let next = current.zip(self.state.ts()).map(|(t, ts)| t + ts);
                self.state.set_timestamps(current, next);
            }
        }
        Ok(())
    }
}

impl Dataset for FolderDataset {
    fn state(&self) -> &DatasetState {
        &self.state
    }

    fn get_image(&mut self, frame_id: usize) -> Result<Option<Frame>, DatasetError> {
        let Some(path) = self.files.get(frame_id) else {
            log::info!("End of image folder {}", self.state.name());
            self.state.mark_exhausted();
            return Ok(None);
        };

        let frame = self
            .reader
            .read(path, frame_id)
            .map_err(|e| DatasetError::Decode {
                frame_id,
                reason: format!("{}: {e}", path.display()),
            })?;

        self.update_timestamps(frame_id)?;
        Ok(Some(frame))
    }

    fn num_frames(&self) -> Option<usize> {
        Some(self.files.len())
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    if !dir.is_dir() {
        return Err(DatasetError::MissingDirectory(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| DatasetError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_file() && is_image(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    /// Returns a 2x2 RGB frame filled with the index, or fails for paths
    /// whose file name contains "bad".
    struct StubImageReader {
        reads: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ImageReader for StubImageReader {
        fn read(&self, path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
            self.reads.lock().unwrap().push(path.to_path_buf());
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            if name.contains("bad") {
                return Err("truncated file".into());
            }
            Ok(Frame::new(vec![index as u8; 12], 2, 2, 3, index))
        }
    }

    fn make_folder(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("image_0")).unwrap();
        for name in names {
            fs::write(dir.path().join("image_0").join(name), b"").unwrap();
        }
        dir
    }

    fn stub_dataset(config: &DatasetConfig) -> (FolderDataset, Arc<Mutex<Vec<PathBuf>>>) {
        let reads = Arc::new(Mutex::new(Vec::new()));
        let reader = StubImageReader {
            reads: reads.clone(),
        };
        (
            FolderDataset::with_reader(config, Box::new(reader)).unwrap(),
            reads,
        )
    }

    #[test]
    fn test_lists_images_sorted_and_filtered() {
        let dir = make_folder(&["000002.png", "000000.png", "notes.txt", "000001.JPG"]);
        let (dataset, _) = stub_dataset(&DatasetConfig::folder(dir.path(), "image_0"));

        let names: Vec<_> = dataset
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["000000.png", "000001.JPG", "000002.png"]);
        assert_eq!(dataset.num_frames(), Some(3));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = FolderDataset::open(&DatasetConfig::folder(dir.path(), "nope"));
        assert!(matches!(result, Err(DatasetError::MissingDirectory(_))));
    }

    #[test]
    fn test_empty_directory_is_immediately_exhausted() {
        let dir = make_folder(&[]);
        let (mut dataset, _) = stub_dataset(&DatasetConfig::folder(dir.path(), "image_0"));
        assert!(dataset.is_ok());
        assert!(dataset.get_image_color(0).is_none());
        assert!(!dataset.is_ok());
    }

    #[test]
    fn test_random_access_and_offset() {
        let dir = make_folder(&["a.png", "b.png", "c.png", "d.png"]);
        let config = DatasetConfig::folder(dir.path(), "image_0").with_start_frame_id(1);
        let (mut dataset, reads) = stub_dataset(&config);

        assert_eq!(dataset.get_image_color(2).unwrap().index(), 3);
        assert_eq!(dataset.get_image_color(0).unwrap().index(), 1);
        let reads = reads.lock().unwrap();
        assert!(reads[0].ends_with("d.png"));
        assert!(reads[1].ends_with("b.png"));
    }

    #[test]
    fn test_raw_image_keeps_channels() {
        let dir = make_folder(&["a.png"]);
        let (mut dataset, _) = stub_dataset(&DatasetConfig::folder(dir.path(), "image_0"));
        assert_eq!(dataset.get_image(0).unwrap().unwrap().channels(), 3);
        assert_eq!(dataset.get_image_color(0).unwrap().channels(), 1);
    }

    #[test]
    fn test_unreadable_file_does_not_end_the_sequence() {
        let dir = make_folder(&["0_ok.png", "1_bad.png", "2_ok.png"]);
        let (mut dataset, _) = stub_dataset(&DatasetConfig::folder(dir.path(), "image_0"));

        assert!(matches!(
            dataset.get_image(1),
            Err(DatasetError::Decode { frame_id: 1, .. })
        ));
        assert!(dataset.is_ok());
        assert!(dataset.get_image_color(1).is_none());
        assert!(dataset.get_image_color(2).is_some());
    }

    #[test]
    fn test_past_the_end_marks_exhausted() {
        let dir = make_folder(&["a.png", "b.png"]);
        let (mut dataset, _) = stub_dataset(&DatasetConfig::folder(dir.path(), "image_0"));
        assert!(dataset.get_image(1).unwrap().is_some());
        assert!(dataset.get_image(2).unwrap().is_none());
        assert!(!dataset.is_ok());
    }

    #[test]
    fn test_timestamps_from_fps() {
        let dir = make_folder(&["a.png", "b.png", "c.png"]);
        let config = DatasetConfig::folder(dir.path(), "image_0").with_fps(10.0);
        let (mut dataset, _) = stub_dataset(&config);

        dataset.get_image(2).unwrap();
        assert_relative_eq!(dataset.timestamp().unwrap(), 0.2);
        assert_relative_eq!(dataset.next_timestamp().unwrap(), 0.3);
    }

    #[test]
    fn test_timestamps_without_rate_are_unknown() {
        let dir = make_folder(&["a.png"]);
        let (mut dataset, _) = stub_dataset(&DatasetConfig::folder(dir.path(), "image_0"));
        dataset.get_image(0).unwrap();
        assert_eq!(dataset.timestamp(), None);
        assert_eq!(dataset.next_timestamp(), None);
    }

    #[test]
    fn test_timestamps_file_is_indexed_by_frame() {
        let dir = make_folder(&["a.png", "b.png", "c.png"]);
        fs::write(dir.path().join("times.txt"), "10\n20\n30\n").unwrap();
        let config = DatasetConfig::folder(dir.path(), "image_0").with_timestamps("times.txt");
        let (mut dataset, _) = stub_dataset(&config);

        dataset.get_image(1).unwrap();
        assert_eq!(dataset.timestamp(), Some(20.0));
        assert_eq!(dataset.next_timestamp(), Some(30.0));
        dataset.get_image(0).unwrap();
        assert_eq!(dataset.timestamp(), Some(10.0));

        assert!(matches!(
            dataset.get_image(2),
            Err(DatasetError::TimestampsExhausted { .. })
        ));
        assert!(!dataset.is_ok());
    }

    #[test]
    fn test_reads_real_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("image_0");
        fs::create_dir(&folder).unwrap();
        for i in 0..3u8 {
            let img = image::RgbImage::from_pixel(8, 6, image::Rgb([i * 40, i * 40, i * 40]));
            img.save(folder.join(format!("{i:06}.png"))).unwrap();
        }

        let mut dataset = FolderDataset::open(&DatasetConfig::folder(dir.path(), "image_0")).unwrap();
        for i in 0..3 {
            let frame = dataset.get_image_color(i).unwrap();
            assert_eq!((frame.width(), frame.height(), frame.channels()), (8, 6, 1));
            assert!(frame.data().iter().all(|&v| (v as i32 - i as i32 * 40).abs() <= 2));
        }
        assert!(dataset.get_image_color(3).is_none());
        assert!(!dataset.is_ok());
    }
}
