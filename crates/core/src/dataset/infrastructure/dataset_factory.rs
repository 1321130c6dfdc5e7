use crate::dataset::domain::dataset::Dataset;
use crate::dataset::domain::dataset_config::{DatasetConfig, DatasetKind};
use crate::dataset::domain::dataset_error::DatasetError;

use super::folder_dataset::FolderDataset;
use super::video_dataset::VideoDataset;

/// Validates `config` and opens the source its `kind` names.
pub fn create_dataset(config: &DatasetConfig) -> Result<Box<dyn Dataset>, DatasetError> {
    config.validate()?;
    log::info!(
        "Opening {} dataset {} (start frame {})",
        config.kind,
        config.source_path().display(),
        config.start_frame_id
    );
    match config.kind {
        DatasetKind::Video => Ok(Box::new(VideoDataset::open(config)?)),
        DatasetKind::Folder => Ok(Box::new(FolderDataset::open(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_video::create_test_video;
    use std::fs;

    #[test]
    fn test_creates_folder_dataset() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("frames")).unwrap();
        image::RgbImage::new(4, 4)
            .save(dir.path().join("frames").join("0.png"))
            .unwrap();

        let dataset = create_dataset(&DatasetConfig::folder(dir.path(), "frames")).unwrap();
        assert_eq!(dataset.num_frames(), Some(1));
        assert_eq!(dataset.name(), "frames");
        assert!(dataset.is_ok());
    }

    #[test]
    fn test_creates_video_dataset() {
        let dir = tempfile::tempdir().unwrap();
        create_test_video(&dir.path().join("clip.mp4"), 4, 32, 32, 10);

        let mut dataset = create_dataset(&DatasetConfig::video(dir.path(), "clip.mp4")).unwrap();
        assert_eq!(dataset.num_frames(), Some(4));
        assert!(dataset.get_image_color(0).is_some());
    }

    #[test]
    fn test_missing_video_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = create_dataset(&DatasetConfig::video(dir.path(), "clip.mp4"));
        assert!(matches!(result, Err(DatasetError::Open { .. })));
    }

    #[test]
    fn test_invalid_config_rejected_before_opening() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatasetConfig::folder(dir.path(), "frames").with_fps(-1.0);
        assert!(matches!(
            create_dataset(&config),
            Err(DatasetError::Config(_))
        ));
    }
}
