use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dataset_error::DatasetError;

/// Which concrete source backs a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// A single video file decoded sequentially.
    #[default]
    Video,
    /// A directory of image files, one frame per file.
    Folder,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Video => write!(f, "video"),
            DatasetKind::Folder => write!(f, "folder"),
        }
    }
}

impl FromStr for DatasetKind {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(DatasetKind::Video),
            "folder" => Ok(DatasetKind::Folder),
            other => Err(DatasetError::Config(format!(
                "dataset kind must be 'video' or 'folder', got '{other}'"
            ))),
        }
    }
}

/// Static construction parameters of a dataset.
///
/// `name` is resolved against `base_path` (a video file for
/// [`DatasetKind::Video`], an image directory for [`DatasetKind::Folder`]),
/// as is the optional `timestamps` file. `associations` is carried for
/// sources that pair modalities; neither built-in source reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default)]
    pub kind: DatasetKind,
    pub base_path: PathBuf,
    pub name: String,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub associations: Option<String>,
    #[serde(default)]
    pub timestamps: Option<String>,
    #[serde(default)]
    pub start_frame_id: usize,
}

impl DatasetConfig {
    pub fn new(kind: DatasetKind, base_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            kind,
            base_path: base_path.into(),
            name: name.into(),
            fps: None,
            associations: None,
            timestamps: None,
            start_frame_id: 0,
        }
    }

    pub fn video(base_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(DatasetKind::Video, base_path, name)
    }

    pub fn folder(base_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(DatasetKind::Folder, base_path, name)
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_timestamps(mut self, timestamps: impl Into<String>) -> Self {
        self.timestamps = Some(timestamps.into());
        self
    }

    pub fn with_associations(mut self, associations: impl Into<String>) -> Self {
        self.associations = Some(associations.into());
        self
    }

    pub fn with_start_frame_id(mut self, start_frame_id: usize) -> Self {
        self.start_frame_id = start_frame_id;
        self
    }

    /// The video file or image directory the dataset reads from.
    pub fn source_path(&self) -> PathBuf {
        self.base_path.join(&self.name)
    }

    pub fn timestamps_path(&self) -> Option<PathBuf> {
        self.timestamps.as_ref().map(|t| self.base_path.join(t))
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.name.trim().is_empty() {
            return Err(DatasetError::Config("name must not be empty".to_string()));
        }
        if let Some(fps) = self.fps {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(DatasetError::Config(format!(
                    "fps must be a positive number, got {fps}"
                )));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(json).map_err(|e| DatasetError::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DatasetError> {
        let json = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
