use std::path::PathBuf;

/// Stream properties probed when a source is opened.
///
/// `fps` is 0.0 when the container does not report a rate.
/// `total_frames` is `None` when the length is neither reported nor
/// derivable from the stream duration.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: Option<usize>,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_is_independent() {
        let meta = VideoMetadata {
            width: 640,
            height: 480,
            fps: 24.0,
            total_frames: Some(100),
            codec: "mpeg4".to_string(),
            source_path: Some(PathBuf::from("/tmp/video.mp4")),
        };
        let cloned = meta.clone();
        assert_eq!(meta, cloned);
    }

    #[test]
    fn test_unknown_length() {
        let meta = VideoMetadata {
            width: 640,
            height: 480,
            fps: 25.0,
            total_frames: None,
            codec: "mpeg4".to_string(),
            source_path: None,
        };
        assert_eq!(meta.total_frames, None);
    }
}
