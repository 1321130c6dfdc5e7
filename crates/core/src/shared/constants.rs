/// File extensions treated as frames when scanning an image folder.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Progress is logged every this many frames by the stdout pipeline logger.
pub const PROGRESS_THROTTLE_FRAMES: usize = 10;

/// File name pattern for dumped frames, zero-padded by logical frame id.
pub const DUMP_FRAME_DIGITS: usize = 6;
