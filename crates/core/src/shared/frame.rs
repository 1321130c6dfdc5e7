use ndarray::{ArrayView3, Axis};

/// A single decoded image: contiguous pixel bytes in row-major,
/// channel-interleaved order.
///
/// Sources produce 3-channel RGB frames; the dataset layer reduces them to
/// a single intensity channel for feature extraction and expands
/// single-channel images back to 3 channels for color consumers.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Position of this frame in its source, before any start offset.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_single_channel(&self) -> bool {
        self.channels == 1
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies out the first channel as a single-channel frame.
    ///
    /// A single-channel frame is returned as an identical copy.
    pub fn first_channel(&self) -> Frame {
        if self.is_single_channel() {
            return self.clone();
        }
        let data = self
            .as_ndarray()
            .index_axis(Axis(2), 0)
            .iter()
            .copied()
            .collect();
        Frame::new(data, self.width, self.height, 1, self.index)
    }

    /// Replicates a single-channel frame into three equal channels.
    ///
    /// Multi-channel frames are returned unchanged.
    pub fn to_three_channel(&self) -> Frame {
        if !self.is_single_channel() {
            return self.clone();
        }
        let data = self.data.iter().flat_map(|&v| [v, v, v]).collect();
        Frame::new(data, self.width, self.height, 3, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_frame(width: u32, height: u32) -> Frame {
        let data = (0..width * height * 3).map(|v| (v % 251) as u8).collect();
        Frame::new(data, width, height, 3, 7)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_single_channel());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10];
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let frame = Frame::new(vec![0u8; 24], 4, 2, 3, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]); // (height, width, channels)
    }

    #[test]
    fn test_first_channel_extracts_red_plane() {
        let frame = rgb_frame(3, 2);
        let gray = frame.first_channel();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.width(), 3);
        assert_eq!(gray.height(), 2);
        assert_eq!(gray.index(), 7);
        for row in 0..2 {
            for col in 0..3 {
                assert_eq!(
                    gray.as_ndarray()[[row, col, 0]],
                    frame.as_ndarray()[[row, col, 0]]
                );
            }
        }
    }

    #[test]
    fn test_first_channel_of_gray_is_identity() {
        let frame = Frame::new(vec![1, 2, 3, 4], 2, 2, 1, 0);
        assert_eq!(frame.first_channel(), frame);
    }

    #[test]
    fn test_to_three_channel_replicates_values() {
        let frame = Frame::new(vec![10, 20, 30, 40], 2, 2, 1, 3);
        let color = frame.to_three_channel();
        assert_eq!(color.channels(), 3);
        assert_eq!(color.index(), 3);
        for row in 0..2 {
            for col in 0..2 {
                let v = frame.as_ndarray()[[row, col, 0]];
                for c in 0..3 {
                    assert_eq!(color.as_ndarray()[[row, col, c]], v);
                }
            }
        }
    }

    #[test]
    fn test_to_three_channel_passes_color_through() {
        let frame = rgb_frame(2, 2);
        assert_eq!(frame.to_three_channel(), frame);
    }
}
