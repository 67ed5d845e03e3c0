//! Video frame type

/// Decoded RGB video frame
///
/// One frame is produced per device read and discarded after the pipeline
/// iteration that consumed it.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Frame sequence number
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        debug_assert_eq!(data.len(), (width * height * 3) as usize);
        Self {
            data,
            width,
            height,
            sequence,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Convert to grayscale for the landmark extractor
    pub fn to_grayscale(&self) -> Vec<u8> {
        let mut gray = Vec::with_capacity((self.width * self.height) as usize);
        for pixel in self.data.chunks(3) {
            // Luminance formula: 0.299*R + 0.587*G + 0.114*B
            let y = (pixel[0] as f32 * 0.299
                + pixel[1] as f32 * 0.587
                + pixel[2] as f32 * 0.114) as u8;
            gray.push(y);
        }
        gray
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_length_matches_dimensions() {
        let frame = VideoFrame::new(vec![128; 8 * 4 * 3], 8, 4, 0);
        assert_eq!(frame.to_grayscale().len(), 32);
    }

    #[test]
    fn pixel_access_bounds() {
        let frame = VideoFrame::new(vec![10; 2 * 2 * 3], 2, 2, 0);
        assert_eq!(frame.get_pixel(1, 1), Some([10, 10, 10]));
        assert_eq!(frame.get_pixel(2, 0), None);
    }
}
