//! Video frames and the source that supplies them.

use ndarray::Array3;

use crate::error::{Error, Result};

/// Interleaved 8-bit image, indexed `[row, column, channel]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Array3<u8>,
}

impl Frame {
    pub fn new(pixels: Array3<u8>) -> Self {
        Self { pixels }
    }

    /// Wrap a row-major interleaved buffer, e.g. RGBA from a canvas.
    pub fn from_raw(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Result<Self> {
        let shape = (height as usize, width as usize, channels as usize);
        let pixels = Array3::from_shape_vec(shape, data).map_err(|e| {
            Error::Frame(format!(
                "buffer does not match {width}x{height}x{channels}: {e}"
            ))
        })?;
        Ok(Self { pixels })
    }

    /// Solid-colour frame, handy for tests and placeholders.
    pub fn blank(width: u32, height: u32, channels: u32) -> Self {
        Self {
            pixels: Array3::zeros((height as usize, width as usize, channels as usize)),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    pub fn channels(&self) -> u32 {
        self.pixels.dim().2 as u32
    }

    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Nearest-neighbour downscale so the frame is at most `max_width` wide,
    /// keeping the aspect ratio. Narrower frames are returned unchanged.
    pub fn downscaled(self, max_width: u32) -> Frame {
        let (src_h, src_w, channels) = self.pixels.dim();
        let max_width = max_width as usize;
        if src_w <= max_width || src_w == 0 || max_width == 0 {
            return self;
        }

        let dst_w = max_width;
        let dst_h = ((src_h as f64 * dst_w as f64 / src_w as f64).round() as usize).max(1);

        let pixels = Array3::from_shape_fn((dst_h, dst_w, channels), |(y, x, c)| {
            let sy = (y * src_h / dst_h).min(src_h - 1);
            let sx = (x * src_w / dst_w).min(src_w - 1);
            self.pixels[[sy, sx, c]]
        });
        Frame { pixels }
    }
}

/// Pull-based access to the live video.
pub trait FrameSource: Send + Sync + 'static {
    /// Whether enough data is buffered to read a frame.
    fn is_ready(&self) -> bool;

    /// Current `(width, height)` in pixels; zero while unknown.
    fn dimensions(&self) -> (u32, u32);

    /// Copy out the current frame.
    fn read_frame(&self) -> Result<Frame>;

    /// Ready and with a non-empty picture.
    fn has_frame(&self) -> bool {
        let (w, h) = self.dimensions();
        self.is_ready() && w > 0 && h > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_checks_length() {
        assert!(Frame::from_raw(4, 2, 3, vec![0; 24]).is_ok());
        assert!(matches!(
            Frame::from_raw(4, 2, 3, vec![0; 23]),
            Err(Error::Frame(_))
        ));
    }

    #[test]
    fn test_downscale_keeps_aspect_ratio() {
        let frame = Frame::blank(1280, 720, 4).downscaled(640);
        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 360);
        assert_eq!(frame.channels(), 4);
    }

    #[test]
    fn test_narrow_frame_untouched() {
        let frame = Frame::blank(320, 240, 3).downscaled(640);
        assert_eq!((frame.width(), frame.height()), (320, 240));
    }

    #[test]
    fn test_downscale_samples_nearest_pixel() {
        // 4x1 frame, one channel: 0, 10, 20, 30
        let frame = Frame::from_raw(4, 1, 1, vec![0, 10, 20, 30]).unwrap();
        let small = frame.downscaled(2);
        assert_eq!(small.pixels().as_slice().unwrap(), &[0, 20]);
    }
}
