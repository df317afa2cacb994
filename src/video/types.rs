use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::annotation::Bgr;
use crate::error::Result;

/// Represents a single video frame
///
/// Pixels are packed as `bgr24`, the layout ffmpeg hands us on the decode pipe
/// and expects back on the encode pipe. One buffer is reused for the whole
/// render, so drawing happens in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: Bgr) -> Self {
        let data = color.0.repeat(width as usize * height as usize);
        Self { width, height, data }
    }

    /// Create a frame from packed `bgr24` bytes
    pub fn from_bgr_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == Self::byte_len(width, height)).then_some(Self { width, height, data })
    }

    /// Number of bytes in a `width x height` bgr24 frame
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.height
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Get a pixel at the given coordinates
    pub fn get_pixel(&self, x: u32, y: u32) -> Bgr {
        let i = self.offset(x, y);
        Bgr([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Bgr) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&color.0);
    }

    /// Write a pixel given signed coordinates, ignoring anything off-frame
    pub fn put(&mut self, x: i32, y: i32, color: Bgr) {
        if self.contains(x, y) {
            self.set_pixel(x as u32, y as u32, color);
        }
    }

    /// Composite `color` over the existing pixel: `alpha * color + (1 - alpha) * pixel`
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Bgr, alpha: f32) {
        let i = self.offset(x, y);
        for (dst, src) in self.data[i..i + 3].iter_mut().zip(color.0) {
            let mixed = alpha * src as f32 + (1.0 - alpha) * *dst as f32;
            *dst = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Raw bgr24 bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes, used by decoders to fill the buffer in place
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Convert to an RGB image for export
    pub fn to_rgb_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let px = self.get_pixel(x, y);
            Rgb([px.r(), px.g(), px.b()])
        })
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> std::result::Result<(), image::ImageError> {
        self.to_rgb_image().save(path)
    }
}

/// Properties of a source video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Reported or estimated; the decoder runs until the stream ends regardless
    pub frame_count: u64,
    pub duration: f64,
    pub has_audio: bool,
}

/// Produces decoded frames in presentation order
pub trait FrameSource {
    fn metadata(&self) -> &VideoMetadata;

    /// Decode the next frame into `frame`. Returns `false` once the stream is exhausted.
    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool>;

    /// Release the decoder
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Stop early after a failure elsewhere, without reporting the decoder's status
    fn abort(self)
    where
        Self: Sized,
    {
    }
}

/// Consumes rendered frames
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and release the encoder
    fn finish(self) -> Result<()>
    where
        Self: Sized;

    /// Discard the output after a failure elsewhere
    fn abort(self)
    where
        Self: Sized,
    {
    }
}
