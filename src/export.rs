use crate::canvas::{Bitmap, Canvas};
use crate::error::ExportError;
use crate::geometry::Geometry;
use gif::{Encoder, Repeat};
use image::{GrayImage, ImageFormat, Luma};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Black background, white snow
const PALETTE: [u8; 6] = [0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF];

/// Visible rectangle as an 8-bit grayscale image (lit = 255)
pub fn to_gray_image(bitmap: &Bitmap) -> GrayImage {
    let geometry = bitmap.geometry();
    GrayImage::from_fn(geometry.width, geometry.height, |x, y| {
        Luma([if bitmap.is_set(x, y) { 255 } else { 0 }])
    })
}

/// Write the visible rectangle to a PNG file
pub fn save_png(bitmap: &Bitmap, path: &Path) -> Result<(), ExportError> {
    to_gray_image(bitmap).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Timestamped snapshot file name inside `dir`
pub fn snapshot_path(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("snow-{}.png", stamp))
}

/// Streams rendered frames into a looping two-color GIF
pub struct GifRecorder<W: Write> {
    encoder: Encoder<W>,
    width: u16,
    height: u16,
    /// Frame delay in hundredths of a second
    delay: u16,
    frames: usize,
}

impl GifRecorder<BufWriter<File>> {
    pub fn create(path: &Path, geometry: &Geometry, frame_delay: Duration) -> Result<Self, ExportError> {
        let file = BufWriter::new(File::create(path)?);
        Self::new(file, geometry, frame_delay)
    }
}

impl<W: Write> GifRecorder<W> {
    pub fn new(writer: W, geometry: &Geometry, frame_delay: Duration) -> Result<Self, ExportError> {
        let too_large = || ExportError::FrameTooLarge {
            width: geometry.width,
            height: geometry.height,
        };
        let width = u16::try_from(geometry.width).map_err(|_| too_large())?;
        let height = u16::try_from(geometry.height).map_err(|_| too_large())?;

        let mut encoder = Encoder::new(writer, width, height, &PALETTE)?;
        encoder.set_repeat(Repeat::Infinite)?;
        let delay = (frame_delay.as_millis() / 10).clamp(1, u16::MAX as u128) as u16;

        Ok(Self {
            encoder,
            width,
            height,
            delay,
            frames: 0,
        })
    }

    /// Append the bitmap as the next frame
    pub fn push(&mut self, bitmap: &Bitmap) -> Result<(), ExportError> {
        let mut indices = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in 0..self.height as u32 {
            for col in 0..self.width as u32 {
                indices.push(u8::from(bitmap.is_set(col, row)));
            }
        }

        let frame = gif::Frame {
            width: self.width,
            height: self.height,
            delay: self.delay,
            buffer: Cow::Owned(indices),
            ..gif::Frame::default()
        };
        self.encoder.write_frame(&frame)?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Write the trailer and hand back the writer
    pub fn finish(self) -> Result<W, ExportError> {
        Ok(self.encoder.into_inner()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_bitmap() -> Bitmap {
        let geometry = Geometry::from_bounds(20, 12).unwrap();
        let mut bitmap = Bitmap::new(geometry);
        bitmap.draw_pixel(geometry.offset(3, 4));
        bitmap.draw_pixel(geometry.offset(19, 11));
        bitmap
    }

    #[test]
    fn test_png_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.png");
        save_png(&sample_bitmap(), &path).unwrap();

        let image = image::open(&path).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (20, 12));
        assert_eq!(image.get_pixel(3, 4)[0], 255);
        assert_eq!(image.get_pixel(19, 11)[0], 255);
        assert_eq!(image.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_snapshot_path_is_png_in_dir() {
        let path = snapshot_path(Path::new("/tmp"));
        assert_eq!(path.parent(), Some(Path::new("/tmp")));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    }

    #[test]
    fn test_gif_recording() {
        let bitmap = sample_bitmap();
        let mut recorder =
            GifRecorder::new(Vec::new(), &bitmap.geometry(), Duration::from_millis(50)).unwrap();
        for _ in 0..3 {
            recorder.push(&bitmap).unwrap();
        }
        assert_eq!(recorder.frames(), 3);
        let bytes = recorder.finish().unwrap();
        assert!(bytes.starts_with(b"GIF89a"));

        let mut decoder = gif::DecodeOptions::new().read_info(&bytes[..]).unwrap();
        assert_eq!((decoder.width(), decoder.height()), (20, 12));
        let mut frames = 0;
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            assert_eq!(frame.delay, 5);
            frames += 1;
        }
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_gif_rejects_oversized_canvas() {
        let geometry = Geometry::from_bounds(70_000, 2).unwrap();
        let result = GifRecorder::new(Vec::new(), &geometry, Duration::from_millis(50));
        assert!(matches!(result, Err(ExportError::FrameTooLarge { .. })));
    }
}
