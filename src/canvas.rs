#[cfg(test)]
use crate::error::GeometryError;
use crate::font;
use crate::geometry::{Geometry, PixelRect};

/// State of a single monochrome pixel.
///
/// `Unset` is the black background, `Set` is a white particle or text pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelState {
    Set,
    Unset,
}

/// Monochrome drawing surface addressed by linear offset.
///
/// Pixel accessors do not bounds check; callers validate offsets against
/// `geometry()` first.
pub trait Canvas {
    fn geometry(&self) -> Geometry;
    fn test_pixel(&self, offset: u32) -> PixelState;
    fn draw_pixel(&mut self, offset: u32);
    fn clear_pixel(&mut self, offset: u32);
    fn fill_rect(&mut self, rect: PixelRect, state: PixelState);
    /// Draw `text` centered in `rect`, trailing ellipsis on overflow.
    /// `scale` of `None` picks the largest scale that fits.
    fn draw_text(&mut self, text: &str, rect: PixelRect, scale: Option<u32>);
}

/// Owned packed 1-bit-per-pixel bitmap.
///
/// Bit `offset % 8` of byte `offset / 8` holds the pixel; a 1 bit is
/// background, a 0 bit is lit. A fresh bitmap is all background.
#[derive(Debug, Clone)]
pub struct Bitmap {
    geometry: Geometry,
    bits: Vec<u8>,
}

impl Bitmap {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            bits: vec![0xFF; geometry.bytes_required()],
        }
    }

    /// Wrap an existing backing buffer, which must cover every offset below `max_offset`
    #[cfg(test)]
    pub fn from_raw(geometry: Geometry, bits: Vec<u8>) -> Result<Self, GeometryError> {
        let required = geometry.bytes_required();
        if bits.len() < required {
            return Err(GeometryError::BufferTooSmall {
                actual: bits.len(),
                required,
            });
        }
        Ok(Self { geometry, bits })
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Pixel at visible coordinates (false outside the visible rectangle)
    pub fn is_set(&self, col: u32, row: u32) -> bool {
        col < self.geometry.width
            && row < self.geometry.height
            && self.test_pixel(self.geometry.offset(col, row)) == PixelState::Set
    }

    /// Number of lit pixels in the visible rectangle
    #[cfg(test)]
    pub fn lit_count(&self) -> usize {
        (0..self.geometry.height)
            .flat_map(|row| (0..self.geometry.width).map(move |col| (col, row)))
            .filter(|&(col, row)| self.is_set(col, row))
            .count()
    }

    fn fill_clipped(&mut self, rect: PixelRect, state: PixelState) {
        let rect = rect.intersect(&self.geometry.bounds());
        if rect.is_empty() {
            return;
        }
        for row in rect.y..rect.y + rect.height {
            for col in rect.x..rect.x + rect.width {
                let offset = self.geometry.offset(col, row);
                match state {
                    PixelState::Set => self.draw_pixel(offset),
                    PixelState::Unset => self.clear_pixel(offset),
                }
            }
        }
    }
}

impl Canvas for Bitmap {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn test_pixel(&self, offset: u32) -> PixelState {
        if (self.bits[offset as usize / 8] >> (offset % 8)) & 1 == 1 {
            PixelState::Unset
        } else {
            PixelState::Set
        }
    }

    fn draw_pixel(&mut self, offset: u32) {
        self.bits[offset as usize / 8] &= !(1 << (offset % 8));
    }

    fn clear_pixel(&mut self, offset: u32) {
        self.bits[offset as usize / 8] |= 1 << (offset % 8);
    }

    fn fill_rect(&mut self, rect: PixelRect, state: PixelState) {
        self.fill_clipped(rect, state);
    }

    fn draw_text(&mut self, text: &str, rect: PixelRect, scale: Option<u32>) {
        let scale = scale.unwrap_or_else(|| font::fit_scale(text, rect)).max(1);
        let clip = rect.intersect(&self.geometry.bounds());
        for placement in font::layout(text, rect, scale) {
            for row in 0..font::GLYPH_HEIGHT {
                for col in 0..font::GLYPH_WIDTH {
                    if placement.glyph.is_lit(col, row) {
                        let dot = PixelRect::new(
                            placement.x + col * scale,
                            placement.y + row * scale,
                            scale,
                            scale,
                        );
                        self.fill_clipped(dot.intersect(&clip), PixelState::Set);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(width: u32, height: u32) -> Bitmap {
        Bitmap::new(Geometry::from_bounds(width, height).unwrap())
    }

    #[test]
    fn test_new_bitmap_is_background() {
        let bitmap = bitmap(144, 168);
        assert_eq!(bitmap.lit_count(), 0);
        assert_eq!(bitmap.test_pixel(0), PixelState::Unset);
        assert_eq!(bitmap.as_bytes().len(), (167 * 160 + 144) / 8);
    }

    #[test]
    fn test_bit_layout_is_lsb_first_inverted() {
        let mut bitmap = bitmap(16, 2);
        bitmap.draw_pixel(3);
        assert_eq!(bitmap.as_bytes()[0], !0b0000_1000);
        assert_eq!(bitmap.test_pixel(3), PixelState::Set);
        bitmap.clear_pixel(3);
        assert_eq!(bitmap.as_bytes()[0], 0xFF);
    }

    #[test]
    fn test_fill_rect_clips_to_visible_area() {
        let mut bitmap = bitmap(10, 10);
        bitmap.fill_rect(PixelRect::new(8, 8, 5, 5), PixelState::Set);
        assert_eq!(bitmap.lit_count(), 4);
        // stride padding untouched
        let geometry = bitmap.geometry();
        assert_eq!(bitmap.test_pixel(geometry.offset(10, 8)), PixelState::Unset);

        bitmap.fill_rect(geometry.bounds(), PixelState::Unset);
        assert_eq!(bitmap.lit_count(), 0);
    }

    #[test]
    fn test_draw_text_stays_inside_rect() {
        let mut bitmap = bitmap(144, 168);
        let rect = bitmap.geometry().label_rect();
        bitmap.draw_text("12:34", rect, None);
        assert!(bitmap.lit_count() > 0);
        for row in 0..168 {
            for col in 0..144 {
                if bitmap.is_set(col, row) {
                    assert!(row >= rect.y && row < rect.y + rect.height);
                }
            }
        }
    }

    #[test]
    fn test_from_raw_rejects_short_buffer() {
        let geometry = Geometry::from_bounds(144, 168).unwrap();
        let short = vec![0xFF; geometry.bytes_required() - 1];
        assert_eq!(
            Bitmap::from_raw(geometry, short).unwrap_err(),
            GeometryError::BufferTooSmall {
                actual: geometry.bytes_required() - 1,
                required: geometry.bytes_required(),
            }
        );
        assert!(Bitmap::from_raw(geometry, vec![0xFF; geometry.bytes_required()]).is_ok());
    }
}
