use crate::canvas::{Canvas, PixelState};
use crate::geometry::Geometry;

/// The one admission rule for every relocation: the candidate must be a
/// visible pixel (not stride padding, not past the end) that is currently unset.
pub fn can_move<C: Canvas + ?Sized>(canvas: &C, geometry: &Geometry, candidate: u32) -> bool {
    geometry.contains(candidate) && canvas.test_pixel(candidate) == PixelState::Unset
}

/// Apply a signed delta to an offset, `None` when the result leaves `u32`
pub fn shifted(offset: u32, delta: i64) -> Option<u32> {
    u32::try_from(offset as i64 + delta).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Bitmap;

    #[test]
    fn test_can_move() {
        let geometry = Geometry::from_bounds(144, 168).unwrap();
        let mut bitmap = Bitmap::new(geometry);
        let target = geometry.offset(10, 10);

        assert!(can_move(&bitmap, &geometry, target));
        bitmap.draw_pixel(target);
        assert!(!can_move(&bitmap, &geometry, target));

        // padding column, end of buffer, wrapped negative
        assert!(!can_move(&bitmap, &geometry, geometry.offset(150, 10)));
        assert!(!can_move(&bitmap, &geometry, geometry.max_offset));
        assert!(!can_move(&bitmap, &geometry, 0u32.wrapping_sub(1)));
    }

    #[test]
    fn test_shifted() {
        assert_eq!(shifted(10, -3), Some(7));
        assert_eq!(shifted(2, -3), None);
        assert_eq!(shifted(u32::MAX, 1), None);
    }
}
