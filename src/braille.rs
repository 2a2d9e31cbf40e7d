use crate::canvas::Bitmap;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// A single rendered Braille cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
}

/// Render the bitmap one pixel per Braille dot. Only cells with a lit dot are emitted.
pub fn render_bitmap_to_braille(bitmap: &Bitmap, canvas_width: u16, canvas_height: u16) -> Vec<BrailleCell> {
    let mut cells = Vec::new();

    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let base_col = cx as u32 * 2;
            let base_row = cy as u32 * 4;
            let mut pattern: u8 = 0;

            for (dx, column) in BRAILLE_DOTS.iter().enumerate() {
                for (dy, bit) in column.iter().enumerate() {
                    if bitmap.is_set(base_col + dx as u32, base_row + dy as u32) {
                        pattern |= bit;
                    }
                }
            }

            if pattern != 0 {
                cells.push(BrailleCell {
                    x: cx,
                    y: cy,
                    char: char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' '),
                });
            }
        }
    }

    cells
}

/// Bitmap size in pixels for a canvas of terminal cells
/// Returns (width, height), never smaller than 1x1
pub fn calculate_bitmap_size(canvas_width: u16, canvas_height: u16) -> (u32, u32) {
    // Braille gives 2x4 resolution per character
    let width = (canvas_width as u32 * 2).max(1);
    let height = (canvas_height as u32 * 4).max(1);
    (width, height)
}
