use crate::geometry::PixelRect;

/// 5x7 bitmap glyphs for the clock label.
///
/// Each row is 5 bits wide, bit 4 is the leftmost column.
pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SPACING: u32 = 1;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + GLYPH_SPACING;

/// Largest automatic scale, keeps huge terminals from drawing a wall of text
const MAX_AUTO_SCALE: u32 = 16;

#[derive(Debug, PartialEq, Eq)]
pub struct Glyph {
    rows: [u8; GLYPH_HEIGHT as usize],
}

impl Glyph {
    const fn new(rows: [u8; GLYPH_HEIGHT as usize]) -> Self {
        Self { rows }
    }

    pub fn is_lit(&self, col: u32, row: u32) -> bool {
        col < GLYPH_WIDTH
            && row < GLYPH_HEIGHT
            && (self.rows[row as usize] >> (GLYPH_WIDTH - 1 - col)) & 1 == 1
    }
}

static DIGITS: [Glyph; 10] = [
    Glyph::new([0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
    Glyph::new([0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    Glyph::new([0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
    Glyph::new([0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E]),
    Glyph::new([0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
    Glyph::new([0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
    Glyph::new([0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
    Glyph::new([0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    Glyph::new([0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
    Glyph::new([0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
];

static COLON: Glyph = Glyph::new([0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00]);
static SPACE: Glyph = Glyph::new([0x00; 7]);
static LETTER_A: Glyph = Glyph::new([0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]);
static LETTER_P: Glyph = Glyph::new([0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]);
static LETTER_M: Glyph = Glyph::new([0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11]);
static PERIOD: Glyph = Glyph::new([0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C]);
static DASH: Glyph = Glyph::new([0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00]);
static UNKNOWN: Glyph = Glyph::new([0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04]);
pub static ELLIPSIS: Glyph = Glyph::new([0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x15]);

pub fn glyph_for(ch: char) -> &'static Glyph {
    match ch {
        '0'..='9' => &DIGITS[ch as usize - '0' as usize],
        ':' => &COLON,
        ' ' => &SPACE,
        'A' | 'a' => &LETTER_A,
        'P' | 'p' => &LETTER_P,
        'M' | 'm' => &LETTER_M,
        '.' => &PERIOD,
        '-' => &DASH,
        '…' => &ELLIPSIS,
        _ => &UNKNOWN,
    }
}

/// A glyph positioned at its top-left pixel
#[derive(Debug)]
pub struct Placement {
    pub glyph: &'static Glyph,
    pub x: u32,
    pub y: u32,
}

/// Width in pixels of `count` glyphs at `scale`
pub fn text_width(count: u32, scale: u32) -> u32 {
    if count == 0 {
        0
    } else {
        (count * GLYPH_ADVANCE - GLYPH_SPACING) * scale
    }
}

/// Largest integer scale at which `text` fits inside `rect` (at least 1)
pub fn fit_scale(text: &str, rect: PixelRect) -> u32 {
    let count = text.chars().count() as u32;
    let mut scale = 1;
    while scale < MAX_AUTO_SCALE
        && text_width(count, scale + 1) <= rect.width
        && GLYPH_HEIGHT * (scale + 1) <= rect.height
    {
        scale += 1;
    }
    scale
}

/// Lay `text` out centered in `rect`, replacing the overflowing tail with an ellipsis
pub fn layout(text: &str, rect: PixelRect, scale: u32) -> Vec<Placement> {
    let scale = scale.max(1);
    let mut glyphs: Vec<&'static Glyph> = text.chars().map(glyph_for).collect();

    if text_width(glyphs.len() as u32, scale) > rect.width {
        let kept = (0..glyphs.len())
            .rev()
            .find(|&k| text_width(k as u32 + 1, scale) <= rect.width);
        match kept {
            Some(k) => {
                glyphs.truncate(k);
                glyphs.push(&ELLIPSIS);
            }
            None => return Vec::new(),
        }
    }

    let width = text_width(glyphs.len() as u32, scale);
    let x0 = rect.x + (rect.width - width) / 2;
    let y0 = rect.y + rect.height.saturating_sub(GLYPH_HEIGHT * scale) / 2;

    glyphs
        .into_iter()
        .enumerate()
        .map(|(i, glyph)| Placement {
            glyph,
            x: x0 + i as u32 * GLYPH_ADVANCE * scale,
            y: y0,
        })
        .collect()
}
