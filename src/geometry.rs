use crate::error::GeometryError;

/// Row pitch alignment of the backing bitmap, in pixels
pub const STRIDE_ALIGN: u32 = 32;

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Intersection with another rectangle (zero-sized when disjoint)
    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        PixelRect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Visible bounds of a packed 1-bit canvas and the derived offset space.
///
/// Offsets address pixels linearly as `row * stride + col`. Columns in
/// `width..stride` are padding and never hold a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub max_offset: u32,
}

impl Geometry {
    /// Geometry for the given bounds with the stride rounded up to `STRIDE_ALIGN`
    pub fn from_bounds(width: u32, height: u32) -> Result<Self, GeometryError> {
        let stride = width
            .div_ceil(STRIDE_ALIGN)
            .checked_mul(STRIDE_ALIGN)
            .ok_or(GeometryError::TooLarge { width, height })?;
        Self::with_stride(width, height, stride)
    }

    /// Geometry with an explicit row pitch
    pub fn with_stride(width: u32, height: u32, stride: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::Empty { width, height });
        }
        if stride < width {
            return Err(GeometryError::StrideTooNarrow { stride, width });
        }
        // Shake jumps span twice the offset space, so that must fit as well.
        let span = height as u64 * stride as u64 * 2;
        if span > u32::MAX as u64 {
            return Err(GeometryError::TooLarge { width, height });
        }
        Ok(Self {
            width,
            height,
            stride,
            max_offset: (height - 1) * stride + width,
        })
    }

    /// True if the fields agree with each other, as the constructors guarantee
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.stride >= self.width
            && (self.height - 1)
                .checked_mul(self.stride)
                .and_then(|v| v.checked_add(self.width))
                == Some(self.max_offset)
    }

    /// Offset of a visible pixel
    pub fn offset(&self, col: u32, row: u32) -> u32 {
        row * self.stride + col
    }

    pub fn col(&self, offset: u32) -> u32 {
        offset % self.stride
    }

    #[cfg(test)]
    pub fn row(&self, offset: u32) -> u32 {
        offset / self.stride
    }

    /// True if the offset lies inside the visible rectangle (not in stride padding)
    pub fn contains(&self, offset: u32) -> bool {
        offset < self.max_offset && self.col(offset) < self.width
    }

    /// Bytes a packed 1-bit buffer needs to cover every offset below `max_offset`
    pub fn bytes_required(&self) -> usize {
        (self.max_offset as usize).div_ceil(8)
    }

    /// Whole visible rectangle
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// Band the clock label is centered in, scaled from a 144x168 layout
    pub fn label_rect(&self) -> PixelRect {
        let y = self.height * 60 / 168;
        let height = (self.height * 50 / 168).max(1);
        PixelRect::new(0, y, self.width, height.min(self.height - y))
    }

    /// Distance, in columns and rows, the settle pass hops when relocating
    pub fn settle_hop(&self) -> u32 {
        (self.stride - self.width).max(1)
    }
}
