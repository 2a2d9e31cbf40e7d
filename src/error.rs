use thiserror::Error;

/// Host-supplied canvas bounds that the simulation cannot safely address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("canvas must be at least 1x1 pixels, got {width}x{height}")]
    Empty { width: u32, height: u32 },

    #[error("row stride {stride} is narrower than the visible width {width}")]
    StrideTooNarrow { stride: u32, width: u32 },

    #[error("a {width}x{height} canvas does not fit a 32-bit offset space")]
    TooLarge { width: u32, height: u32 },

    #[cfg(test)]
    #[error("backing buffer holds {actual} bytes but the canvas needs {required}")]
    BufferTooSmall { actual: usize, required: usize },
}

/// Errors raised while reading or writing the JSON config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while exporting snapshots or recordings.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write export file")]
    Io(#[from] std::io::Error),

    #[error("failed to encode PNG snapshot")]
    Image(#[from] image::ImageError),

    #[error("failed to encode GIF recording")]
    Gif(#[from] gif::EncodingError),

    #[error("a {width}x{height} canvas is too large for a GIF frame")]
    FrameTooLarge { width: u32, height: u32 },
}
