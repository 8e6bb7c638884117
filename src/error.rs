use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("thread catalog cannot be empty")]
    EmptyCatalog,

    #[error("thread catalog has {0} entries, more than the supported 65535")]
    CatalogTooLarge(usize),

    #[error("grid dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("max_colors must be between 1 and 30, got {0}")]
    InvalidMaxColors(u32),
}
