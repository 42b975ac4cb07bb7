use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid natural size {width}x{height}: both dimensions must be positive")]
    InvalidNaturalSize { width: f64, height: f64 },

    #[error("invalid selection region: {0}")]
    InvalidRegion(String),
}
