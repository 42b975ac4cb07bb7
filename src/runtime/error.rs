use thiserror::Error;

use crate::model::CoreError;

use super::GeneDataError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("model error: {0}")]
    Core(#[from] CoreError),

    #[error("gene data error: {0}")]
    GeneData(#[from] GeneDataError),
}
