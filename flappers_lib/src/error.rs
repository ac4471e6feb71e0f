use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid run options: {0}")]
    InvalidOptions(String),

    #[error("failed to write run data")]
    DataSave(#[from] csv::Error),

    #[error("failed to open run data file")]
    DataFile(#[from] std::io::Error),
}
