use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Nothing to pack: input list is empty")]
    Empty,

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Packing error: {0}")]
    Packing(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
