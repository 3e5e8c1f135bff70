use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Annotation error: {0}")]
    AnnotationError(#[from] attrwire_annotation::AnnotationError),

    #[error("Invalid scan path: {0}")]
    InvalidPath(String),

    #[error("Invalid scan options: {0}")]
    InvalidOptions(String),
}
