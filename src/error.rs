use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("camera enumeration failed: {0}")]
    CameraEnumeration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
