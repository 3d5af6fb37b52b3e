use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shader compilation failed for `{entry_point}`:\n{message}")]
    ShaderCompile { entry_point: String, message: String },

    #[error("Shader include not found: {0}")]
    MissingInclude(PathBuf),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Frame capture failed: {0}")]
    Capture(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Unknown layer index {index} (collection has {count} layers)")]
    UnknownLayer { index: usize, count: usize },

    #[error("UI error: {0}")]
    Iced(#[from] iced::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
