use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarrelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown value '{value}' for compiler option '{option}'")]
    UnknownOption { option: &'static str, value: String },

    /// A module specifier that static analysis guarantees to be a string
    /// literal was something else. Never expected on well-formed input.
    #[error("Expected a string literal module specifier in {file} at offset {offset}")]
    InvalidModuleSpecifier { file: String, offset: u32 },

    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },
}

pub type Result<T> = std::result::Result<T, BarrelError>;
