
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Unrecognized spec: {0}")]
    UnrecognizedSpec(String),
    #[error("Invalid pattern: {0}")]
    Pattern(String),
    #[error("Setter failed: {0}")]
    Setter(String),
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

pub type Result<T> = std::result::Result<T, SiftError>;

// Helper conversions
impl From<regex::Error> for SiftError {
    fn from(e: regex::Error) -> Self { Self::Pattern(e.to_string()) }
}
