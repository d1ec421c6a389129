
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MimeoError {
    #[error("Unsupported type: {0}")]
    UnsupportedType(&'static str),
    #[error("Pattern error: {0}")]
    Pattern(String),
}

pub type Result<T> = std::result::Result<T, MimeoError>;

// Helper conversions
impl From<regex::Error> for MimeoError {
    fn from(e: regex::Error) -> Self { Self::Pattern(e.to_string()) }
}
