use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid value for {field}: expected {expected}, got '{value}'")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },
    #[error("unknown core field: {0}")]
    UnknownCoreField(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
