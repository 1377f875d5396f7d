use thiserror::Error;

/// Validation and parsing errors raised by pure domain logic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrmError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid column mapping: {0}")]
    InvalidMapping(String),

    #[error("unreadable workbook: {0}")]
    Workbook(String),
}

impl CrmError {
    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue { field, value: value.into() }
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;
