use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Caller input was rejected; nothing was changed.
    #[error("validation_error - {0}")]
    Validation(String),
    /// Stored or configured data could not be understood.
    #[error("invalid_data - {0}")]
    InvalidData(String),
    /// The backing store could not be read or written.
    #[error("persistence_error - {0}")]
    Persistence(String),
}

impl AppError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn persistence<M: Into<String>>(message: M) -> Self {
        Self::Persistence(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidData(_) => "invalid_data",
            Self::Persistence(_) => "persistence_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::InvalidData(message) => message,
            Self::Persistence(message) => message,
        }
    }
}
