/// Closed set of failure classes shared by both handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    StoreAccess,
    Validation,
    NotFound,
    Unexpected,
}

impl ErrorKind {
    /// HTTP status used when the failure is reported through an API response.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Configuration | Self::StoreAccess | Self::Unexpected => 500,
        }
    }

    /// Value of the `error` field in a lookup response body.
    pub fn error_label(self) -> &'static str {
        match self {
            Self::Validation => "Missing required parameter: user_id",
            Self::NotFound => "User mapping not found",
            Self::Configuration | Self::StoreAccess | Self::Unexpected => "Internal server error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    StoreAccess(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unexpected(String),
}

impl IdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::StoreAccess(_) => ErrorKind::StoreAccess,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Configuration(message)
            | Self::StoreAccess(message)
            | Self::Validation(message)
            | Self::NotFound(message)
            | Self::Unexpected(message) => message,
        }
    }
}
