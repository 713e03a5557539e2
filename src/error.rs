use thiserror::Error;

pub type GeoResult<T> = Result<T, GeoError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    /// A count or slice length that cannot be honored. Coordinate values are never rejected.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl GeoError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = GeoError::invalid_argument("count must be >= 0, got -1");
        assert_eq!(err.to_string(), "Invalid argument: count must be >= 0, got -1");
    }
}
