// crates/common/src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Price feed error: {0}")]
    PriceFeed(String),

    #[error("Signal provider error: {0}")]
    SignalProvider(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::PriceFeed(_) | Error::RateLimit(_)
        )
    }

    /// The offending field when this is a rejected input.
    pub fn validation_field(&self) -> Option<&str> {
        match self {
            Error::Validation(e) => Some(e.field()),
            _ => None,
        }
    }
}

/// Contract violations on analysis inputs. Every variant names the field it
/// was raised for, e.g. `tokenomics.supply` or `checks`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field}: expected {expected} entries, got {actual}")]
    Cardinality {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("{field}: unknown entry `{key}`")]
    UnknownKey { field: String, key: String },

    #[error("{field}: score {value} outside [{min}, {max}]")]
    ScoreOutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field}: unknown tag `{tag}`, expected one of {expected}")]
    UnknownTag {
        field: String,
        tag: String,
        expected: String,
    },

    #[error("{field}: negative price {value}")]
    NegativePrice { field: String, value: f64 },

    #[error("{field}: value {value} is not finite")]
    NotFinite { field: String, value: f64 },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Cardinality { field, .. }
            | ValidationError::UnknownKey { field, .. }
            | ValidationError::ScoreOutOfRange { field, .. }
            | ValidationError::UnknownTag { field, .. }
            | ValidationError::NegativePrice { field, .. }
            | ValidationError::NotFinite { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_field_is_exposed() {
        let err: Error = ValidationError::ScoreOutOfRange {
            field: "tokenomics.vesting".to_string(),
            value: 6,
            min: 1,
            max: 5,
        }
        .into();

        assert_eq!(err.validation_field(), Some("tokenomics.vesting"));
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Validation failed: tokenomics.vesting: score 6 outside [1, 5]"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::RateLimit("429".to_string()).is_retryable());
        assert!(Error::PriceFeed("502".to_string()).is_retryable());
        assert!(!Error::Config("bad".to_string()).is_retryable());
        assert_eq!(Error::InvalidData("x".to_string()).validation_field(), None);
    }
}
