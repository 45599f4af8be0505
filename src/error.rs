//! Error types for the stay engine.
//!
//! Only genuine failures live here. A business key that resolves to nothing is
//! reported as `None` by the service layer, and an unquotable stay is reported
//! as [`QuoteOutcome::Unavailable`](crate::service::QuoteOutcome), so neither
//! appears in this enum.

use thiserror::Error;

/// The main error type for the stay engine.
///
/// # Example
///
/// ```
/// use stay_engine::error::EngineError;
///
/// let error = EngineError::Validation {
///     message: "Room type mismatch".to_string(),
/// };
/// assert_eq!(error.to_string(), "Room type mismatch");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but references are inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is inconsistent.
        message: String,
    },

    /// A request failed validation. The message is shown to the user as-is.
    #[error("{message}")]
    Validation {
        /// A short, actionable message.
        message: String,
    },

    /// The transactional store could not complete a unit of work.
    #[error("Store error: {message}")]
    Store {
        /// A description of the store failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/hotel.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/hotel.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/rate_plans.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/rate_plans.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_validation_displays_bare_message() {
        let error = EngineError::validation("Room is required");
        assert_eq!(error.to_string(), "Room is required");
    }

    #[test]
    fn test_store_error_displays_message() {
        let error = EngineError::Store {
            message: "lock poisoned".to_string(),
        };
        assert_eq!(error.to_string(), "Store error: lock poisoned");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn fails() -> EngineResult<()> {
            Err(EngineError::validation("Amount must be positive"))
        }

        fn propagates() -> EngineResult<()> {
            fails()?;
            Ok(())
        }

        assert!(matches!(
            propagates(),
            Err(EngineError::Validation { .. })
        ));
    }
}
