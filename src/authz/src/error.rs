//! Error types for attribute constraint evaluation

use thiserror::Error;

/// Malformed regular expression in a constraint
#[derive(Debug, Clone, Error)]
#[error("Invalid pattern '{pattern}': {message}")]
pub struct PatternError {
    /// Pattern source as declared on the constraint
    pub pattern: String,

    /// Compiler diagnostic
    pub message: String,
}

impl PatternError {
    pub(crate) fn new(pattern: impl Into<String>, err: &regex::Error) -> Self {
        Self {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }
}

/// Custom validator reference could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorResolutionError {
    /// Constraint selected the custom strategy without naming a validator
    #[error("Constraint has no contains, matches or validator set")]
    Missing,

    /// No validator registered under the given id
    #[error("Validator not registered: {0}")]
    Unregistered(String),
}

/// Crate-level errors
#[derive(Debug, Error)]
pub enum AttrsError {
    /// Invalid regular expression
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Unresolvable custom validator
    #[error(transparent)]
    ValidatorResolution(#[from] ValidatorResolutionError),

    /// Invalid rules configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AttrsError {
    /// True for errors caused by a misdeclared rule rather than by the request.
    ///
    /// Hosts map these to an internal error, never to an access denial.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            AttrsError::Pattern(_) | AttrsError::ValidatorResolution(_) | AttrsError::Config(_)
        )
    }
}

/// Result type for evaluation operations
pub type Result<T> = std::result::Result<T, AttrsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_defects() {
        let err = regex::Regex::new("(").unwrap_err();
        assert!(AttrsError::from(PatternError::new("(", &err)).is_configuration_defect());
        assert!(AttrsError::from(ValidatorResolutionError::Missing).is_configuration_defect());
        assert!(AttrsError::Config("dup".into()).is_configuration_defect());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "rules.json");
        assert!(!AttrsError::from(io).is_configuration_defect());
    }

    #[test]
    fn test_pattern_error_display() {
        let err = regex::Regex::new("[a-").unwrap_err();
        let pattern = PatternError::new("[a-", &err);
        assert!(pattern.to_string().starts_with("Invalid pattern '[a-'"));
    }
}
