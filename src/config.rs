use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DefaultPredicate;

/// What a scope contributes when its stored rule fails to resolve or parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileFailurePolicy {
    /// Fail the whole check with [`PermissionError::InvalidRule`](crate::PermissionError::InvalidRule).
    Deny,
    /// Treat the broken scope as unrestricted and log a warning.
    Unrestricted,
}

pub const DEFAULT_COMPILE_FAILURE_POLICY: CompileFailurePolicy = CompileFailurePolicy::Deny;

impl Default for CompileFailurePolicy {
    fn default() -> Self {
        DEFAULT_COMPILE_FAILURE_POLICY
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid checker config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Settings for a [`PermissionChecker`](crate::PermissionChecker).
///
/// ```toml
/// compile_failure_policy = "deny"
/// slash_literal = "SLASH"
/// message_literal = "MESSAGE"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    pub compile_failure_policy: CompileFailurePolicy,
    pub slash_literal: String,
    pub message_literal: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            compile_failure_policy: DEFAULT_COMPILE_FAILURE_POLICY,
            slash_literal: "SLASH".to_owned(),
            message_literal: "MESSAGE".to_owned(),
        }
    }
}

impl CheckerConfig {
    /// Parse and validate a TOML config. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML, unknown keys, or invalid values.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: CheckerConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O failure or any error from
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for empty or identical invocation literals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slash_literal.is_empty() {
            return Err(ConfigError::Invalid {
                field: "slash_literal",
                reason: "must not be empty",
            });
        }
        if self.message_literal.is_empty() {
            return Err(ConfigError::Invalid {
                field: "message_literal",
                reason: "must not be empty",
            });
        }
        if self.slash_literal == self.message_literal {
            return Err(ConfigError::Invalid {
                field: "message_literal",
                reason: "must differ from slash_literal",
            });
        }
        Ok(())
    }

    /// The leaf predicate described by this config.
    #[must_use]
    pub fn predicate(&self) -> DefaultPredicate {
        DefaultPredicate::new(self.slash_literal.clone(), self.message_literal.clone())
    }
}
