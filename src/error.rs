use thiserror::Error;

use crate::parse::ParseError;
use crate::{GuildId, ResolutionError, RuleError, Scope};

/// A stored rule could not be compiled into an operator tree.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The external settings store could not supply a guild's permission document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("malformed permission settings for guild {guild}: {source}")]
    Malformed {
        guild: GuildId,
        #[source]
        source: RuleError,
    },
}

/// Unified error returned by [`PermissionChecker`](crate::PermissionChecker).
#[derive(Debug, Error)]
pub enum PermissionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid permission rule for {scope}: {source}")]
    InvalidRule {
        scope: Scope,
        #[source]
        source: CompileError,
    },
}
