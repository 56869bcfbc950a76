use std::fmt;

use super::error::ResolutionError;
use super::ids::{ChannelId, RoleId};

/// A leaf as written in a stored rule, before any guild lookup.
///
/// Stored leaves carry a one-character discriminator: `r<role name>`,
/// `c<channel name>` or `t<literal>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeafRef {
    Role(String),
    Channel(String),
    Literal(String),
}

impl LeafRef {
    /// Split a raw leaf string into its discriminator and payload.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::EmptyLeaf`] for an empty string and
    /// [`ResolutionError::UnknownDiscriminator`] for any prefix other than `r`, `c` or `t`.
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let mut chars = raw.chars();
        let discriminator = chars.next().ok_or(ResolutionError::EmptyLeaf)?;
        let payload = chars.as_str().to_owned();
        match discriminator {
            'r' => Ok(LeafRef::Role(payload)),
            'c' => Ok(LeafRef::Channel(payload)),
            't' => Ok(LeafRef::Literal(payload)),
            other => Err(ResolutionError::UnknownDiscriminator {
                leaf: raw.to_owned(),
                discriminator: other,
            }),
        }
    }

    #[must_use]
    pub fn discriminator(&self) -> char {
        match self {
            LeafRef::Role(_) => 'r',
            LeafRef::Channel(_) => 'c',
            LeafRef::Literal(_) => 't',
        }
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        match self {
            LeafRef::Role(s) | LeafRef::Channel(s) | LeafRef::Literal(s) => s,
        }
    }
}

impl fmt::Display for LeafRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.discriminator(), self.payload())
    }
}

/// A leaf bound to a concrete guild entity, ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedLeaf {
    Role(RoleId),
    Channel(ChannelId),
    Literal(String),
}

/// Mention-style rendering: `<@&role>`, `<#channel>`, or the literal text.
impl fmt::Display for ResolvedLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedLeaf::Role(id) => write!(f, "<@&{id}>"),
            ResolvedLeaf::Channel(id) => write!(f, "<#{id}>"),
            ResolvedLeaf::Literal(text) => write!(f, "{text}"),
        }
    }
}
