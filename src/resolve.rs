//! Leaf resolution.
//!
//! Resolution runs in two passes: [`collect_leaves`] walks a tree and gathers
//! the distinct leaves it references, then [`resolve_leaves`] looks each one up
//! through an [`EntityResolver`]. The resulting [`ResolvedLeaves`] table is what
//! the synchronous linearizer consumes, so no I/O is interleaved with tree walks.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tracing::trace;

use crate::{ChannelId, ConditionTree, GuildId, LeafRef, ResolutionError, ResolvedLeaf, RoleId};

/// Name-based lookups against the chat platform, supplied by the host.
#[async_trait]
pub trait EntityResolver: Send + Sync {
    /// Look up a role of `guild` by name.
    async fn role(&self, guild: GuildId, name: &str) -> Option<RoleId>;

    /// Look up a channel of `guild` by name.
    async fn channel(&self, guild: GuildId, name: &str) -> Option<ChannelId>;
}

/// Gather the distinct leaves referenced by `tree`.
///
/// # Errors
///
/// Returns [`ResolutionError`] if any leaf has an empty or unknown discriminator.
pub fn collect_leaves(tree: &ConditionTree) -> Result<BTreeSet<LeafRef>, ResolutionError> {
    let mut leaves = BTreeSet::new();
    collect_leaves_inner(tree, &mut leaves)?;
    Ok(leaves)
}

fn collect_leaves_inner(
    tree: &ConditionTree,
    leaves: &mut BTreeSet<LeafRef>,
) -> Result<(), ResolutionError> {
    match tree {
        ConditionTree::Empty => Ok(()),
        ConditionTree::Leaf(raw) => {
            leaves.insert(LeafRef::parse(raw)?);
            Ok(())
        }
        ConditionTree::And(a, b) | ConditionTree::Or(a, b) => {
            collect_leaves_inner(a, leaves)?;
            collect_leaves_inner(b, leaves)
        }
        ConditionTree::Not(inner) => collect_leaves_inner(inner, leaves),
    }
}

/// Look up every leaf in `leaves` for `guild`.
///
/// # Errors
///
/// Returns [`ResolutionError::UnknownRole`] or [`ResolutionError::UnknownChannel`]
/// for the first name the resolver does not know.
pub async fn resolve_leaves(
    guild: GuildId,
    leaves: BTreeSet<LeafRef>,
    resolver: &dyn EntityResolver,
) -> Result<ResolvedLeaves, ResolutionError> {
    let mut resolved = HashMap::with_capacity(leaves.len());
    for leaf in leaves {
        let value = match &leaf {
            LeafRef::Role(name) => resolver
                .role(guild, name)
                .await
                .map(ResolvedLeaf::Role)
                .ok_or_else(|| ResolutionError::UnknownRole { name: name.clone() })?,
            LeafRef::Channel(name) => resolver
                .channel(guild, name)
                .await
                .map(ResolvedLeaf::Channel)
                .ok_or_else(|| ResolutionError::UnknownChannel { name: name.clone() })?,
            LeafRef::Literal(text) => ResolvedLeaf::Literal(text.clone()),
        };
        trace!(%guild, %leaf, resolved = %value, "resolved leaf");
        resolved.insert(leaf, value);
    }
    Ok(ResolvedLeaves { resolved })
}

/// Lookup table from stored leaves to their resolved values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLeaves {
    resolved: HashMap<LeafRef, ResolvedLeaf>,
}

impl ResolvedLeaves {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution by hand, e.g. from a host that resolves eagerly.
    #[must_use]
    pub fn with(mut self, leaf: LeafRef, value: ResolvedLeaf) -> Self {
        self.resolved.insert(leaf, value);
        self
    }

    /// Resolve a raw stored leaf such as `r@everyone`.
    ///
    /// Literals (`t...`) always resolve to their text.
    ///
    /// # Errors
    ///
    /// Returns a discriminator error for malformed leaves and
    /// [`ResolutionError::Unresolved`] for a role or channel that is not in the table.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedLeaf, ResolutionError> {
        let leaf = LeafRef::parse(raw)?;
        if let LeafRef::Literal(text) = leaf {
            return Ok(ResolvedLeaf::Literal(text));
        }
        self.resolved
            .get(&leaf)
            .cloned()
            .ok_or_else(|| ResolutionError::Unresolved {
                leaf: raw.to_owned(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Directory;

    #[async_trait]
    impl EntityResolver for Directory {
        async fn role(&self, _guild: GuildId, name: &str) -> Option<RoleId> {
            (name == "Mods").then_some(RoleId(10))
        }

        async fn channel(&self, _guild: GuildId, name: &str) -> Option<ChannelId> {
            (name == "general").then_some(ChannelId(20))
        }
    }

    #[test]
    fn collect_dedupes_leaves() {
        let tree = ConditionTree::leaf("rMods")
            .and(ConditionTree::leaf("rMods").or(ConditionTree::leaf("tSLASH")));
        let leaves = collect_leaves(&tree).unwrap();
        assert_eq!(leaves.len(), 2);
        assert!(leaves.contains(&LeafRef::Role("Mods".into())));
    }

    #[test]
    fn collect_rejects_bad_discriminator() {
        let tree = ConditionTree::leaf("xwhat").negate();
        assert!(matches!(
            collect_leaves(&tree),
            Err(ResolutionError::UnknownDiscriminator { .. })
        ));
    }

    #[tokio::test]
    async fn resolve_roles_channels_and_literals() {
        let tree = ConditionTree::leaf("rMods")
            .or(ConditionTree::leaf("cgeneral"))
            .and(ConditionTree::leaf("tMESSAGE"));
        let leaves = collect_leaves(&tree).unwrap();
        let resolved = resolve_leaves(GuildId(1), leaves, &Directory).await.unwrap();
        assert_eq!(resolved.resolve("rMods").unwrap(), ResolvedLeaf::Role(RoleId(10)));
        assert_eq!(
            resolved.resolve("cgeneral").unwrap(),
            ResolvedLeaf::Channel(ChannelId(20))
        );
        assert_eq!(
            resolved.resolve("tMESSAGE").unwrap(),
            ResolvedLeaf::Literal("MESSAGE".into())
        );
    }

    #[tokio::test]
    async fn unknown_role_is_an_error() {
        let leaves = collect_leaves(&ConditionTree::leaf("rAdmins")).unwrap();
        let err = resolve_leaves(GuildId(1), leaves, &Directory).await.unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnknownRole {
                name: "Admins".into()
            }
        );
    }

    #[tokio::test]
    async fn unknown_channel_is_an_error() {
        let leaves = collect_leaves(&ConditionTree::leaf("csecret")).unwrap();
        let err = resolve_leaves(GuildId(1), leaves, &Directory).await.unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownChannel { name } if name == "secret"));
    }

    #[test]
    fn literal_never_fails_even_when_table_is_empty() {
        let table = ResolvedLeaves::new();
        assert_eq!(
            table.resolve("tanything").unwrap(),
            ResolvedLeaf::Literal("anything".into())
        );
        assert!(matches!(
            table.resolve("rMods"),
            Err(ResolutionError::Unresolved { .. })
        ));
    }
}
