//! Per-guild cache of compiled permission checks.
//!
//! Each guild gets an independent [`GuildChecks`] entry holding one slot per
//! scope. Slots are filled lazily, only for scopes that are actually requested.
//! A slot holding `None` records that the guild has no rule for that scope, so
//! repeated lookups do not rescan the stored document.
//!
//! Invalidation is per guild and wholesale: the guild's entry is dropped from
//! the map. A compilation that was already in flight keeps writing into the
//! entry it started with, which is no longer reachable, so stale trees never
//! become visible after an invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::{GuildId, Operator, Scope};

/// A compiled check for one scope, or `None` when the scope has no rule.
pub type Slot = Option<Arc<Operator>>;

#[derive(Debug, Default)]
struct Slots {
    all: Option<Slot>,
    cogs: HashMap<String, Slot>,
    commands: HashMap<String, Slot>,
    events: HashMap<String, Slot>,
}

impl Slots {
    fn get(&self, scope: &Scope) -> Option<&Slot> {
        match scope {
            Scope::All => self.all.as_ref(),
            Scope::Cog(name) => self.cogs.get(name),
            Scope::Command(name) => self.commands.get(name),
            Scope::Event(name) => self.events.get(name),
        }
    }

    fn insert(&mut self, scope: Scope, slot: Slot) {
        match scope {
            Scope::All => self.all = Some(slot),
            Scope::Cog(name) => {
                self.cogs.insert(name, slot);
            }
            Scope::Command(name) => {
                self.commands.insert(name, slot);
            }
            Scope::Event(name) => {
                self.events.insert(name, slot);
            }
        }
    }

    fn len(&self) -> usize {
        usize::from(self.all.is_some()) + self.cogs.len() + self.commands.len() + self.events.len()
    }
}

/// Cached checks of a single guild. Cloning shares the same entry.
#[derive(Debug, Clone, Default)]
pub struct GuildChecks {
    slots: Arc<RwLock<Slots>>,
}

impl GuildChecks {
    /// The cached slot for `scope`, or `None` on a miss.
    #[must_use]
    pub fn lookup(&self, scope: &Scope) -> Option<Slot> {
        self.slots.read().get(scope).cloned()
    }

    /// Fill the slot for `scope`. Concurrent fills of the same scope are
    /// last-write-wins.
    pub fn store(&self, scope: Scope, slot: Slot) {
        self.slots.write().insert(scope, slot);
    }

    /// Number of filled slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide cache of compiled checks, keyed by guild.
///
/// Construct one at startup and share it with the
/// [`PermissionChecker`](crate::PermissionChecker); call
/// [`invalidate`](Self::invalidate) whenever a guild's settings change.
#[derive(Debug, Default)]
pub struct PermissionCache {
    guilds: DashMap<GuildId, GuildChecks>,
}

impl PermissionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry for `guild`, created empty on first use.
    #[must_use]
    pub fn guild(&self, guild: GuildId) -> GuildChecks {
        if let Some(entry) = self.guilds.get(&guild) {
            return entry.value().clone();
        }
        self.guilds.entry(guild).or_default().value().clone()
    }

    /// The cached slot for `scope` in `guild`, without creating an entry.
    #[must_use]
    pub fn lookup(&self, guild: GuildId, scope: &Scope) -> Option<Slot> {
        self.guilds.get(&guild)?.value().lookup(scope)
    }

    /// Fill a slot for `guild`.
    pub fn store(&self, guild: GuildId, scope: Scope, slot: Slot) {
        debug!(%guild, %scope, present = slot.is_some(), "caching permission check");
        self.guild(guild).store(scope, slot);
    }

    /// `true` if `scope` has been compiled (or recorded absent) for `guild`.
    #[must_use]
    pub fn contains(&self, guild: GuildId, scope: &Scope) -> bool {
        self.lookup(guild, scope).is_some()
    }

    /// Drop every cached check of `guild`. Returns whether anything was cached.
    pub fn invalidate(&self, guild: GuildId) -> bool {
        let removed = self.guilds.remove(&guild).is_some();
        info!(%guild, removed, "invalidated permission checks");
        removed
    }

    /// Drop every cached check of every guild.
    pub fn clear(&self) {
        info!(guilds = self.guilds.len(), "clearing permission cache");
        self.guilds.clear();
    }

    /// Number of guilds with a cache entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guilds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResolvedLeaf, RoleId};

    fn tree(id: u64) -> Slot {
        Some(Arc::new(Operator::Leaf(ResolvedLeaf::Role(RoleId(id)))))
    }

    #[test]
    fn miss_then_hit() {
        let cache = PermissionCache::new();
        assert_eq!(cache.lookup(GuildId(1), &Scope::All), None);
        cache.store(GuildId(1), Scope::All, tree(1));
        assert_eq!(cache.lookup(GuildId(1), &Scope::All), Some(tree(1)));
    }

    #[test]
    fn absent_marker_is_a_hit() {
        let cache = PermissionCache::new();
        cache.store(GuildId(1), Scope::Cog("Util".into()), None);
        assert_eq!(cache.lookup(GuildId(1), &Scope::Cog("Util".into())), Some(None));
        assert!(cache.contains(GuildId(1), &Scope::Cog("Util".into())));
    }

    #[test]
    fn scopes_are_independent() {
        let cache = PermissionCache::new();
        cache.store(GuildId(1), Scope::Command("ping".into()), tree(1));
        assert!(!cache.contains(GuildId(1), &Scope::Cog("ping".into())));
        assert!(!cache.contains(GuildId(1), &Scope::Event("ping".into())));
        assert!(!cache.contains(GuildId(1), &Scope::All));
        assert_eq!(cache.guild(GuildId(1)).len(), 1);
    }

    #[test]
    fn guilds_are_independent() {
        let cache = PermissionCache::new();
        cache.store(GuildId(1), Scope::All, tree(1));
        assert!(!cache.contains(GuildId(2), &Scope::All));
        assert!(cache.invalidate(GuildId(1)));
        assert!(!cache.invalidate(GuildId(2)));
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_drops_every_slot() {
        let cache = PermissionCache::new();
        cache.store(GuildId(1), Scope::All, tree(1));
        cache.store(GuildId(1), Scope::Event("on_message".into()), None);
        cache.invalidate(GuildId(1));
        assert!(!cache.contains(GuildId(1), &Scope::All));
        assert!(!cache.contains(GuildId(1), &Scope::Event("on_message".into())));
    }

    #[test]
    fn writes_to_an_invalidated_entry_are_discarded() {
        let cache = PermissionCache::new();
        let entry = cache.guild(GuildId(1));
        cache.invalidate(GuildId(1));
        entry.store(Scope::All, tree(1));
        assert!(!cache.contains(GuildId(1), &Scope::All));
    }

    #[test]
    fn clear_drops_all_guilds() {
        let cache = PermissionCache::new();
        cache.store(GuildId(1), Scope::All, tree(1));
        cache.store(GuildId(2), Scope::All, tree(2));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn last_write_wins() {
        let cache = PermissionCache::new();
        cache.store(GuildId(1), Scope::All, tree(1));
        cache.store(GuildId(1), Scope::All, tree(2));
        assert_eq!(cache.lookup(GuildId(1), &Scope::All), Some(tree(2)));
    }
}
