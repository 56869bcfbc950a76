use std::collections::HashSet;

use super::ids::{ChannelId, GuildId, RoleId};

/// How a command was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    Slash,
    Message,
}

/// Runtime facts about a single command call, supplied by the bot framework.
///
/// ```
/// use permgate::{ChannelId, GuildId, Invocation, InvocationKind, RoleId};
///
/// let inv = Invocation::new(GuildId(1), ChannelId(10), InvocationKind::Message, "tag add")
///     .in_cog("Util")
///     .with_role(RoleId(1));
/// assert!(inv.has_role(RoleId(1)));
/// ```
#[derive(Debug, Clone)]
pub struct Invocation {
    guild: GuildId,
    channel: ChannelId,
    roles: HashSet<RoleId>,
    kind: InvocationKind,
    cog: Option<String>,
    qualified_name: String,
}

impl Invocation {
    #[must_use]
    pub fn new(
        guild: GuildId,
        channel: ChannelId,
        kind: InvocationKind,
        qualified_name: impl Into<String>,
    ) -> Self {
        Self {
            guild,
            channel,
            roles: HashSet::new(),
            kind,
            cog: None,
            qualified_name: qualified_name.into(),
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: RoleId) -> Self {
        self.roles.insert(role);
        self
    }

    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.roles.extend(roles);
        self
    }

    #[must_use]
    pub fn in_cog(mut self, cog: impl Into<String>) -> Self {
        self.cog = Some(cog.into());
        self
    }

    #[must_use]
    pub fn in_channel(mut self, channel: ChannelId) -> Self {
        self.channel = channel;
        self
    }

    #[must_use]
    pub fn guild(&self) -> GuildId {
        self.guild
    }

    #[must_use]
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    #[must_use]
    pub fn kind(&self) -> InvocationKind {
        self.kind
    }

    #[must_use]
    pub fn is_slash(&self) -> bool {
        self.kind == InvocationKind::Slash
    }

    #[must_use]
    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn cog(&self) -> Option<&str> {
        self.cog.as_deref()
    }

    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }
}
