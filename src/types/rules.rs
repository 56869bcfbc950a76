use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::condition::{ConditionTree, RawNode};
use super::error::RuleError;
use super::invocation::Invocation;

/// Granularity at which a rule is stored and its compiled check cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    All,
    Cog(String),
    Command(String),
    Event(String),
}

impl Scope {
    /// Scopes that apply to a call.
    ///
    /// Without an event type these are `all`, the invocation's cog (if any) and
    /// its qualified command name, in that order. With an event type, only that
    /// event's scope applies.
    #[must_use]
    pub fn applicable(invocation: &Invocation, event_type: &str) -> Vec<Scope> {
        if !event_type.is_empty() {
            return vec![Scope::Event(event_type.to_owned())];
        }
        let mut scopes = Vec::with_capacity(3);
        scopes.push(Scope::All);
        if let Some(cog) = invocation.cog() {
            scopes.push(Scope::Cog(cog.to_owned()));
        }
        scopes.push(Scope::Command(invocation.qualified_name().to_owned()));
        scopes
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("all"),
            Scope::Cog(name) => write!(f, "cogs[{name}]"),
            Scope::Command(name) => write!(f, "commands[{name}]"),
            Scope::Event(name) => write!(f, "events[{name}]"),
        }
    }
}

/// A guild's permission document: one optional rule per scope.
///
/// Every key is optional. Rules are kept as stored and only validated when a
/// scope is asked for, so a malformed rule in one scope never hides the rules
/// of the others. Use [`validate`](Self::validate) to check the whole
/// document up front, e.g. before saving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    all: Option<RawNode>,
    #[serde(default)]
    cogs: BTreeMap<String, RawNode>,
    #[serde(default)]
    commands: BTreeMap<String, RawNode>,
    #[serde(default)]
    events: BTreeMap<String, RawNode>,
}

impl PermissionRules {
    /// Parse a JSON permission document.
    ///
    /// Only the document's outer shape is checked here: an object whose
    /// `cogs`, `commands` and `events` keys, when present, are objects.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Json`] when the outer shape is wrong.
    pub fn from_json(input: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Same as [`from_json`](Self::from_json), from an already-parsed value.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_value(value: serde_json::Value) -> Result<Self, RuleError> {
        Ok(serde_json::from_value(value)?)
    }

    fn raw(&self, scope: &Scope) -> Option<&RawNode> {
        match scope {
            Scope::All => self.all.as_ref(),
            Scope::Cog(name) => self.cogs.get(name),
            Scope::Command(name) => self.commands.get(name),
            Scope::Event(name) => self.events.get(name),
        }
    }

    /// The validated rule stored for `scope`, or `None` when the scope has no
    /// entry or its entry is the empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the stored rule for this scope is malformed.
    pub fn rule_for(&self, scope: &Scope) -> Result<Option<ConditionTree>, RuleError> {
        let Some(raw) = self.raw(scope) else {
            return Ok(None);
        };
        let tree = ConditionTree::try_from(raw.clone())?;
        Ok((!tree.is_empty()).then_some(tree))
    }

    /// Every scope that has a stored entry, empty or not.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.all
            .iter()
            .map(|_| Scope::All)
            .chain(self.cogs.keys().cloned().map(Scope::Cog))
            .chain(self.commands.keys().cloned().map(Scope::Command))
            .chain(self.events.keys().cloned().map(Scope::Event))
    }

    /// Validate every stored rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InScope`] for the first malformed rule, naming its scope.
    pub fn validate(&self) -> Result<(), RuleError> {
        for scope in self.scopes() {
            self.rule_for(&scope).map_err(|source| RuleError::InScope {
                scope: scope.to_string(),
                source: Box::new(source),
            })?;
        }
        Ok(())
    }

    /// Replace the rule for `scope`.
    pub fn set(&mut self, scope: Scope, tree: ConditionTree) {
        let raw = RawNode::from(tree);
        match scope {
            Scope::All => self.all = Some(raw),
            Scope::Cog(name) => {
                self.cogs.insert(name, raw);
            }
            Scope::Command(name) => {
                self.commands.insert(name, raw);
            }
            Scope::Event(name) => {
                self.events.insert(name, raw);
            }
        }
    }

    /// Remove the entry for `scope`. Returns whether one was stored.
    pub fn remove(&mut self, scope: &Scope) -> bool {
        match scope {
            Scope::All => self.all.take().is_some(),
            Scope::Cog(name) => self.cogs.remove(name).is_some(),
            Scope::Command(name) => self.commands.remove(name).is_some(),
            Scope::Event(name) => self.events.remove(name).is_some(),
        }
    }

    /// `true` when no scope carries a restriction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.iter().all(RawNode::is_empty)
            && [&self.cogs, &self.commands, &self.events]
                .iter()
                .all(|map| map.values().all(RawNode::is_empty))
    }
}
