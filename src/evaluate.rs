use crate::{Invocation, Operator, ResolvedLeaf};

/// Decides whether a single resolved leaf holds for an invocation.
///
/// Implemented for any `Fn(&ResolvedLeaf, &Invocation) -> bool`, so tests and
/// hosts can inject a closure in place of [`DefaultPredicate`].
pub trait LeafPredicate: Send + Sync {
    fn matches(&self, leaf: &ResolvedLeaf, invocation: &Invocation) -> bool;
}

impl<F> LeafPredicate for F
where
    F: Fn(&ResolvedLeaf, &Invocation) -> bool + Send + Sync,
{
    fn matches(&self, leaf: &ResolvedLeaf, invocation: &Invocation) -> bool {
        self(leaf, invocation)
    }
}

/// The bot's standard leaf semantics.
///
/// - a channel leaf holds when the command runs in that channel;
/// - a role leaf holds when the invoking member has that role;
/// - the slash literal (default `SLASH`) holds for slash-command invocations;
/// - the message literal (default `MESSAGE`) holds for message-command invocations;
/// - any other literal never holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultPredicate {
    slash_literal: String,
    message_literal: String,
}

impl DefaultPredicate {
    #[must_use]
    pub fn new(slash_literal: impl Into<String>, message_literal: impl Into<String>) -> Self {
        Self {
            slash_literal: slash_literal.into(),
            message_literal: message_literal.into(),
        }
    }
}

impl Default for DefaultPredicate {
    fn default() -> Self {
        Self::new("SLASH", "MESSAGE")
    }
}

impl LeafPredicate for DefaultPredicate {
    fn matches(&self, leaf: &ResolvedLeaf, invocation: &Invocation) -> bool {
        match leaf {
            ResolvedLeaf::Channel(channel) => invocation.channel() == *channel,
            ResolvedLeaf::Role(role) => invocation.has_role(*role),
            ResolvedLeaf::Literal(text) if *text == self.slash_literal => invocation.is_slash(),
            ResolvedLeaf::Literal(text) if *text == self.message_literal => !invocation.is_slash(),
            ResolvedLeaf::Literal(_) => false,
        }
    }
}

pub(crate) fn evaluate(
    op: &Operator,
    invocation: &Invocation,
    predicate: &dyn LeafPredicate,
) -> bool {
    match op {
        Operator::And(a, b) => {
            evaluate(a, invocation, predicate) && evaluate(b, invocation, predicate)
        }
        Operator::Or(a, b) => {
            evaluate(a, invocation, predicate) || evaluate(b, invocation, predicate)
        }
        Operator::Not(inner) => !evaluate(inner, invocation, predicate),
        Operator::Leaf(leaf) => predicate.matches(leaf, invocation),
    }
}
