use std::fmt;
use std::sync::Arc;

use super::invocation::Invocation;
use super::leaf::ResolvedLeaf;
use crate::evaluate::LeafPredicate;

/// Compiled boolean expression over resolved leaves.
///
/// Children are reference counted so that trees held by the check cache can be
/// combined into a [`Decision`](super::Decision) without copying them. A tree is
/// never mutated after compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    And(Arc<Operator>, Arc<Operator>),
    Or(Arc<Operator>, Arc<Operator>),
    Not(Arc<Operator>),
    Leaf(ResolvedLeaf),
}

impl Operator {
    #[must_use]
    pub fn and(self, other: Operator) -> Operator {
        Operator::And(Arc::new(self), Arc::new(other))
    }

    #[must_use]
    pub fn or(self, other: Operator) -> Operator {
        Operator::Or(Arc::new(self), Arc::new(other))
    }

    #[must_use]
    pub fn negate(self) -> Operator {
        Operator::Not(Arc::new(self))
    }

    /// Evaluate against an invocation, deciding each leaf with `predicate`.
    /// `And`/`Or` short-circuit.
    #[must_use]
    pub fn evaluate(&self, invocation: &Invocation, predicate: &dyn LeafPredicate) -> bool {
        crate::evaluate::evaluate(self, invocation, predicate)
    }

    /// Render a fully parenthesized form, e.g. `(A AND (B OR (NOT C)))`,
    /// formatting each leaf with `leaf`.
    #[must_use]
    pub fn render(&self, leaf: impl Fn(&ResolvedLeaf) -> String) -> String {
        let mut out = String::new();
        self.render_into(&mut out, &leaf);
        out
    }

    fn render_into(&self, out: &mut String, leaf: &dyn Fn(&ResolvedLeaf) -> String) {
        match self {
            Operator::And(a, b) | Operator::Or(a, b) => {
                let word = if matches!(self, Operator::And(..)) {
                    " AND "
                } else {
                    " OR "
                };
                out.push('(');
                a.render_into(out, leaf);
                out.push_str(word);
                b.render_into(out, leaf);
                out.push(')');
            }
            Operator::Not(inner) => {
                out.push_str("(NOT ");
                inner.render_into(out, leaf);
                out.push(')');
            }
            Operator::Leaf(value) => out.push_str(&leaf(value)),
        }
    }

    /// Number of leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Operator::And(a, b) | Operator::Or(a, b) => a.leaf_count() + b.leaf_count(),
            Operator::Not(inner) => inner.leaf_count(),
            Operator::Leaf(_) => 1,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(ToString::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelId, RoleId};

    fn role(id: u64) -> Operator {
        Operator::Leaf(ResolvedLeaf::Role(RoleId(id)))
    }

    #[test]
    fn render_fully_parenthesized() {
        let op = role(1).and(role(2).or(role(3).negate()));
        assert_eq!(op.render(|l| l.to_string()), "(<@&1> AND (<@&2> OR (NOT <@&3>)))");
    }

    #[test]
    fn render_uses_caller_formatter() {
        let op = Operator::Leaf(ResolvedLeaf::Channel(ChannelId(4)))
            .or(Operator::Leaf(ResolvedLeaf::Literal("SLASH".into())));
        let rendered = op.render(|l| match l {
            ResolvedLeaf::Channel(_) => "A".to_owned(),
            _ => "B".to_owned(),
        });
        assert_eq!(rendered, "(A OR B)");
    }

    #[test]
    fn display_matches_default_render() {
        let op = role(7).negate();
        assert_eq!(op.to_string(), "(NOT <@&7>)");
    }

    #[test]
    fn leaf_count_counts_leaves() {
        let op = role(1).and(role(2).or(role(3).negate()));
        assert_eq!(op.leaf_count(), 3);
    }
}
