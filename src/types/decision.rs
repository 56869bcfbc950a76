use std::fmt;
use std::sync::Arc;

use super::invocation::Invocation;
use super::leaf::ResolvedLeaf;
use super::operator::Operator;
use crate::evaluate::LeafPredicate;

/// A restriction to be evaluated against the live invocation.
///
/// Produced by [`PermissionChecker::get_permissions_check`](crate::PermissionChecker::get_permissions_check);
/// "no restriction" is represented by the absence of a `Decision`.
#[derive(Clone)]
pub struct Decision {
    root: Arc<Operator>,
    predicate: Arc<dyn LeafPredicate>,
}

impl Decision {
    #[must_use]
    pub fn new(root: Arc<Operator>, predicate: Arc<dyn LeafPredicate>) -> Self {
        Self { root, predicate }
    }

    /// Join the checks of all applicable scopes with an implicit AND.
    ///
    /// One check is returned as is, two become `And(t0, t1)`, three become
    /// `And(t0, And(t1, t2))`. No checks means no restriction.
    #[must_use]
    pub fn combine(checks: Vec<Arc<Operator>>, predicate: Arc<dyn LeafPredicate>) -> Option<Self> {
        let root = checks
            .into_iter()
            .rev()
            .reduce(|acc, check| Arc::new(Operator::And(check, acc)))?;
        Some(Self::new(root, predicate))
    }

    #[must_use]
    pub fn root(&self) -> &Operator {
        &self.root
    }

    #[must_use]
    pub fn evaluate(&self, invocation: &Invocation) -> bool {
        self.root.evaluate(invocation, self.predicate.as_ref())
    }

    #[must_use]
    pub fn render(&self, leaf: impl Fn(&ResolvedLeaf) -> String) -> String {
        self.root.render(leaf)
    }
}

impl fmt::Debug for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decision").field("root", &self.root).finish_non_exhaustive()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelId, DefaultPredicate, GuildId, InvocationKind, RoleId};

    fn leaf(id: u64) -> Arc<Operator> {
        Arc::new(Operator::Leaf(ResolvedLeaf::Role(RoleId(id))))
    }

    fn predicate() -> Arc<dyn LeafPredicate> {
        Arc::new(DefaultPredicate::default())
    }

    #[test]
    fn combine_none_is_unrestricted() {
        assert!(Decision::combine(vec![], predicate()).is_none());
    }

    #[test]
    fn combine_one_is_itself() {
        let decision = Decision::combine(vec![leaf(1)], predicate()).unwrap();
        assert_eq!(decision.root(), leaf(1).as_ref());
    }

    #[test]
    fn combine_two() {
        let decision = Decision::combine(vec![leaf(1), leaf(2)], predicate()).unwrap();
        assert_eq!(decision.root(), &Operator::And(leaf(1), leaf(2)));
    }

    #[test]
    fn combine_three_folds_right() {
        let decision = Decision::combine(vec![leaf(1), leaf(2), leaf(3)], predicate()).unwrap();
        assert_eq!(
            decision.root(),
            &Operator::And(leaf(1), Arc::new(Operator::And(leaf(2), leaf(3))))
        );
        assert_eq!(decision.to_string(), "(<@&1> AND (<@&2> AND <@&3>))");
    }

    #[test]
    fn evaluate_uses_predicate() {
        let decision = Decision::combine(vec![leaf(1), leaf(2)], predicate()).unwrap();
        let inv = Invocation::new(GuildId(1), ChannelId(1), InvocationKind::Slash, "ping")
            .with_role(RoleId(1));
        assert!(!decision.evaluate(&inv));
        assert!(decision.evaluate(&inv.with_role(RoleId(2))));
    }
}
