use std::sync::Arc;

use permgate::{
    ChannelId, ConditionTree, Decision, DefaultPredicate, GuildId, Invocation, InvocationKind,
    LeafRef, Operator, PermissionRules, ResolvedLeaf, ResolvedLeaves, RoleId, Scope, Token,
    compile, compile_tokens, linearize, parse,
};

fn role(id: u64) -> ResolvedLeaf {
    ResolvedLeaf::Role(RoleId(id))
}

fn invocation(kind: InvocationKind) -> Invocation {
    Invocation::new(GuildId(1), ChannelId(10), kind, "ping")
}

fn predicate() -> Arc<DefaultPredicate> {
    Arc::new(DefaultPredicate::default())
}

#[test]
fn leading_not_negates_whole_and_chain() {
    // a = member has role 1 (true), b = member has role 2 (false)
    let tokens = vec![
        Token::Not,
        Token::Leaf(role(1)),
        Token::And,
        Token::Leaf(role(2)),
    ];
    let op = compile_tokens(&tokens).unwrap().unwrap();
    assert_eq!(
        op,
        Operator::Leaf(role(1)).and(Operator::Leaf(role(2))).negate()
    );

    let inv = invocation(InvocationKind::Slash).with_role(RoleId(1));
    assert!(op.evaluate(&inv, &DefaultPredicate::default()));
    let narrowed = Operator::Leaf(role(1)).negate().and(Operator::Leaf(role(2)));
    assert!(!narrowed.evaluate(&inv, &DefaultPredicate::default()));
}

#[test]
fn leading_not_in_text_rules() {
    let tree = parse(r#"!r"Mods" & r"Admins""#).unwrap();
    assert_eq!(
        tree,
        ConditionTree::leaf("rMods")
            .and(ConditionTree::leaf("rAdmins"))
            .negate()
    );
}

#[test]
fn doubled_and_single_operators_agree() {
    let a = Token::Leaf(role(1));
    let b = Token::Leaf(role(2));
    let single = compile_tokens(&[a.clone(), Token::And, b.clone()]).unwrap();
    let doubled = compile_tokens(&[a, Token::And, Token::And, b]).unwrap();
    assert_eq!(single, doubled);
    assert_eq!(parse(r#"r"a" && r"b""#).unwrap(), parse(r#"r"a" & r"b""#).unwrap());
}

#[test]
fn empty_rule_is_unrestricted() {
    let tree = ConditionTree::from_json(serde_json::json!({})).unwrap();
    assert!(tree.is_empty());
    assert!(linearize(&tree, &ResolvedLeaves::new()).unwrap().is_empty());
    assert_eq!(compile(&tree, &ResolvedLeaves::new()).unwrap(), None);
    assert_eq!(compile_tokens(&[]).unwrap(), None);
    assert!(Decision::combine(Vec::new(), predicate()).is_none());
}

#[test]
fn empty_scope_rule_is_treated_as_absent() {
    let rules = PermissionRules::from_json(r#"{"all": {}, "commands": {"ping": {}}}"#).unwrap();
    assert!(rules.rule_for(&Scope::All).unwrap().is_none());
    assert!(rules.rule_for(&Scope::Command("ping".into())).unwrap().is_none());
}

#[test]
fn combination_of_three_scopes_fails_on_any_false() {
    // all: role 1 (true), cog: role 2 (true), command: SLASH (false)
    let checks = vec![
        Arc::new(Operator::Leaf(role(1))),
        Arc::new(Operator::Leaf(role(2))),
        Arc::new(Operator::Leaf(ResolvedLeaf::Literal("SLASH".into()))),
    ];
    let inv = invocation(InvocationKind::Message).with_roles([RoleId(1), RoleId(2)]);

    let three = Decision::combine(checks.clone(), predicate()).unwrap();
    assert!(!three.evaluate(&inv));
    assert_eq!(
        three.root(),
        &Operator::And(
            Arc::clone(&checks[0]),
            Arc::new(Operator::And(Arc::clone(&checks[1]), Arc::clone(&checks[2]))),
        )
    );

    let two = Decision::combine(checks[..2].to_vec(), predicate()).unwrap();
    assert!(two.evaluate(&inv));
}

#[test]
fn single_check_is_returned_unwrapped() {
    let check = Arc::new(Operator::Leaf(role(1)));
    let decision = Decision::combine(vec![Arc::clone(&check)], predicate()).unwrap();
    assert_eq!(decision.root(), check.as_ref());
}

#[test]
fn everyone_or_slash_permits_message_invocation() {
    let rules = PermissionRules::from_json(
        r#"{"all": {"condition": "OR", "left": "r@everyone", "right": "tSLASH"}}"#,
    )
    .unwrap();
    let tree = rules.rule_for(&Scope::All).unwrap().unwrap();
    let leaves = ResolvedLeaves::new().with(LeafRef::Role("@everyone".into()), role(3));
    let op = compile(&tree, &leaves).unwrap().unwrap();
    let decision = Decision::combine(vec![Arc::new(op)], predicate()).unwrap();

    let inv = invocation(InvocationKind::Message).with_role(RoleId(3));
    assert!(decision.evaluate(&inv));
    assert!(!decision.evaluate(&invocation(InvocationKind::Message)));
    assert!(decision.evaluate(&invocation(InvocationKind::Slash)));
}

#[test]
fn ping_outside_admin_only() {
    let rules = PermissionRules::from_json(
        r##"{"commands": {"ping": {"condition": "NOT", "right": "c#admin-only"}}}"##,
    )
    .unwrap();
    let tree = rules.rule_for(&Scope::Command("ping".into())).unwrap().unwrap();
    let leaves = ResolvedLeaves::new().with(
        LeafRef::Channel("#admin-only".into()),
        ResolvedLeaf::Channel(ChannelId(11)),
    );
    let op = compile(&tree, &leaves).unwrap().unwrap();
    let decision = Decision::combine(vec![Arc::new(op)], predicate()).unwrap();

    let in_admin = invocation(InvocationKind::Slash).in_channel(ChannelId(11));
    let elsewhere = invocation(InvocationKind::Slash).in_channel(ChannelId(12));
    assert!(!decision.evaluate(&in_admin));
    assert!(decision.evaluate(&elsewhere));
}

#[test]
fn deep_nesting_compiles() {
    let mut tree = ConditionTree::leaf("tSLASH");
    for _ in 0..64 {
        tree = tree.negate().negate();
    }
    let op = compile(&tree, &ResolvedLeaves::new()).unwrap().unwrap();
    assert_eq!(op.leaf_count(), 1);
    assert!(op.evaluate(&invocation(InvocationKind::Slash), &DefaultPredicate::default()));
    assert!(!op.evaluate(&invocation(InvocationKind::Message), &DefaultPredicate::default()));
}

#[test]
fn wide_or_chain_is_left_associative() {
    let mut tree = ConditionTree::leaf("tA");
    for name in ["tB", "tC", "tD"] {
        tree = tree.or(ConditionTree::leaf(name));
    }
    let op = compile(&tree, &ResolvedLeaves::new()).unwrap().unwrap();
    let lit = |s: &str| Operator::Leaf(ResolvedLeaf::Literal(s.into()));
    assert_eq!(op, lit("A").or(lit("B")).or(lit("C")).or(lit("D")));
}

#[test]
fn unknown_literal_never_holds() {
    let op = compile(&ConditionTree::leaf("tBETA"), &ResolvedLeaves::new())
        .unwrap()
        .unwrap();
    assert!(!op.evaluate(&invocation(InvocationKind::Slash), &DefaultPredicate::default()));
    assert!(op.negate().evaluate(&invocation(InvocationKind::Slash), &DefaultPredicate::default()));
}

#[test]
fn custom_predicate_overrides_literals() {
    let op = Arc::new(Operator::Leaf(ResolvedLeaf::Literal("BETA".into())));
    let beta = |leaf: &ResolvedLeaf, _: &Invocation| matches!(leaf, ResolvedLeaf::Literal(t) if t == "BETA");
    let decision = Decision::new(op, Arc::new(beta));
    assert!(decision.evaluate(&invocation(InvocationKind::Slash)));
}
