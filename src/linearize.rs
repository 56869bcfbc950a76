use crate::resolve::ResolvedLeaves;
use crate::{ConditionTree, ResolutionError, Token};

/// Flatten a condition tree into an infix token stream.
///
/// `AND`/`OR` nodes become `left & right` / `left | right` and `NOT` becomes
/// `! right`. Every operand that is itself a node is wrapped in parentheses, so
/// the stream parses back to the same structure. The empty tree yields no
/// tokens.
///
/// # Errors
///
/// Returns [`ResolutionError`] if a leaf is malformed or missing from `leaves`.
pub fn linearize(
    tree: &ConditionTree,
    leaves: &ResolvedLeaves,
) -> Result<Vec<Token>, ResolutionError> {
    let mut tokens = Vec::new();
    linearize_into(tree, leaves, &mut tokens)?;
    Ok(tokens)
}

fn linearize_into(
    tree: &ConditionTree,
    leaves: &ResolvedLeaves,
    out: &mut Vec<Token>,
) -> Result<(), ResolutionError> {
    match tree {
        ConditionTree::Empty => {}
        ConditionTree::Leaf(raw) => out.push(Token::Leaf(leaves.resolve(raw)?)),
        ConditionTree::And(a, b) => {
            operand(a, leaves, out)?;
            out.push(Token::And);
            operand(b, leaves, out)?;
        }
        ConditionTree::Or(a, b) => {
            operand(a, leaves, out)?;
            out.push(Token::Or);
            operand(b, leaves, out)?;
        }
        ConditionTree::Not(inner) => {
            out.push(Token::Not);
            operand(inner, leaves, out)?;
        }
    }
    Ok(())
}

fn operand(
    tree: &ConditionTree,
    leaves: &ResolvedLeaves,
    out: &mut Vec<Token>,
) -> Result<(), ResolutionError> {
    if matches!(tree, ConditionTree::Leaf(_)) {
        return linearize_into(tree, leaves, out);
    }
    out.push(Token::Open);
    linearize_into(tree, leaves, out)?;
    out.push(Token::Close);
    Ok(())
}
