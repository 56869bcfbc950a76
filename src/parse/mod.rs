//! Text form of permission rules.
//!
//! Leaves are a discriminator letter followed by a quoted name (`r"Mods"`,
//! `c"general"`, `t"SLASH"`). Operators may be written as keywords (`NOT`,
//! `AND`, `OR`, either case) or symbols (`!`, `&`/`&&`, `|`/`||`). Grouping
//! follows the compiled token grammar, so text and stored trees always agree.

mod error;
mod grammar;

pub use error::ParseError;

use winnow::stream::Stateful;

use crate::ConditionTree;

/// Deepest parenthesized nesting accepted by [`parse`] and
/// [`compile_tokens`](crate::compile_tokens).
pub const MAX_NESTING: usize = 128;

/// Parse rule text into a [`ConditionTree`]. Blank input is the empty tree.
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] if the input is not a valid expression or
/// nests groups deeper than [`MAX_NESTING`].
pub fn parse(input: &str) -> Result<ConditionTree, ParseError> {
    use winnow::Parser;
    grammar::parse_condition
        .parse(Stateful { input, state: 0 })
        .map_err(|e| ParseError::syntax(e.to_string()))
}
