//! Compilation of token streams into operator trees.
//!
//! The grammar, from loosest to tightest grouping:
//!
//! ```text
//! inversion := '!' and | and
//! and       := or ('&' or)*
//! or        := literal ('|' literal)*
//! literal   := leaf | '(' inversion ')'
//! ```
//!
//! `|` therefore groups tighter than `&`, and a leading `!` negates the whole
//! `&`-chain after it unless parentheses narrow it: `! a & b` is
//! `NOT (a AND b)`. Both binary operators are left-associative, and a doubled
//! symbol (`& &`, `| |`) counts as one.

use tracing::debug;

use crate::error::CompileError;
use crate::linearize::linearize;
use crate::parse::{MAX_NESTING, ParseError};
use crate::resolve::ResolvedLeaves;
use crate::{ConditionTree, Operator, Token};

const OPERAND: &str = "a leaf or '('";

/// Compile a token stream. An empty stream means "no restriction" and yields `None`.
///
/// # Errors
///
/// Returns [`ParseError`] for unbalanced parentheses, dangling operators,
/// operators in operand position, trailing tokens and groups nested deeper
/// than [`MAX_NESTING`].
pub fn compile_tokens(tokens: &[Token]) -> Result<Option<Operator>, ParseError> {
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = TokenParser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let root = parser.inversion()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::Trailing {
            position: parser.pos,
            found: token.to_string(),
        });
    }
    Ok(Some(root))
}

/// Linearize and compile a stored condition tree using already-resolved leaves.
///
/// # Errors
///
/// Returns [`CompileError`] if a leaf cannot be resolved or the resulting
/// stream does not parse.
pub fn compile(
    tree: &ConditionTree,
    leaves: &ResolvedLeaves,
) -> Result<Option<Operator>, CompileError> {
    let tokens = linearize(tree, leaves)?;
    debug!(tokens = tokens.len(), "compiling condition tree");
    Ok(compile_tokens(&tokens)?)
}

struct TokenParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> TokenParser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn inversion(&mut self) -> Result<Operator, ParseError> {
        if self.eat(&Token::Not) {
            Ok(self.and()?.negate())
        } else {
            self.and()
        }
    }

    fn and(&mut self) -> Result<Operator, ParseError> {
        let mut result = self.or()?;
        while self.eat(&Token::And) {
            self.eat(&Token::And);
            result = result.and(self.or()?);
        }
        Ok(result)
    }

    fn or(&mut self) -> Result<Operator, ParseError> {
        let mut result = self.literal()?;
        while self.eat(&Token::Or) {
            self.eat(&Token::Or);
            result = result.or(self.literal()?);
        }
        Ok(result)
    }

    fn literal(&mut self) -> Result<Operator, ParseError> {
        let position = self.pos;
        match self.peek() {
            Some(Token::Leaf(leaf)) => {
                self.bump();
                Ok(Operator::Leaf(leaf.clone()))
            }
            Some(Token::Open) => {
                if self.depth >= MAX_NESTING {
                    return Err(ParseError::TooDeep {
                        position,
                        limit: MAX_NESTING,
                    });
                }
                self.bump();
                self.depth += 1;
                let inner = self.inversion()?;
                self.depth -= 1;
                match self.peek() {
                    Some(Token::Close) => {
                        self.bump();
                        Ok(inner)
                    }
                    Some(other) => Err(ParseError::UnexpectedToken {
                        position: self.pos,
                        found: other.to_string(),
                        expected: "')'",
                    }),
                    None => Err(ParseError::UnclosedParen { position }),
                }
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                position,
                found: other.to_string(),
                expected: OPERAND,
            }),
            None => Err(ParseError::UnexpectedEnd {
                position,
                expected: OPERAND,
            }),
        }
    }
}
