use winnow::ascii::till_line_ending;
use winnow::combinator::{alt, cut_err, fail, opt, preceded, repeat, terminated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::stream::Stateful;
use winnow::token::{none_of, one_of, take_while};

use super::MAX_NESTING;
use crate::ConditionTree;

/// Rule text, tracking how many groups are currently open.
pub(crate) type Input<'i> = Stateful<&'i str, usize>;

/// Skip whitespace and `#` line comments.
fn trivia(input: &mut Input<'_>) -> ModalResult<()> {
    loop {
        take_while(0.., |c: char| c.is_whitespace()).parse_next(input)?;
        if opt('#').parse_next(input)?.is_none() {
            return Ok(());
        }
        till_line_ending.parse_next(input)?;
    }
}

// -- Leaves -----------------------------------------------------------------

fn escaped(input: &mut Input<'_>) -> ModalResult<char> {
    preceded(
        '\\',
        cut_err(alt((
            '"'.value('"'),
            '\\'.value('\\'),
            'n'.value('\n'),
            't'.value('\t'),
        )))
        .context(StrContext::Label("escape")),
    )
    .parse_next(input)
}

fn quoted(input: &mut Input<'_>) -> ModalResult<String> {
    let body = repeat(0.., alt((escaped, none_of(['"', '\\'])))).fold(String::new, |mut text, c| {
        text.push(c);
        text
    });
    preceded('"', cut_err(terminated(body, '"')))
        .context(StrContext::Expected(StrContextValue::CharLiteral('"')))
        .parse_next(input)
}

/// A discriminator letter followed by a quoted payload: `r"Mods"`.
fn leaf(input: &mut Input<'_>) -> ModalResult<ConditionTree> {
    (one_of(|c: char| c.is_ascii_alphabetic()), quoted)
        .map(|(discriminator, payload)| ConditionTree::Leaf(format!("{discriminator}{payload}")))
        .parse_next(input)
}

// -- Operators --------------------------------------------------------------

fn not_op(input: &mut Input<'_>) -> ModalResult<()> {
    alt(("NOT", "not", "!")).void().parse_next(input)
}

fn and_op(input: &mut Input<'_>) -> ModalResult<()> {
    alt(("&&", "&", "AND", "and")).void().parse_next(input)
}

fn or_op(input: &mut Input<'_>) -> ModalResult<()> {
    alt(("||", "|", "OR", "or")).void().parse_next(input)
}

// -- Expressions (grouping: inversion < and < or < literal) ------------------

/// `'(' inversion ')'`, refusing to open more than [`MAX_NESTING`] groups.
fn group(input: &mut Input<'_>) -> ModalResult<ConditionTree> {
    '('.parse_next(input)?;
    if input.state >= MAX_NESTING {
        return cut_err(fail)
            .context(StrContext::Label("group"))
            .context(StrContext::Expected(StrContextValue::Description(
                "fewer nested groups",
            )))
            .parse_next(input);
    }
    input.state += 1;
    let inner = cut_err(terminated(inversion, (trivia, ')'))).parse_next(input);
    input.state -= 1;
    inner
}

fn literal(input: &mut Input<'_>) -> ModalResult<ConditionTree> {
    trivia.parse_next(input)?;
    alt((group, leaf))
        .context(StrContext::Expected(StrContextValue::Description(
            "leaf or '('",
        )))
        .parse_next(input)
}

fn or_expr(input: &mut Input<'_>) -> ModalResult<ConditionTree> {
    let first = literal(input)?;
    let rest: Vec<ConditionTree> =
        repeat(0.., preceded((trivia, or_op), cut_err(literal))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, ConditionTree::or))
}

fn and_expr(input: &mut Input<'_>) -> ModalResult<ConditionTree> {
    let first = or_expr(input)?;
    let rest: Vec<ConditionTree> =
        repeat(0.., preceded((trivia, and_op), cut_err(or_expr))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, ConditionTree::and))
}

fn inversion(input: &mut Input<'_>) -> ModalResult<ConditionTree> {
    trivia.parse_next(input)?;
    if opt(not_op).parse_next(input)?.is_some() {
        let inner = cut_err(and_expr).parse_next(input)?;
        Ok(inner.negate())
    } else {
        and_expr(input)
    }
}

// -- Top-level parser -------------------------------------------------------

pub(crate) fn parse_condition(input: &mut Input<'_>) -> ModalResult<ConditionTree> {
    trivia.parse_next(input)?;
    let tree = opt(inversion).parse_next(input)?.unwrap_or_default();
    trivia.parse_next(input)?;
    Ok(tree)
}
