//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::space0,
    combinator::{all_consuming, map},
    multi::{fold_many0, many0_count},
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::error::ParseError;
use crate::expr::{BinaryOp, Expr};

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn padded_tag<'t>(t: &'t str) -> impl for<'i> Fn(&'i str) -> IResult<&'i str, &'i str> + 't {
    move |input: &str| delimited(space0, tag(t), space0)(input)
}

fn symbol(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(space0, take_while1(is_symbol_char), space0),
        |name: &str| Expr::symbol(name),
    )(input)
}

fn primary(input: &str) -> IResult<&str, Expr> {
    alt((
        delimited(padded_tag("("), disjunction, padded_tag(")")),
        symbol,
    ))(input)
}

/// `!` binds tighter than any binary operator; repeated `!` nest right to left.
fn unary(input: &str) -> IResult<&str, Expr> {
    let (remaining, (negations, operand)) = pair(many0_count(padded_tag("!")), primary)(input)?;
    let expr = (0..negations).fold(operand, |expr, _| Expr::not(expr));
    Ok((remaining, expr))
}

/// Left-associative chain of `operand (op operand)*`, built without recursion
/// on the chain length.
fn chain<'i>(
    input: &'i str,
    op: BinaryOp,
    operand: fn(&'i str) -> IResult<&'i str, Expr>,
) -> IResult<&'i str, Expr> {
    let (input, first) = operand(input)?;
    fold_many0(
        preceded(padded_tag(op.as_str()), operand),
        move || first.clone(),
        move |left, right| Expr::binary(op, left, right),
    )(input)
}

fn conjunction(input: &str) -> IResult<&str, Expr> {
    chain(input, BinaryOp::And, unary)
}

fn disjunction(input: &str) -> IResult<&str, Expr> {
    chain(input, BinaryOp::Or, conjunction)
}

/// Parses the condition of an `#if` or `#elif` directive.
///
/// The whole of `text` must be a single expression; surrounding horizontal
/// whitespace is ignored.
pub fn parse_expression(text: &str) -> Result<Expr, ParseError> {
    match all_consuming(delimited(space0, disjunction, space0))(text) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ParseError {
            expression: text.to_owned(),
            column: text.len() - e.input.len() + 1,
        }),
        Err(nom::Err::Incomplete(_)) => Err(ParseError {
            expression: text.to_owned(),
            column: text.len() + 1,
        }),
    }
}
