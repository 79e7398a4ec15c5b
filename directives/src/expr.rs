//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Condition trees for `#if` and `#elif` directives.
//!
//! The [`Display`](fmt::Display) implementation is the canonical form: operators
//! are surrounded by single spaces and parentheses appear only where a binary
//! operand uses a different operator than its parent, or under a `!`.

use std::fmt;

/// A boolean condition over feature symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Symbol(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Binary operator of an [`Expr::And`] or [`Expr::Or`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Expr) -> Self {
        Expr::Not(Box::new(child))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        match op {
            BinaryOp::And => Expr::and(left, right),
            BinaryOp::Or => Expr::or(left, right),
        }
    }

    /// Returns the operator and operands if this is a binary node.
    pub fn as_binary(&self) -> Option<(BinaryOp, &Expr, &Expr)> {
        match self {
            Expr::And(left, right) => Some((BinaryOp::And, left, right)),
            Expr::Or(left, right) => Some((BinaryOp::Or, left, right)),
            Expr::Symbol(_) | Expr::Not(_) => None,
        }
    }

    /// Leaf symbols in left-to-right order, duplicates included.
    pub fn symbols(&self) -> Symbols<'_> {
        Symbols { stack: vec![self] }
    }

    /// Evaluates the condition, asking `lookup` for the value of each symbol.
    ///
    /// Returns `None` if `lookup` has no value for a symbol that the result
    /// depends on. `&&` and `||` short-circuit left to right.
    pub fn evaluate<F>(&self, lookup: &F) -> Option<bool>
    where
        F: Fn(&str) -> Option<bool>,
    {
        match self {
            Expr::Symbol(name) => lookup(name),
            Expr::Not(child) => child.evaluate(lookup).map(|value| !value),
            Expr::And(left, right) => match left.evaluate(lookup)? {
                false => Some(false),
                true => right.evaluate(lookup),
            },
            Expr::Or(left, right) => match left.evaluate(lookup)? {
                true => Some(true),
                false => right.evaluate(lookup),
            },
        }
    }

    fn fmt_operand(&self, parent: Option<BinaryOp>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wrap = match (self.as_binary(), parent) {
            (Some((op, _, _)), Some(parent)) => op != parent,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if wrap {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Symbol(name) => f.write_str(name),
            Expr::Not(child) => {
                f.write_str("!")?;
                child.fmt_operand(None, f)
            }
            Expr::And(left, right) => fmt_binary(BinaryOp::And, left, right, f),
            Expr::Or(left, right) => fmt_binary(BinaryOp::Or, left, right, f),
        }
    }
}

fn fmt_binary(op: BinaryOp, left: &Expr, right: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    left.fmt_operand(Some(op), f)?;
    write!(f, " {} ", op.as_str())?;
    right.fmt_operand(Some(op), f)
}

/// Iterator returned by [`Expr::symbols`].
pub struct Symbols<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> Iterator for Symbols<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Expr::Symbol(name) => return Some(name),
                Expr::Not(child) => self.stack.push(child),
                Expr::And(left, right) | Expr::Or(left, right) => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
        None
    }
}
