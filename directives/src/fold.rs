//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Partial evaluation of conditions once some symbols have a known value.

use log::trace;

use crate::expr::{BinaryOp, Expr};

/// A symbol whose truth value is asserted by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub symbol: String,
    pub value: bool,
}

impl Assignment {
    pub fn new(symbol: impl Into<String>, value: bool) -> Self {
        Self {
            symbol: symbol.into(),
            value,
        }
    }
}

/// Outcome of substituting one symbol into a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// The symbol does not occur.
    Unchanged,
    /// Every occurrence of the symbol was eliminated, but other symbols remain.
    Reduced(Expr),
    /// The value of the whole tree no longer depends on any symbol.
    Constant(bool),
}

/// Outcome of applying a whole assignment list to a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Constant(bool),
    /// Remaining condition; `reduced` is set if it differs from the input.
    Expr { expr: Expr, reduced: bool },
}

impl Expr {
    /// Replaces `symbol` with `value` and simplifies what that decides.
    pub fn substitute(&self, symbol: &str, value: bool) -> Substitution {
        match self {
            Expr::Symbol(name) if name == symbol => Substitution::Constant(value),
            Expr::Symbol(_) => Substitution::Unchanged,
            Expr::Not(child) => match child.substitute(symbol, value) {
                Substitution::Constant(c) => Substitution::Constant(!c),
                Substitution::Reduced(t) => Substitution::Reduced(Expr::not(t)),
                Substitution::Unchanged => Substitution::Unchanged,
            },
            Expr::And(left, right) => substitute_binary(BinaryOp::And, left, right, symbol, value),
            Expr::Or(left, right) => substitute_binary(BinaryOp::Or, left, right, symbol, value),
        }
    }
}

fn substitute_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    symbol: &str,
    value: bool,
) -> Substitution {
    use Substitution::*;

    // the constant that decides `op` on its own
    let dominant = op == BinaryOp::Or;

    match (left.substitute(symbol, value), right.substitute(symbol, value)) {
        (Unchanged, Unchanged) => Unchanged,
        (Constant(l), Constant(r)) => Constant(match op {
            BinaryOp::And => l && r,
            BinaryOp::Or => l || r,
        }),
        (Constant(c), _) | (_, Constant(c)) if c == dominant => Constant(c),
        (Constant(_), Reduced(other)) | (Reduced(other), Constant(_)) => Reduced(other),
        (Constant(_), Unchanged) => Reduced(right.clone()),
        (Unchanged, Constant(_)) => Reduced(left.clone()),
        (Reduced(l), Reduced(r)) => Reduced(Expr::binary(op, l, r)),
        (Reduced(l), Unchanged) => Reduced(Expr::binary(op, l, right.clone())),
        (Unchanged, Reduced(r)) => Reduced(Expr::binary(op, left.clone(), r)),
    }
}

/// Applies `assignments` in order, stopping at the first one that makes the
/// condition constant.
pub fn resolve(expr: &Expr, assignments: &[Assignment]) -> Resolution {
    let mut current: Option<Expr> = None;

    for assignment in assignments {
        let tree = current.as_ref().unwrap_or(expr);
        match tree.substitute(&assignment.symbol, assignment.value) {
            Substitution::Unchanged => {}
            Substitution::Reduced(t) => {
                trace!("{}={}: {} -> {}", assignment.symbol, assignment.value, tree, t);
                current = Some(t);
            }
            Substitution::Constant(c) => {
                trace!("{}={}: {} -> {}", assignment.symbol, assignment.value, tree, c);
                return Resolution::Constant(c);
            }
        }
    }

    match current {
        Some(t) => Resolution::Expr {
            reduced: t != *expr,
            expr: t,
        },
        None => Resolution::Expr {
            expr: expr.clone(),
            reduced: false,
        },
    }
}
