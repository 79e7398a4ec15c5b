//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Line-by-line removal of conditional blocks whose outcome is known.
//!
//! Every open `#if` level on the stack records a [`BlockState`] and whether
//! the directive that opened it is still present in the output. A level whose
//! opening directive was removed must lose its `#endif` too, and a level whose
//! opening directive survives must keep its `#endif` even when some of its
//! branches were removed.

use std::collections::BTreeSet;

use log::debug;

use crate::directive::{split_lines, Directive, Keyword};
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::fold::{self, Assignment, Resolution};
use crate::parser::parse_expression;

/// State of the innermost open `#if` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// The current branch is kept and its condition left for the compiler.
    Normal,
    /// Everything up to the matching `#endif` is removed.
    DeleteToEnd,
    /// The current branch is known to be taken.
    IfTrue,
    /// The current branch is known not to be taken.
    IfFalse,
}

impl BlockState {
    fn is_dead(self) -> bool {
        matches!(self, BlockState::DeleteToEnd | BlockState::IfFalse)
    }
}

#[derive(Debug, Clone, Copy)]
struct Level {
    state: BlockState,
    /// Whether the directive that opened this level survives in the output.
    guarded: bool,
    /// Line of the opening directive, 1-based.
    line: usize,
}

const TOP_LEVEL: Level = Level {
    state: BlockState::Normal,
    guarded: true,
    line: 0,
};

/// Settings shared by every file of a run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Symbol values, applied in order.
    pub assignments: Vec<Assignment>,
    /// Rewrite every surviving condition in canonical form.
    pub format: bool,
}

/// Result of cleaning one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cleaned {
    pub text: String,
    pub changed: bool,
    /// Conditions of the `#if` and `#elif` lines left in the output.
    pub expressions: BTreeSet<String>,
    /// Symbols used by those conditions.
    pub symbols: BTreeSet<String>,
}

enum Edit {
    Keep,
    Delete,
    Replace(String),
}

struct Cleaner<'o> {
    options: &'o Options,
    levels: Vec<Level>,
    expressions: BTreeSet<String>,
    symbols: BTreeSet<String>,
}

impl<'o> Cleaner<'o> {
    fn new(options: &'o Options) -> Self {
        Self {
            options,
            levels: Vec::new(),
            expressions: BTreeSet::new(),
            symbols: BTreeSet::new(),
        }
    }

    fn top(&self) -> Level {
        self.levels.last().copied().unwrap_or(TOP_LEVEL)
    }

    fn push(&mut self, state: BlockState, guarded: bool, line: usize) {
        self.levels.push(Level {
            state,
            guarded,
            line,
        });
    }

    fn set_top(&mut self, state: BlockState, guarded: bool) {
        if let Some(level) = self.levels.last_mut() {
            level.state = state;
            level.guarded = guarded;
        }
    }

    fn require_open(&self, number: usize, keyword: Keyword) -> Result<Level> {
        match self.levels.last() {
            Some(level) => Ok(*level),
            None => Err(Error::DirectiveSyntax {
                line: number,
                directive: keyword.as_str(),
            }),
        }
    }

    fn line(&mut self, number: usize, line: &str) -> Result<Edit> {
        let Some(directive) = Directive::parse(line) else {
            return Ok(if self.top().state.is_dead() {
                Edit::Delete
            } else {
                Edit::Keep
            });
        };

        let edit = match directive.keyword {
            Keyword::If => self.open_if(number, &directive)?,
            Keyword::Opaque => self.open_opaque(number),
            Keyword::Elif => self.elif(number, &directive)?,
            Keyword::Else => self.else_(number)?,
            Keyword::Endif => self.endif(number)?,
        };
        debug!(
            "line {number}: #{} -> {:?}",
            directive.name(),
            self.levels.last().map(|level| (level.state, level.guarded))
        );
        Ok(edit)
    }

    fn open_if(&mut self, number: usize, directive: &Directive) -> Result<Edit> {
        if self.top().state.is_dead() {
            self.push(BlockState::DeleteToEnd, false, number);
            return Ok(Edit::Delete);
        }

        Ok(match self.resolve(number, directive)? {
            Resolution::Constant(true) => {
                self.push(BlockState::IfTrue, false, number);
                Edit::Delete
            }
            Resolution::Constant(false) => {
                self.push(BlockState::IfFalse, false, number);
                Edit::Delete
            }
            Resolution::Expr { expr, reduced } => {
                self.push(BlockState::Normal, true, number);
                self.keep_condition(directive, &expr, reduced)
            }
        })
    }

    fn open_opaque(&mut self, number: usize) -> Edit {
        if self.top().state.is_dead() {
            self.push(BlockState::DeleteToEnd, false, number);
            Edit::Delete
        } else {
            self.push(BlockState::Normal, true, number);
            Edit::Keep
        }
    }

    fn elif(&mut self, number: usize, directive: &Directive) -> Result<Edit> {
        let top = self.require_open(number, Keyword::Elif)?;
        match top.state {
            BlockState::DeleteToEnd => return Ok(Edit::Delete),
            BlockState::IfTrue => {
                self.set_top(BlockState::DeleteToEnd, top.guarded);
                return Ok(Edit::Delete);
            }
            BlockState::Normal | BlockState::IfFalse => {}
        }

        Ok(match self.resolve(number, directive)? {
            Resolution::Constant(true) if top.guarded => {
                self.set_top(BlockState::IfTrue, true);
                Edit::Replace(directive.as_else())
            }
            Resolution::Constant(true) => {
                self.set_top(BlockState::IfTrue, false);
                Edit::Delete
            }
            Resolution::Constant(false) => {
                self.set_top(BlockState::IfFalse, top.guarded);
                Edit::Delete
            }
            Resolution::Expr { expr, reduced } => {
                // The line stays an #elif even when every earlier branch was
                // removed; its #endif is kept from here on.
                self.set_top(BlockState::Normal, true);
                self.keep_condition(directive, &expr, reduced)
            }
        })
    }

    fn else_(&mut self, number: usize) -> Result<Edit> {
        let top = self.require_open(number, Keyword::Else)?;
        Ok(match top.state {
            BlockState::DeleteToEnd => Edit::Delete,
            BlockState::IfTrue => {
                self.set_top(BlockState::DeleteToEnd, top.guarded);
                Edit::Delete
            }
            BlockState::IfFalse if top.guarded => {
                self.set_top(BlockState::Normal, true);
                Edit::Keep
            }
            BlockState::IfFalse => {
                self.set_top(BlockState::IfTrue, false);
                Edit::Delete
            }
            BlockState::Normal => Edit::Keep,
        })
    }

    fn endif(&mut self, number: usize) -> Result<Edit> {
        let top = self.require_open(number, Keyword::Endif)?;
        self.levels.pop();
        Ok(if top.guarded { Edit::Keep } else { Edit::Delete })
    }

    fn resolve(&self, number: usize, directive: &Directive) -> Result<Resolution> {
        let condition = directive.condition().unwrap_or_default();
        let expr = parse_expression(condition).map_err(|source| Error::Parse {
            line: number,
            source,
        })?;
        Ok(fold::resolve(&expr, &self.options.assignments))
    }

    /// Keeps a directive whose condition is still undecided.
    fn keep_condition(&mut self, directive: &Directive, expr: &Expr, reduced: bool) -> Edit {
        let original = directive.condition().unwrap_or_default();
        let condition = if reduced || self.options.format {
            expr.to_string()
        } else {
            original.to_owned()
        };

        self.symbols.extend(expr.symbols().map(str::to_owned));
        let edit = if condition != original {
            Edit::Replace(directive.with_condition(&condition))
        } else {
            Edit::Keep
        };
        self.expressions.insert(condition);
        edit
    }
}

/// Removes the conditional blocks of `text` that `options` decides.
pub fn clean(text: &str, options: &Options) -> Result<Cleaned> {
    let mut cleaner = Cleaner::new(options);
    let mut output = String::with_capacity(text.len());

    for (index, line) in split_lines(text).into_iter().enumerate() {
        match cleaner.line(index + 1, line)? {
            Edit::Keep => output.push_str(line),
            Edit::Delete => {}
            Edit::Replace(replacement) => output.push_str(&replacement),
        }
    }

    if let Some(level) = cleaner.levels.last() {
        return Err(Error::UnterminatedIf { line: level.line });
    }

    Ok(Cleaned {
        changed: output != text,
        text: output,
        expressions: cleaner.expressions,
        symbols: cleaner.symbols,
    })
}
