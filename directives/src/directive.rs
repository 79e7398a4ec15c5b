//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*#(?P<keyword>if|elif|else|endif|ifdef|ifndef)\b").expect("valid regex")
});

// The condition runs up to a comment marker or the end of the line; trailing
// blanks are not part of it. An `#if` without one is not a directive.
static CONDITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?P<condition>[^/ \t][^/]*?)[ \t]*(?:/.*)?$").expect("valid regex")
});

/// Splits `text` into lines that keep their terminators.
///
/// Concatenating the result reproduces `text` exactly; only the last line may
/// lack a terminator.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Splits a line into its content and its terminator (`""`, `"\n"` or `"\r\n"`).
pub fn split_terminator(line: &str) -> (&str, &str) {
    let content = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line);
    line.split_at(content.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Elif,
    Else,
    Endif,
    /// `#ifdef` and `#ifndef`: opens a level whose condition is not evaluated.
    Opaque,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::Endif => "endif",
            Keyword::Opaque => "ifdef/ifndef",
        }
    }
}

/// A recognized conditional-compilation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    line: &'a str,
    pub keyword: Keyword,
    keyword_span: Range<usize>,
    /// Byte range of the condition of an `#if` or `#elif`.
    condition_span: Option<Range<usize>>,
}

impl<'a> Directive<'a> {
    /// Recognizes `line` (terminator included) as a directive.
    pub fn parse(line: &'a str) -> Option<Self> {
        let (content, _) = split_terminator(line);
        let keyword_match = DIRECTIVE_RE.captures(content)?.name("keyword")?;
        let keyword = match keyword_match.as_str() {
            "if" => Keyword::If,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "endif" => Keyword::Endif,
            _ => Keyword::Opaque,
        };

        let condition_span = match keyword {
            Keyword::If | Keyword::Elif => {
                let rest_start = keyword_match.end();
                let condition = CONDITION_RE
                    .captures(&content[rest_start..])?
                    .name("condition")?;
                Some(rest_start + condition.start()..rest_start + condition.end())
            }
            _ => None,
        };

        Some(Directive {
            line,
            keyword,
            keyword_span: keyword_match.range(),
            condition_span,
        })
    }

    /// The keyword as written, e.g. `ifndef`.
    pub fn name(&self) -> &'a str {
        &self.line[self.keyword_span.clone()]
    }

    /// Condition text of an `#if` or `#elif`, as written.
    pub fn condition(&self) -> Option<&'a str> {
        self.condition_span.clone().map(|span| &self.line[span])
    }

    /// Rebuilds the line with another condition text, keeping indentation,
    /// trailing comment and terminator.
    pub fn with_condition(&self, condition: &str) -> String {
        let Some(span) = self.condition_span.clone() else {
            return self.line.to_owned();
        };
        let mut out = String::with_capacity(self.line.len() + condition.len());
        out.push_str(&self.line[..span.start]);
        out.push_str(condition);
        out.push_str(&self.line[span.end..]);
        out
    }

    /// Rebuilds an `#elif` line as an `#else`, keeping any trailing comment.
    pub fn as_else(&self) -> String {
        let Some(span) = self.condition_span.clone() else {
            return self.line.to_owned();
        };
        let mut out = String::with_capacity(self.line.len());
        out.push_str(&self.line[..self.keyword_span.start]);
        out.push_str(Keyword::Else.as_str());
        out.push_str(&self.line[span.end..]);
        out
    }
}
