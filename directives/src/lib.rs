//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, Write};

use clap::builder::{TypedValueParser, ValueParserFactory};
use gettextrs::gettext;
use log::info;

use error::{Error, Result};
use fold::Assignment;

pub mod block;
pub mod directive;
pub mod error;
pub mod expr;
pub mod files;
pub mod fold;
pub mod parser;

pub const PROJECT_NAME: &str = "cleanup-directives";

fn is_symbol(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses `NAME` or `NAME=VALUE` where VALUE is `1`, `0`, `true` or `false`.
pub fn parse_assignment(text: &str) -> Result<Assignment> {
    let (name, value) = match text.split_once('=') {
        Some((name, "1" | "true")) => (name, true),
        Some((name, "0" | "false")) => (name, false),
        Some(_) => return Err(Error::InvalidAssignment(text.to_owned())),
        None => (text, true),
    };
    if !is_symbol(name) {
        return Err(Error::InvalidAssignment(text.to_owned()));
    }
    Ok(Assignment::new(name, value))
}

#[derive(Clone)]
pub struct AssignmentParser;

impl TypedValueParser for AssignmentParser {
    type Value = Assignment;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> std::result::Result<Self::Value, clap::Error> {
        let text = value.to_string_lossy();
        parse_assignment(&text).map_err(|e| {
            clap::Error::raw(clap::error::ErrorKind::InvalidValue, format!("{e}\n")).with_cmd(cmd)
        })
    }
}

impl ValueParserFactory for Assignment {
    type Parser = AssignmentParser;

    fn value_parser() -> Self::Parser {
        AssignmentParser
    }
}

/// cleanup-directives - remove #if blocks whose outcome is known
#[derive(Debug, clap::Parser, Clone)]
#[command(version, about)]
pub struct Args {
    /// Assert that NAME is true, or has the given VALUE (1, 0, true or false).
    #[arg(short = 'D', long, value_name = "NAME[=VALUE]")]
    pub define: Vec<Assignment>,

    /// Assert that NAME is false.
    #[arg(short = 'U', long, value_name = "NAME")]
    pub undefine: Vec<String>,

    /// Exclude files and directories matching GLOB, and everything below them.
    #[arg(short = 'x', long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Reformat every remaining #if and #elif expression.
    #[arg(long)]
    pub format: bool,

    /// List all unique #if and #elif expressions left in the files.
    #[arg(long = "list-expr")]
    pub list_expressions: bool,

    /// List all symbols used by the expressions left in the files.
    #[arg(long = "list-symbols")]
    pub list_symbols: bool,

    /// Report what would change without writing any file.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write changed files without asking for confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Clean up files matching GLOB, e.g. **/*.cs (case-insensitive).
    #[arg(required = true, value_name = "GLOB")]
    pub globs: Vec<String>,
}

impl Args {
    /// Settings for the block state machine.
    ///
    /// `--define` assignments come before `--undefine` ones.
    pub fn options(&self) -> Result<block::Options> {
        let mut assignments = self.define.clone();
        for name in &self.undefine {
            if !is_symbol(name) {
                return Err(Error::InvalidAssignment(name.clone()));
            }
            assignments.push(Assignment::new(name.as_str(), false));
        }
        Ok(block::Options {
            assignments,
            format: self.format,
        })
    }
}

fn list<W: Write>(stdout: &mut W, title: &str, items: &BTreeSet<String>) -> Result<()> {
    writeln!(stdout, "{title}")?;
    for item in items {
        writeln!(stdout, "{item}")?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn confirm<R: BufRead, W: Write>(stdin: &mut R, stdout: &mut W, count: usize) -> Result<bool> {
    write!(stdout, "{}", gettext!("Write {} changed file(s)? ", count))?;
    stdout.flush()?;

    let mut line = String::new();
    stdin.read_line(&mut line)?;
    Ok(line.starts_with('y') || line.starts_with('Y'))
}

pub fn run<R: BufRead, W: Write, E: Write>(
    stdin: &mut R,
    stdout: &mut W,
    stderr: &mut E,
    args: Args,
) -> Result<()> {
    let result = run_impl(stdin, stdout, args);
    if let Err(error) = &result {
        writeln!(stderr, "{error}")?;
    }
    result
}

/// Cleans every selected file in memory, then writes the changed ones.
///
/// Nothing is written unless every file was processed successfully.
pub fn run_impl<R: BufRead, W: Write>(stdin: &mut R, stdout: &mut W, args: Args) -> Result<()> {
    let options = args.options()?;
    let paths = files::select_files(&args.globs, &args.exclude)?;

    let mut expressions = BTreeSet::new();
    let mut symbols = BTreeSet::new();
    let mut changed = Vec::new();

    writeln!(stdout, "{}", gettext("Files:"))?;
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|e| Error::from(e).in_file(&path))?;
        let cleaned = block::clean(&text, &options).map_err(|e| e.in_file(&path))?;

        let status = if cleaned.changed {
            gettext("[changed]")
        } else {
            gettext("[unchanged]")
        };
        writeln!(stdout, "{} {status}", path.display())?;
        info!(
            "{}: {} expressions, {} symbols",
            path.display(),
            cleaned.expressions.len(),
            cleaned.symbols.len()
        );

        expressions.extend(cleaned.expressions);
        symbols.extend(cleaned.symbols);
        if cleaned.changed {
            changed.push((path, cleaned.text));
        }
    }
    writeln!(stdout)?;

    if args.list_expressions {
        list(stdout, &gettext("Expressions:"), &expressions)?;
    }
    if args.list_symbols {
        list(stdout, &gettext("Symbols:"), &symbols)?;
    }

    if changed.is_empty() || args.dry_run {
        return Ok(());
    }
    if !args.yes && !confirm(stdin, stdout, changed.len())? {
        writeln!(stdout, "{}", gettext("Nothing written."))?;
        return Ok(());
    }

    for (path, text) in &changed {
        fs::write(path, text).map_err(|e| Error::from(e).in_file(path))?;
    }
    writeln!(stdout, "{}", gettext!("{} file(s) written.", changed.len()))?;
    Ok(())
}
