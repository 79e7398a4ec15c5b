//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;

/// A condition that is not a well-formed `!`/`&&`/`||` expression.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid expression '{expression}' at column {column}")]
pub struct ParseError {
    pub expression: String,
    /// 1-based column of the first character that could not be consumed.
    pub column: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },
    #[error("line {line}: #{directive} without matching #if")]
    DirectiveSyntax { line: usize, directive: &'static str },
    #[error("line {line}: #if without matching #endif")]
    UnterminatedIf { line: usize },
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error(
        "Directories not supported; use glob to select files, e.g. **/*.cs\nDirectory matched: {}",
        .0.display()
    )]
    DirectoryMatched(PathBuf),
    #[error("invalid symbol assignment '{0}'")]
    InvalidAssignment(String),
    #[error("No files found.")]
    NoFiles,
    #[error("All files excluded.")]
    AllExcluded,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait GetExitCode {
    fn get_exit_code(&self) -> i32;
}

impl<T> GetExitCode for Result<T> {
    fn get_exit_code(&self) -> i32 {
        match self {
            Ok(_) => 0,
            Err(_) => 2,
        }
    }
}
