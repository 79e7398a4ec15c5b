//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

fn is_glob(component: &Component) -> bool {
    component
        .as_os_str()
        .to_string_lossy()
        .contains(['*', '?', '[', '{'])
}

/// A pattern made absolute, split at its first component holding a
/// wildcard.
struct Pattern {
    matcher: GlobMatcher,
    /// Directory to walk: the pattern's literal prefix.
    base: PathBuf,
    /// Depth below `base` a match can have, unbounded for `**`.
    depth: Option<usize>,
}

impl Pattern {
    fn new(cwd: &Path, text: &str) -> Result<Self> {
        let path: PathBuf = cwd.join(text).components().collect();
        let glob = GlobBuilder::new(&path.to_string_lossy())
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|source| Error::Glob {
                pattern: text.to_owned(),
                source,
            })?;

        let mut components = path.components();
        let mut base = PathBuf::new();
        let mut rest = Vec::new();
        for component in components.by_ref() {
            if is_glob(&component) {
                rest.push(component);
                break;
            }
            base.push(component);
        }
        rest.extend(components);

        let depth = if rest.iter().any(|c| c.as_os_str().to_string_lossy().contains("**")) {
            None
        } else {
            Some(rest.len())
        };

        Ok(Pattern {
            matcher: glob.compile_matcher(),
            base,
            depth,
        })
    }

    /// Adds every file and directory matching the pattern to `found`,
    /// recording whether it is a directory.
    fn find(&self, found: &mut BTreeMap<PathBuf, bool>) -> Result<()> {
        if !self.base.exists() {
            debug!("{}: no such directory", self.base.display());
            return Ok(());
        }

        let mut walk = WalkDir::new(&self.base).follow_links(false);
        if let Some(depth) = self.depth {
            walk = walk.max_depth(depth);
        }
        for entry in walk {
            let entry = entry.map_err(|e| Error::from(io::Error::from(e)).in_file(&self.base))?;
            if self.matcher.is_match(entry.path()) {
                let is_dir = entry.file_type().is_dir();
                found.insert(entry.into_path(), is_dir);
            }
        }
        Ok(())
    }
}

/// Absolute paths of everything matching `globs`, sorted and free of
/// duplicates, each with whether it is a directory.
fn find_all(cwd: &Path, globs: &[String]) -> Result<BTreeMap<PathBuf, bool>> {
    let mut found = BTreeMap::new();
    for text in globs {
        Pattern::new(cwd, text)?.find(&mut found)?;
    }
    Ok(found)
}

/// Lists the files matching `globs`, dropping those matching `excludes` and
/// everything below an excluded directory.
///
/// Patterns are case-insensitive; relative ones are taken from the current
/// directory. The result is absolute, sorted and free of duplicates.
pub fn select_files(globs: &[String], excludes: &[String]) -> Result<Vec<PathBuf>> {
    let cwd = env::current_dir()?;
    select_files_in(&cwd, globs, excludes)
}

fn select_files_in(cwd: &Path, globs: &[String], excludes: &[String]) -> Result<Vec<PathBuf>> {
    let excluded = find_all(cwd, excludes)?;
    let mut found: Vec<(PathBuf, bool)> = find_all(cwd, globs)?
        .into_iter()
        .filter(|(path, _)| !excluded.contains_key(path))
        .collect();
    if found.is_empty() {
        return Err(Error::NoFiles);
    }

    found.retain(|(path, _)| {
        let hidden = excluded.keys().any(|exclude| path.starts_with(exclude));
        if hidden {
            debug!("excluding {}", path.display());
        }
        !hidden
    });
    if found.is_empty() {
        return Err(Error::AllExcluded);
    }

    if let Some((path, _)) = found.iter().find(|(_, is_dir)| *is_dir) {
        return Err(Error::DirectoryMatched(path.clone()));
    }

    Ok(found.into_iter().map(|(path, _)| path).collect())
}
