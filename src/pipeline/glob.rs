// src/pipeline/glob.rs

//! Input pattern compilation and file enumeration.
//!
//! An input pattern like `src/styles/**/*.scss` is split into a static base
//! directory (`src/styles`, everything before the first glob meta character)
//! and a matcher over base-relative paths (`**/*.scss`). Relative structure
//! below the base is what gets preserved in the output tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Build a `GlobSet` from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// A single file matched by an [`InputPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// Absolute (or root-joined) path for reading.
    pub abs: PathBuf,
    /// Path relative to the pattern's base directory; determines where the
    /// file lands under the output directory.
    pub rel: PathBuf,
}

/// Compiled input pattern for one pipeline group.
#[derive(Debug, Clone)]
pub struct InputPattern {
    raw: String,
    /// Base directory to walk, joined onto the project root.
    base: PathBuf,
    /// Project-root-relative base prefix with `/` separators (may be empty);
    /// used to reconstruct root-relative paths for exclusion matching.
    prefix: String,
    matcher: GlobSet,
    /// Exclude patterns are matched against project-root-relative paths.
    exclude: Option<GlobSet>,
}

impl InputPattern {
    /// Compile a project-root-relative glob pattern plus optional exclude
    /// patterns.
    pub fn compile(root: &Path, pattern: &str, excludes: &[String]) -> Result<Self> {
        let (prefix, remainder) = split_static_prefix(pattern);

        let base = if prefix.is_empty() {
            root.to_path_buf()
        } else {
            root.join(&prefix)
        };

        let matcher = build_globset(&[remainder.clone()])
            .with_context(|| format!("compiling input pattern '{pattern}'"))?;

        let exclude = if excludes.is_empty() {
            None
        } else {
            Some(
                build_globset(excludes)
                    .with_context(|| format!("compiling exclude patterns for '{pattern}'"))?,
            )
        };

        Ok(Self {
            raw: pattern.to_string(),
            base,
            prefix,
            matcher,
            exclude,
        })
    }

    /// The original pattern string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The static base directory this pattern walks.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether a base-relative path (with `/` separators) is matched,
    /// taking excludes into account.
    pub fn matches_rel(&self, rel: &str) -> bool {
        if !self.matcher.is_match(rel) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            let root_rel = if self.prefix.is_empty() {
                rel.to_string()
            } else {
                format!("{}/{}", self.prefix, rel)
            };
            if exclude.is_match(root_rel.as_str()) {
                return false;
            }
        }
        true
    }

    /// Enumerate all files under the base directory that match this pattern.
    ///
    /// A missing base directory is an empty match, not an error: the build
    /// simply has nothing to do for this group.
    pub fn enumerate(&self) -> Result<Vec<MatchedFile>> {
        let mut files = Vec::new();

        if !self.base.is_dir() {
            return Ok(files);
        }

        let mut stack = vec![self.base.clone()];
        while let Some(dir) = stack.pop() {
            let entries = std::fs::read_dir(&dir)
                .with_context(|| format!("reading directory {}", dir.display()))?;
            for entry in entries {
                let entry = entry?;
                let path = entry.path();
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    stack.push(path);
                } else if file_type.is_file() {
                    if let Ok(rel) = path.strip_prefix(&self.base) {
                        let rel_str = rel.to_string_lossy().replace('\\', "/");
                        if self.matches_rel(&rel_str) {
                            files.push(MatchedFile {
                                abs: path.clone(),
                                rel: rel.to_path_buf(),
                            });
                        }
                    }
                }
            }
        }

        // Directory iteration order is platform-dependent; sort so pipeline
        // runs process files in a reproducible order.
        files.sort_by(|a, b| a.rel.cmp(&b.rel));
        Ok(files)
    }
}

/// Split a pattern into its static directory prefix and the glob remainder.
///
/// `src/styles/**/*.css` -> (`src/styles`, `**/*.css`)
/// `src/index.html`      -> (`src`, `index.html`)
/// `**/*.js`             -> (``, `**/*.js`)
fn split_static_prefix(pattern: &str) -> (String, String) {
    let components: Vec<&str> = pattern.split('/').collect();
    let split_at = components
        .iter()
        .position(|c| c.contains(['*', '?', '[', '{']))
        .unwrap_or(components.len().saturating_sub(1));

    let prefix = components[..split_at].join("/");
    let remainder = components[split_at..].join("/");
    (prefix, remainder)
}
