// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::info::{PathComparison, PathInformation};
use crate::error::{Error, Result};

/// Whether a path is anchored at a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Absolute,
    Relative,
}

/// An immutable location in a store.
///
/// The kind, name and extension are computed when the path is built. Root,
/// parent and full path are computed on first access and memoized.
///
/// Two paths are equal when their full paths are equal under the store's
/// [`PathComparison`]; the raw text only matters for display.
#[derive(Clone)]
pub struct StoragePath {
    info: Arc<PathInformation>,
    raw: String,
    kind: PathKind,
    name: String,
    name_without_extension: String,
    extension: Option<String>,
    root: OnceLock<Option<Box<StoragePath>>>,
    parent: OnceLock<Option<Box<StoragePath>>>,
    // None when this path is already its own full path
    full_path: OnceLock<Option<Box<StoragePath>>>,
    key: OnceLock<String>,
}

/// Byte length of the root prefix of `s`, or 0 for a relative path.
pub(crate) fn root_len(info: &PathInformation, s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if info.is_separator(c) => c.len_utf8(),
        Some((_, letter)) if letter.is_ascii_alphabetic() => {
            let Some(vol) = info.volume_separator else {
                return 0;
            };
            match (chars.next(), chars.next()) {
                (Some((i, v)), None) if v == vol => i + v.len_utf8(),
                (Some((_, v)), Some((j, sep))) if v == vol && info.is_separator(sep) => {
                    j + sep.len_utf8()
                }
                _ => 0,
            }
        }
        _ => 0,
    }
}

/// Canonical spelling of a root prefix: `/`, or `C:` followed by the separator.
fn normalized_root(info: &PathInformation, raw_root: &str) -> String {
    let mut root = String::new();
    let mut chars = raw_root.chars();
    if let (Some(letter), Some(vol)) = (chars.next(), info.volume_separator) {
        if !info.is_separator(letter) {
            root.push(letter);
            root.push(vol);
        }
    }
    root.push(info.directory_separator);
    root
}

fn segments<'s>(info: &PathInformation, body: &'s str) -> impl Iterator<Item = &'s str> {
    body.split(move |c| info.is_separator(c))
        .filter(|s| !s.is_empty())
}

/// Pushes the segments of `body` onto `stack`, resolving `.` and `..`.
fn resolve_segments<'s>(info: &PathInformation, stack: &mut Vec<&'s str>, body: &'s str) {
    for seg in segments(info, body) {
        if seg == info.current_directory_segment {
            continue;
        }
        if seg == info.parent_directory_segment {
            // `..` at the root stays at the root
            stack.pop();
            continue;
        }
        stack.push(seg);
    }
}

fn trim_trailing_separators<'a>(info: &PathInformation, body: &'a str) -> &'a str {
    body.trim_end_matches(|c| info.is_separator(c))
}

impl StoragePath {
    /// Parses `path` under the rules of `info`.
    ///
    /// Fails with a malformed-path error for an empty string or one that
    /// contains a character listed in `invalid_path_chars`.
    pub fn new<S: Into<String>>(info: Arc<PathInformation>, path: S) -> Result<Self> {
        let raw = path.into();
        if raw.is_empty() {
            return Err(Error::malformed_path(&raw, "path is empty"));
        }
        if let Some(c) = raw.chars().find(|&c| info.is_invalid_path_char(c)) {
            return Err(Error::malformed_path(
                &raw,
                format!("invalid path character {c:?}"),
            ));
        }
        Ok(Self::from_validated(info, raw))
    }

    /// Like [`StoragePath::new`], treating an absent string as malformed.
    pub fn from_optional(info: Arc<PathInformation>, path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::new(info, path),
            None => Err(Error::malformed_path("", "path is absent")),
        }
    }

    fn from_validated(info: Arc<PathInformation>, raw: String) -> Self {
        let rl = root_len(&info, &raw);
        let kind = if rl > 0 {
            PathKind::Absolute
        } else {
            PathKind::Relative
        };

        let body = trim_trailing_separators(&info, &raw[rl..]);
        let name = segments(&info, body).last().unwrap_or("").to_string();
        let (name_without_extension, extension) = split_extension(&info, &name);

        Self {
            info,
            raw,
            kind,
            name,
            name_without_extension,
            extension,
            root: OnceLock::new(),
            parent: OnceLock::new(),
            full_path: OnceLock::new(),
            key: OnceLock::new(),
        }
    }

    fn derive(&self, raw: String) -> StoragePath {
        Self::from_validated(self.info.clone(), raw)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn path_information(&self) -> &PathInformation {
        &self.info
    }

    /// The root that relative paths of `info` end up under.
    pub(crate) fn current_root(info: Arc<PathInformation>) -> StoragePath {
        let rl = root_len(&info, &info.current_directory);
        let root = normalized_root(&info, &info.current_directory[..rl]);
        Self::from_validated(info, root)
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn is_absolute(&self) -> bool {
        self.kind == PathKind::Absolute
    }

    /// Final segment, ignoring trailing separators. Empty for a root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_without_extension(&self) -> &str {
        &self.name_without_extension
    }

    /// Text after the last extension separator of the name, without the
    /// separator itself. None if there is no separator or nothing follows it.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn ends_with_separator(&self) -> bool {
        self.raw.chars().last().is_some_and(|c| self.info.is_separator(c))
    }

    /// The root prefix in canonical form; None for relative paths.
    pub fn root(&self) -> Option<&StoragePath> {
        self.root
            .get_or_init(|| {
                let rl = root_len(&self.info, &self.raw);
                (rl > 0).then(|| Box::new(self.derive(normalized_root(&self.info, &self.raw[..rl]))))
            })
            .as_deref()
    }

    /// The containing location with the last segment stripped.
    ///
    /// Separators are normalized but `.` and `..` are kept as written, so the
    /// parent of a relative path is relative. None for a root, and for a
    /// relative path with a single segment.
    pub fn parent(&self) -> Option<&StoragePath> {
        self.parent
            .get_or_init(|| self.compute_parent().map(|raw| Box::new(self.derive(raw))))
            .as_deref()
    }

    /// The absolute, normalized form of this path: relative paths are
    /// anchored at the store's current directory, `.` and `..` segments are
    /// resolved, separators are canonical and trailing separators removed.
    pub fn full_path(&self) -> &StoragePath {
        let memo = self.full_path.get_or_init(|| {
            let full = self.compute_full();
            if full == self.raw {
                None
            } else {
                Some(Box::new(self.derive(full)))
            }
        });
        match memo.as_deref() {
            Some(full) => full,
            None => self,
        }
    }

    /// True when the full path has no parent.
    pub fn is_root(&self) -> bool {
        self.full_path().parent().is_none()
    }

    /// The string registry lookups are keyed on.
    pub(crate) fn comparison_key(&self) -> &str {
        self.key.get_or_init(|| {
            let full = self.full_path().as_str();
            match self.info.comparison {
                PathComparison::CaseSensitive => full.to_string(),
                PathComparison::CaseInsensitive => full.to_lowercase(),
            }
        })
    }

    /// Concatenates `suffix` to the raw text, e.g. to add an extension.
    pub fn append<S: AsRef<str>>(&self, suffix: S) -> Result<StoragePath> {
        let suffix = suffix.as_ref();
        if suffix.is_empty() {
            return Ok(self.clone());
        }
        Self::new(self.info.clone(), format!("{}{}", self.raw, suffix))
    }

    /// Concatenates `other` with exactly the separators needed between the
    /// two. An absolute `other` is appended, not substituted.
    pub fn join<S: AsRef<str>>(&self, other: S) -> Result<StoragePath> {
        let other = other.as_ref();
        if other.is_empty() {
            return Ok(self.clone());
        }
        let starts_with_sep = other.chars().next().is_some_and(|c| self.info.is_separator(c));
        let joined = if self.ends_with_separator() || starts_with_sep {
            format!("{}{}", self.raw, other)
        } else {
            format!("{}{}{}", self.raw, self.info.directory_separator, other)
        };
        Self::new(self.info.clone(), joined)
    }

    /// Resolves `other` against this path: an absolute `other` replaces this
    /// path entirely, a relative one is joined. An empty `other` is not a
    /// valid fragment.
    pub fn combine<S: AsRef<str>>(&self, other: S) -> Result<StoragePath> {
        let other = other.as_ref();
        if other.is_empty() {
            return Err(Error::malformed_path(
                &self.raw,
                "cannot combine with an empty path",
            ));
        }
        if root_len(&self.info, other) > 0 {
            return Self::new(self.info.clone(), other);
        }
        self.join(other)
    }

    /// This path without trailing separators; a root keeps its separator.
    pub fn trim_end_separator(&self) -> StoragePath {
        let rl = root_len(&self.info, &self.raw);
        let body = trim_trailing_separators(&self.info, &self.raw[rl..]);
        if rl + body.len() == self.raw.len() {
            return self.clone();
        }
        self.derive(format!("{}{}", &self.raw[..rl], body))
    }

    fn compute_parent(&self) -> Option<String> {
        let info = &*self.info;
        let rl = root_len(info, &self.raw);
        let body = trim_trailing_separators(info, &self.raw[rl..]);
        let segs: Vec<&str> = segments(info, body).collect();
        let (_, parent_segs) = segs.split_last()?;
        let joined = parent_segs.join(&info.directory_separator.to_string());
        if rl > 0 {
            Some(normalized_root(info, &self.raw[..rl]) + &joined)
        } else if parent_segs.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    fn compute_full(&self) -> String {
        let info = &*self.info;
        let mut stack: Vec<&str> = Vec::new();

        let rl = root_len(info, &self.raw);
        let root = if rl > 0 {
            resolve_segments(info, &mut stack, &self.raw[rl..]);
            normalized_root(info, &self.raw[..rl])
        } else {
            let cwd = &info.current_directory;
            let crl = root_len(info, cwd);
            resolve_segments(info, &mut stack, &cwd[crl..]);
            resolve_segments(info, &mut stack, &self.raw);
            normalized_root(info, &cwd[..crl])
        };
        root + &stack.join(&info.directory_separator.to_string())
    }
}

fn split_extension(info: &PathInformation, name: &str) -> (String, Option<String>) {
    if name == info.current_directory_segment || name == info.parent_directory_segment {
        return (name.to_string(), None);
    }
    match name.rfind(info.extension_separator) {
        Some(i) => {
            let ext = &name[i + info.extension_separator.len_utf8()..];
            let ext = (!ext.is_empty()).then(|| ext.to_string());
            (name[..i].to_string(), ext)
        }
        None => (name.to_string(), None),
    }
}

impl PartialEq for StoragePath {
    fn eq(&self, other: &Self) -> bool {
        self.comparison_key() == other.comparison_key()
    }
}

impl Eq for StoragePath {}

impl Hash for StoragePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.comparison_key().hash(state);
    }
}

impl PartialOrd for StoragePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StoragePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparison_key().cmp(other.comparison_key())
    }
}

impl AsRef<str> for StoragePath {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl std::fmt::Debug for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StoragePath").field(&self.raw).finish()
    }
}
