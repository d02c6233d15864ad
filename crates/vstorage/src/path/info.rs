// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How two full paths are compared for identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathComparison {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

/// Per-store description of what a path looks like.
///
/// Every [`StoragePath`](super::StoragePath) carries the information of the
/// store that created it; parsing, normalization and comparison all read it
/// from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathInformation {
    /// Characters that may not appear anywhere in a path.
    pub invalid_path_chars: Vec<char>,

    /// Characters that may not appear in a single name (rename targets).
    /// Must include both separators.
    pub invalid_file_name_chars: Vec<char>,

    pub directory_separator: char,

    /// Accepted on input, rewritten to `directory_separator` when normalizing.
    /// Equal to `directory_separator` when there is no alternative.
    pub alt_directory_separator: char,

    pub extension_separator: char,

    /// Separates a volume letter from the rest of an absolute path (`C:`).
    pub volume_separator: Option<char>,

    pub current_directory_segment: String,

    pub parent_directory_segment: String,

    pub comparison: PathComparison,

    /// Absolute path that relative paths are resolved against.
    pub current_directory: String,
}

impl Default for PathInformation {
    fn default() -> Self {
        Self {
            invalid_path_chars: vec!['\0'],
            invalid_file_name_chars: vec!['\0', '/'],
            directory_separator: '/',
            alt_directory_separator: '/',
            extension_separator: '.',
            volume_separator: None,
            current_directory_segment: ".".to_string(),
            parent_directory_segment: "..".to_string(),
            comparison: PathComparison::CaseSensitive,
            current_directory: "/".to_string(),
        }
    }
}

impl PathInformation {
    /// Drive-letter paths with `\` separators, compared case-insensitively.
    pub fn windows() -> Self {
        let mut invalid_path_chars: Vec<char> = (0u8..=31).map(char::from).collect();
        invalid_path_chars.extend(['"', '<', '>', '|', '?', '*']);

        let mut invalid_file_name_chars = invalid_path_chars.clone();
        invalid_file_name_chars.extend([':', '\\', '/']);

        Self {
            invalid_path_chars,
            invalid_file_name_chars,
            directory_separator: '\\',
            alt_directory_separator: '/',
            extension_separator: '.',
            volume_separator: Some(':'),
            current_directory_segment: ".".to_string(),
            parent_directory_segment: "..".to_string(),
            comparison: PathComparison::CaseInsensitive,
            current_directory: "C:\\".to_string(),
        }
    }

    /// Parses a JSON document; missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let info: PathInformation =
            serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        info.validate()?;
        Ok(info)
    }

    pub fn is_separator(&self, c: char) -> bool {
        c == self.directory_separator || c == self.alt_directory_separator
    }

    pub fn is_invalid_path_char(&self, c: char) -> bool {
        self.invalid_path_chars.contains(&c)
    }

    pub fn is_invalid_name_char(&self, c: char) -> bool {
        self.invalid_file_name_chars.contains(&c) || self.is_separator(c)
    }

    /// Checks that `name` can stand as a single path segment.
    pub fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::malformed_path(name, "name is empty"));
        }
        if let Some(c) = name.chars().find(|&c| self.is_invalid_name_char(c)) {
            return Err(Error::malformed_path(
                name,
                format!("invalid file name character {c:?}"),
            ));
        }
        if name == self.current_directory_segment || name == self.parent_directory_segment {
            return Err(Error::malformed_path(name, "name is a relative segment"));
        }
        Ok(())
    }

    /// Checks that the configuration is internally consistent.
    pub fn validate(&self) -> Result<()> {
        for sep in [self.directory_separator, self.alt_directory_separator] {
            if self.is_invalid_path_char(sep) {
                return Err(Error::config(format!(
                    "separator {sep:?} is listed as an invalid path character"
                )));
            }
            if !self.invalid_file_name_chars.contains(&sep) {
                return Err(Error::config(format!(
                    "separator {sep:?} must be an invalid file name character"
                )));
            }
        }
        if self.is_separator(self.extension_separator) {
            return Err(Error::config("extension separator cannot be a directory separator"));
        }
        if let Some(vol) = self.volume_separator {
            if self.is_separator(vol) || self.is_invalid_path_char(vol) {
                return Err(Error::config(format!("volume separator {vol:?} is not usable")));
            }
        }
        for (what, token) in [
            ("current directory segment", &self.current_directory_segment),
            ("parent directory segment", &self.parent_directory_segment),
        ] {
            if token.is_empty() {
                return Err(Error::config(format!("{what} is empty")));
            }
            if token.chars().any(|c| self.is_separator(c) || self.is_invalid_path_char(c)) {
                return Err(Error::config(format!("{what} {token:?} contains a separator")));
            }
        }
        if self.current_directory_segment == self.parent_directory_segment {
            return Err(Error::config("current and parent directory segments are identical"));
        }
        if self.current_directory.chars().any(|c| self.is_invalid_path_char(c)) {
            return Err(Error::config(format!(
                "current directory {:?} contains an invalid character",
                self.current_directory
            )));
        }
        if super::storage_path::root_len(self, &self.current_directory) == 0 {
            return Err(Error::config(format!(
                "current directory {:?} is not absolute",
                self.current_directory
            )));
        }
        Ok(())
    }
}
