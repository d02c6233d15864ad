// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Caller-selected policies for operations whose target may already be
//! occupied (or may be missing), plus stream access modes and text encodings.

use serde::{Deserialize, Serialize};

/// What `create` does when an element of the same kind already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationCollisionOption {
    #[default]
    Fail,
    ReplaceExisting,
    UseExisting,
}

/// What copy, move and rename do when the destination is occupied by an
/// element of the same kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCollisionOption {
    #[default]
    Fail,
    ReplaceExisting,
}

impl NameCollisionOption {
    pub fn replace_existing(self) -> bool {
        self == NameCollisionOption::ReplaceExisting
    }
}

/// What `delete` does when there is nothing to delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionOption {
    #[default]
    FailOnMissing,
    IgnoreMissing,
}

/// Declared intent of a content stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAccessMode {
    Read,
    Write,
    ReadWrite,
}

impl FileAccessMode {
    pub fn can_read(self) -> bool {
        matches!(self, FileAccessMode::Read | FileAccessMode::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        matches!(self, FileAccessMode::Write | FileAccessMode::ReadWrite)
    }
}

/// Encodings understood by `read_text` / `write_text`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    fn byte_order_mark(self) -> &'static [u8] {
        match self {
            TextEncoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            TextEncoding::Utf16Le => &[0xFF, 0xFE],
            TextEncoding::Utf16Be => &[0xFE, 0xFF],
        }
    }

    /// Encodes `text` without a byte-order mark.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            TextEncoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }

    /// Decodes `bytes`, skipping a leading byte-order mark of this encoding.
    /// The error string describes why the bytes are not valid text.
    pub fn decode(self, bytes: &[u8]) -> std::result::Result<String, String> {
        let bytes = bytes
            .strip_prefix(self.byte_order_mark())
            .unwrap_or(bytes);
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string()),
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(format!("odd number of bytes ({}) for UTF-16", bytes.len()));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| {
                        let pair = [pair[0], pair[1]];
                        if self == TextEncoding::Utf16Le {
                            u16::from_le_bytes(pair)
                        } else {
                            u16::from_be_bytes(pair)
                        }
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| e.to_string())
            }
        }
    }
}
