// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};

use crate::EntryType;

/// Snapshot of an element's descriptive properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementProperties {
    /// File or folder
    pub entry_type: EntryType,

    /// Final path segment
    pub name: String,

    /// Final path segment without its extension
    pub name_without_extension: String,

    /// Extension without the separator, if there is one
    pub extension: Option<String>,

    /// Content length in bytes (None for folders)
    pub size: Option<u64>,

    pub created_on: DateTime<Utc>,

    /// Last structural change or content write, if any happened after creation
    pub modified_on: Option<DateTime<Utc>>,
}
