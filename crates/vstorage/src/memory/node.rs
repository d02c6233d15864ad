// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};

use super::content::FileContent;
use crate::attributes::FileAttributes;
use crate::metadata::ElementProperties;
use crate::path::StoragePath;
use crate::EntryType;

/// Identity of a node within one in-memory store.
///
/// Ids are never reused, so a stale id can only fail to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeID(u64);

impl NodeID {
    pub(crate) fn new(n: u64) -> Self {
        Self(n)
    }

    /// Formats as at least 4 hex digits.
    pub fn to_hex_string(self) -> String {
        format!("{:04X}", self.0)
    }
}

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

#[derive(Debug)]
pub(crate) enum NodeType {
    File(FileContent),
    Folder(BTreeSet<NodeID>),
}

/// One element of the in-memory tree.
///
/// `path` is always a full path. `parent` is None only for roots, which are
/// always folders.
#[derive(Debug)]
pub(crate) struct Node {
    pub id: NodeID,
    pub path: StoragePath,
    pub parent: Option<NodeID>,
    pub attributes: FileAttributes,
    pub created_on: DateTime<Utc>,
    pub modified_on: Option<DateTime<Utc>>,
    pub node_type: NodeType,
}

impl Node {
    pub fn new_file(id: NodeID, path: StoragePath, parent: NodeID, content: FileContent) -> Self {
        Self {
            id,
            path,
            parent: Some(parent),
            attributes: FileAttributes::empty(),
            created_on: Utc::now(),
            modified_on: None,
            node_type: NodeType::File(content),
        }
    }

    pub fn new_folder(id: NodeID, path: StoragePath, parent: Option<NodeID>) -> Self {
        Self {
            id,
            path,
            parent,
            attributes: FileAttributes::DIRECTORY,
            created_on: Utc::now(),
            modified_on: None,
            node_type: NodeType::Folder(BTreeSet::new()),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self.node_type {
            NodeType::File(_) => EntryType::File,
            NodeType::Folder(_) => EntryType::Folder,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.node_type, NodeType::Folder(_))
    }

    pub fn content(&self) -> Option<&FileContent> {
        match &self.node_type {
            NodeType::File(content) => Some(content),
            NodeType::Folder(_) => None,
        }
    }

    pub fn children(&self) -> Option<&BTreeSet<NodeID>> {
        match &self.node_type {
            NodeType::Folder(children) => Some(children),
            NodeType::File(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut BTreeSet<NodeID>> {
        match &mut self.node_type {
            NodeType::Folder(children) => Some(children),
            NodeType::File(_) => None,
        }
    }

    /// Latest of the last structural change and the last content write.
    pub fn modified_on(&self) -> Option<DateTime<Utc>> {
        let written = self.content().and_then(FileContent::written_on);
        match (self.modified_on, written) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn touch(&mut self) {
        self.modified_on = Some(Utc::now());
    }

    pub fn properties(&self) -> ElementProperties {
        ElementProperties {
            entry_type: self.entry_type(),
            name: self.path.name().to_string(),
            name_without_extension: self.path.name_without_extension().to_string(),
            extension: self.path.extension().map(str::to_string),
            size: self.content().map(FileContent::len),
            created_on: self.created_on,
            modified_on: self.modified_on(),
        }
    }
}
