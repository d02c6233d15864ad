// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use diagnostics::debug;

use super::content::FileContent;
use super::node::{Node, NodeID};
use super::storage::FsDataStorage;
use crate::error::{Error, Result};
use crate::path::StoragePath;

impl FsDataStorage {
    /// Creates an empty file at `path`. With `open_existing`, an existing
    /// file is returned instead of failing.
    pub fn create_file_node(&mut self, path: &StoragePath, open_existing: bool) -> Result<NodeID> {
        let full = path.full_path();
        let parent = self.resolve_parent(full)?;
        if let Some(existing) = self.try_get_file(full)? {
            if open_existing {
                return Ok(existing);
            }
            return Err(Error::already_exists(full));
        }
        let id = self.allocate_id();
        let id = self.add_node(Node::new_file(id, full.clone(), parent, FileContent::new()))?;
        let hex = id.to_hex_string();
        debug!("Created file {path} as node {id}", path: full.as_str(), id: hex.as_str());
        Ok(id)
    }

    /// Places an independent copy of file `src` at `dst`, keeping its
    /// attributes and timestamps.
    pub(super) fn copy_file_node(&mut self, src: NodeID, dst: &StoragePath) -> Result<NodeID> {
        let source = self.get(src)?;
        let content = source
            .content()
            .ok_or_else(|| Error::file_not_found(&source.path))?
            .duplicate()
            .map_err(|_| Error::locked(&source.path))?;
        let (attributes, created_on, modified_on) =
            (source.attributes, source.created_on, source.modified_on);

        let parent = self.resolve_parent(dst)?;
        let id = self.allocate_id();
        let mut node = Node::new_file(id, dst.full_path().clone(), parent, content);
        node.attributes = attributes;
        node.created_on = created_on;
        node.modified_on = modified_on;
        self.add_node(node)
    }
}
