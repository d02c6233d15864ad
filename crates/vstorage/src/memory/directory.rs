// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use diagnostics::debug;

use super::node::{Node, NodeID};
use super::storage::FsDataStorage;
use crate::error::{Error, Result};
use crate::options::CreationCollisionOption;
use crate::path::StoragePath;

impl FsDataStorage {
    /// Creates a folder at `path`; a path without a parent becomes a new root.
    pub fn create_folder_node(
        &mut self,
        path: &StoragePath,
        options: CreationCollisionOption,
    ) -> Result<NodeID> {
        let full = path.full_path();
        let parent = match full.parent() {
            Some(_) => Some(self.resolve_parent(full)?),
            None => None,
        };
        if let Some(existing) = self.try_get_folder(full)? {
            match options {
                CreationCollisionOption::Fail => return Err(Error::already_exists(full)),
                CreationCollisionOption::UseExisting => return Ok(existing),
                CreationCollisionOption::ReplaceExisting => self.delete_node(existing)?,
            }
        }
        let id = self.allocate_id();
        let id = self.add_node(Node::new_folder(id, full.clone(), parent))?;
        let hex = id.to_hex_string();
        debug!("Created folder {path} as node {id}", path: full.as_str(), id: hex.as_str());
        Ok(id)
    }

    /// Creates `path` and any missing ancestors. Nothing is created if an
    /// ancestor turns out to be a file.
    pub fn ensure_folders(&mut self, path: &StoragePath) -> Result<()> {
        let mut missing = Vec::new();
        let mut cursor = Some(path.full_path().clone());
        while let Some(current) = cursor {
            if self.try_get_folder(&current)?.is_some() {
                break;
            }
            cursor = current.parent().cloned();
            missing.push(current);
        }
        for folder in missing.iter().rev() {
            self.create_folder_node(folder, CreationCollisionOption::UseExisting)?;
        }
        Ok(())
    }

    /// Recreates folder `src` at `dst` with the same attributes and
    /// timestamps, then copies its children into it.
    pub(super) fn copy_folder_node(&mut self, src: NodeID, dst: &StoragePath) -> Result<NodeID> {
        let dst = dst.full_path();
        let source = self.get(src)?;
        let (attributes, created_on, modified_on) =
            (source.attributes, source.created_on, source.modified_on);
        // Snapshot before the destination exists
        let children = self.sorted_children(src)?;

        let parent = match dst.parent() {
            Some(_) => Some(self.resolve_parent(dst)?),
            None => None,
        };
        let id = self.allocate_id();
        let mut node = Node::new_folder(id, dst.clone(), parent);
        node.attributes = attributes;
        node.created_on = created_on;
        node.modified_on = modified_on;
        let id = self.add_node(node)?;

        for child in children {
            let name = self.get(child)?.path.name().to_string();
            self.copy_tree(child, &dst.join(&name)?)?;
        }
        Ok(id)
    }
}
