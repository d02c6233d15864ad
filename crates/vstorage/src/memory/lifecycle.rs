// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Copy, move and delete of whole subtrees.
//!
//! Each operation checks every precondition before the first mutation, so a
//! failed call leaves the store exactly as it was.

use diagnostics::debug;

use super::content::ReadWriteTracker;
use super::node::NodeID;
use super::storage::FsDataStorage;
use crate::error::{Error, ErrorKind, Result};
use crate::path::StoragePath;
use crate::EntryType;

impl FsDataStorage {
    /// Copies `src` and, for a folder, everything below it to `dst`.
    pub fn copy_node(&mut self, src: NodeID, dst: &StoragePath, replace_existing: bool) -> Result<NodeID> {
        let dst = dst.full_path();
        let (src_path, entry_type) = {
            let node = self.get(src)?;
            (node.path.clone(), node.entry_type())
        };
        if src_path == *dst {
            return Err(Error::invalid_operation(
                dst,
                "source and destination are the same location",
            ));
        }
        self.ensure_subtree(src, ReadWriteTracker::ensure_readable)?;

        let dst_parent = self.resolve_parent(dst)?;
        if entry_type == EntryType::Folder && (dst_parent == src || self.is_ancestor(src, dst_parent)) {
            return Err(Error::invalid_operation(
                dst,
                format!("cannot copy {src_path} into itself"),
            ));
        }
        if let Some(existing) = self.replaceable_destination(src, dst, entry_type, replace_existing)? {
            self.delete_node(existing)?;
        }

        let id = self.copy_tree(src, dst)?;
        debug!("Copied {from} to {to}", from: src_path.as_str(), to: dst.as_str());
        Ok(id)
    }

    pub(super) fn copy_tree(&mut self, src: NodeID, dst: &StoragePath) -> Result<NodeID> {
        match self.get(src)?.entry_type() {
            EntryType::File => self.copy_file_node(src, dst),
            EntryType::Folder => self.copy_folder_node(src, dst),
        }
    }

    /// Moves `id` with its subtree to `dst`. The node keeps its identity and
    /// every descendant is re-indexed under the new location.
    pub fn move_node(&mut self, id: NodeID, dst: &StoragePath, replace_existing: bool) -> Result<NodeID> {
        let dst = dst.full_path();
        let (src_path, entry_type, parent) = {
            let node = self.get(id)?;
            (node.path.clone(), node.entry_type(), node.parent)
        };

        self.ensure_subtree(id, ReadWriteTracker::ensure_writable)?;
        if src_path == *dst {
            return Err(Error::invalid_operation(
                dst,
                "source and destination are the same location",
            ));
        }
        if parent.is_none() {
            return Err(Error::cannot_move_root(&src_path));
        }
        let new_parent = match self.resolve_parent(dst) {
            Ok(new_parent) => new_parent,
            Err(e) if e.kind() == ErrorKind::ParentNotFound => {
                return Err(Error::destination_parent_not_found(dst));
            }
            Err(e) => return Err(e),
        };
        if new_parent == id || self.is_ancestor(id, new_parent) {
            return Err(Error::cannot_move_into_descendant(&src_path, dst));
        }
        if let Some(existing) = self.replaceable_destination(id, dst, entry_type, replace_existing)? {
            self.delete_node(existing)?;
        }

        self.relocate_tree(id, dst.clone(), new_parent)?;
        self.get_mut(id)?.touch();
        debug!("Moved {from} to {to}", from: src_path.as_str(), to: dst.as_str());
        Ok(id)
    }

    // Parent first, so every child is re-keyed under its parent's new path.
    fn relocate_tree(&mut self, id: NodeID, new_path: StoragePath, new_parent: NodeID) -> Result<()> {
        self.relocate(id, new_path.clone(), new_parent)?;
        for child in self.sorted_children(id)? {
            let name = self.get(child)?.path.name().to_string();
            self.relocate_tree(child, new_path.join(&name)?, id)?;
        }
        Ok(())
    }

    /// Checks an occupied destination for copy and move. Returns the node
    /// that has to be deleted first, if any.
    fn replaceable_destination(
        &self,
        src: NodeID,
        dst: &StoragePath,
        entry_type: EntryType,
        replace_existing: bool,
    ) -> Result<Option<NodeID>> {
        let Some(existing) = self.lookup(dst) else {
            return Ok(None);
        };
        let found = self.get(existing)?.entry_type();
        if found != entry_type {
            return Err(Error::conflicting_element(dst, found));
        }
        if !replace_existing {
            return Err(Error::already_exists(dst));
        }
        if self.is_ancestor(existing, src) {
            return Err(Error::invalid_operation(
                dst,
                "replacing the destination would delete the source",
            ));
        }
        self.ensure_subtree(existing, ReadWriteTracker::ensure_writable)?;
        Ok(Some(existing))
    }

    /// Deletes `id` and everything below it, children before their folder.
    pub fn delete_node(&mut self, id: NodeID) -> Result<()> {
        self.ensure_subtree(id, ReadWriteTracker::ensure_writable)?;
        let order = self.subtree(id);
        let path = self.get(id)?.path.clone();
        for node in order.iter().rev() {
            self.remove_node(*node);
        }
        debug!("Deleted {path} ({count} nodes)", path: path.as_str(), count: order.len() as u64);
        Ok(())
    }
}
