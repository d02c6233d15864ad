// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Node registry of the in-memory store.
//!
//! Every node lives in `nodes` and is indexed by the comparison key of its
//! full path. Folders own the set of their children's ids; children point
//! back at their parent. The structural operations built on top of these
//! primitives are in `file.rs`, `directory.rs` and `lifecycle.rs`.

use std::collections::HashMap;

use super::content::{ContentLocked, ReadWriteTracker};
use super::node::{Node, NodeID};
use crate::error::{Error, Result};
use crate::path::StoragePath;
use crate::EntryType;

/// Checks applied to every file of a subtree before a structural change.
pub(crate) type ContentCheck = fn(&ReadWriteTracker) -> std::result::Result<(), ContentLocked>;

#[derive(Debug)]
pub(crate) struct FsDataStorage {
    nodes: HashMap<NodeID, Node>,
    index: HashMap<String, NodeID>,
    roots: Vec<NodeID>,
    next_id: u64,
}

impl FsDataStorage {
    /// A store holding only the folder `root`.
    pub fn with_root(root: StoragePath) -> Self {
        let mut storage = Self {
            nodes: HashMap::new(),
            index: HashMap::new(),
            roots: Vec::new(),
            next_id: 0,
        };
        let id = storage.allocate_id();
        storage
            .index
            .insert(root.comparison_key().to_string(), id);
        storage.nodes.insert(id, Node::new_folder(id, root, None));
        storage.roots.push(id);
        storage
    }

    pub fn allocate_id(&mut self) -> NodeID {
        let id = NodeID::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> &[NodeID] {
        &self.roots
    }

    pub fn get(&self, id: NodeID) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| Error::invalid_operation(id.to_hex_string(), "stale node reference"))
    }

    pub fn get_mut(&mut self, id: NodeID) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| Error::invalid_operation(id.to_hex_string(), "stale node reference"))
    }

    /// Indexes `node` under its path. Fails if the path is taken.
    pub fn register(&mut self, node: Node) -> Result<NodeID> {
        let key = node.path.comparison_key().to_string();
        if self.index.contains_key(&key) {
            return Err(Error::already_exists(&node.path));
        }
        let id = node.id;
        if node.parent.is_none() {
            self.roots.push(id);
        }
        self.index.insert(key, id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Removes `id` from the index and the node table. Does not touch the
    /// parent's child set.
    pub fn unregister(&mut self, id: NodeID) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.index.remove(node.path.comparison_key());
        self.roots.retain(|&root| root != id);
        Some(node)
    }

    /// Registers `node` and links it into its parent's child set.
    pub fn add_node(&mut self, node: Node) -> Result<NodeID> {
        let parent = node.parent;
        let id = self.register(node)?;
        if let Some(parent) = parent {
            self.attach(parent, id);
        }
        Ok(id)
    }

    /// Unregisters `id` and unlinks it from its parent.
    pub fn remove_node(&mut self, id: NodeID) {
        if let Some(node) = self.unregister(id) {
            if let Some(parent) = node.parent {
                self.detach(parent, id);
            }
        }
    }

    pub fn attach(&mut self, parent: NodeID, child: NodeID) {
        if let Some(children) = self.nodes.get_mut(&parent).and_then(Node::children_mut) {
            children.insert(child);
        }
    }

    pub fn detach(&mut self, parent: NodeID, child: NodeID) {
        if let Some(children) = self.nodes.get_mut(&parent).and_then(Node::children_mut) {
            children.remove(&child);
        }
    }

    pub fn lookup(&self, path: &StoragePath) -> Option<NodeID> {
        self.index.get(path.comparison_key()).copied()
    }

    fn try_get_typed(&self, path: &StoragePath, wanted: EntryType) -> Result<Option<NodeID>> {
        let Some(id) = self.lookup(path) else {
            return Ok(None);
        };
        let found = self.get(id)?.entry_type();
        if found != wanted {
            return Err(Error::conflicting_element(path.full_path(), found));
        }
        Ok(Some(id))
    }

    /// The file at `path`, None if nothing is there, an error if a folder is.
    pub fn try_get_file(&self, path: &StoragePath) -> Result<Option<NodeID>> {
        self.try_get_typed(path, EntryType::File)
    }

    /// The folder at `path`, None if nothing is there, an error if a file is.
    pub fn try_get_folder(&self, path: &StoragePath) -> Result<Option<NodeID>> {
        self.try_get_typed(path, EntryType::Folder)
    }

    /// The folder that would contain an element at `path`.
    pub fn resolve_parent(&self, path: &StoragePath) -> Result<NodeID> {
        let full = path.full_path();
        let parent = full.parent().ok_or_else(|| Error::no_parent(full))?;
        self.try_get_folder(parent)?
            .ok_or_else(|| Error::parent_not_found(parent))
    }

    /// Not-found error for `path`, naming the missing parent when that is
    /// what is actually missing.
    fn missing(&self, path: &StoragePath, entry_type: EntryType) -> Error {
        let full = path.full_path();
        if let Some(parent) = full.parent() {
            if !matches!(self.try_get_folder(parent), Ok(Some(_))) {
                return Error::parent_not_found(parent);
            }
        }
        match entry_type {
            EntryType::File => Error::file_not_found(full),
            EntryType::Folder => Error::folder_not_found(full),
        }
    }

    pub fn require_file(&self, path: &StoragePath) -> Result<NodeID> {
        self.try_get_file(path)?
            .ok_or_else(|| self.missing(path, EntryType::File))
    }

    pub fn require_folder(&self, path: &StoragePath) -> Result<NodeID> {
        self.try_get_folder(path)?
            .ok_or_else(|| self.missing(path, EntryType::Folder))
    }

    /// True if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeID, node: NodeID) -> bool {
        let mut cursor = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// `id` and all its descendants, each folder before its children.
    pub fn subtree(&self, id: NodeID) -> Vec<NodeID> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            if let Some(children) = self.nodes.get(&next).and_then(Node::children) {
                stack.extend(children.iter().rev().copied());
            }
        }
        order
    }

    /// Runs `check` on the tracker of every file in the subtree of `id`.
    pub fn ensure_subtree(&self, id: NodeID, check: ContentCheck) -> Result<()> {
        for node_id in self.subtree(id) {
            let node = self.get(node_id)?;
            if let Some(content) = node.content() {
                check(content.tracker()).map_err(|_| Error::locked(&node.path))?;
            }
        }
        Ok(())
    }

    /// Child ids of the folder `id`, ordered by path.
    pub fn sorted_children(&self, id: NodeID) -> Result<Vec<NodeID>> {
        let folder = self.get(id)?;
        let mut children: Vec<&Node> = folder
            .children()
            .into_iter()
            .flatten()
            .filter_map(|child| self.nodes.get(child))
            .collect();
        children.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(children.into_iter().map(|n| n.id).collect())
    }

    /// Re-indexes `id` under `new_path` and re-links it under `new_parent`.
    /// Leaves the store untouched if `new_path` is taken by another node.
    pub fn relocate(&mut self, id: NodeID, new_path: StoragePath, new_parent: NodeID) -> Result<()> {
        let new_key = new_path.comparison_key().to_string();
        if self.index.get(&new_key).is_some_and(|&occupant| occupant != id) {
            return Err(Error::already_exists(&new_path));
        }
        let node = self.get_mut(id)?;
        let old_key = node.path.comparison_key().to_string();
        let old_parent = node.parent;
        node.path = new_path;
        node.parent = Some(new_parent);

        self.index.remove(&old_key);
        self.index.insert(new_key, id);
        if let Some(old_parent) = old_parent {
            self.detach(old_parent, id);
        } else {
            self.roots.retain(|&root| root != id);
        }
        self.attach(new_parent, id);
        Ok(())
    }

    /// Verifies that the index, the child sets and the parent links agree.
    #[cfg(test)]
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        if self.index.len() != self.nodes.len() {
            return Err(format!(
                "{} index entries for {} nodes",
                self.index.len(),
                self.nodes.len()
            ));
        }
        for (key, id) in &self.index {
            let node = self.nodes.get(id).ok_or_else(|| format!("index {key} -> missing {id}"))?;
            if node.path.comparison_key() != key {
                return Err(format!("node {id} at {} indexed as {key}", node.path));
            }
            if node.path.full_path().as_str() != node.path.as_str() {
                return Err(format!("node {id} path {} is not a full path", node.path));
            }
        }
        for (id, node) in &self.nodes {
            match node.parent {
                None => {
                    if !node.is_folder() || !self.roots.contains(id) {
                        return Err(format!("parentless node {} is not a root folder", node.path));
                    }
                }
                Some(parent) => {
                    let p = self.nodes.get(&parent).ok_or_else(|| format!("{} has no parent node", node.path))?;
                    if !p.children().is_some_and(|c| c.contains(id)) {
                        return Err(format!("{} missing from child set of {}", node.path, p.path));
                    }
                    let expected = p.path.join(node.path.name()).map_err(|e| e.to_string())?;
                    if expected != node.path {
                        return Err(format!("{} is not under {}", node.path, p.path));
                    }
                }
            }
            for child in node.children().into_iter().flatten() {
                let c = self.nodes.get(child).ok_or_else(|| format!("{} lists missing child {child}", node.path))?;
                if c.parent != Some(*id) {
                    return Err(format!("{} does not point back at {}", c.path, node.path));
                }
            }
        }
        let reachable: usize = self.roots.iter().map(|&root| self.subtree(root).len()).sum();
        if reachable != self.nodes.len() {
            return Err(format!("{reachable} reachable of {} nodes", self.nodes.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::memory::content::FileContent;
    use crate::path::PathInformation;
    use std::sync::Arc;

    fn path(s: &str) -> StoragePath {
        StoragePath::new(Arc::new(PathInformation::default()), s).unwrap()
    }

    fn store() -> FsDataStorage {
        FsDataStorage::with_root(path("/"))
    }

    fn add_folder(storage: &mut FsDataStorage, p: &str) -> NodeID {
        let parent = storage.resolve_parent(&path(p)).unwrap();
        let id = storage.allocate_id();
        storage
            .add_node(Node::new_folder(id, path(p), Some(parent)))
            .unwrap()
    }

    fn add_file(storage: &mut FsDataStorage, p: &str) -> NodeID {
        let parent = storage.resolve_parent(&path(p)).unwrap();
        let id = storage.allocate_id();
        storage
            .add_node(Node::new_file(id, path(p), parent, FileContent::new()))
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut storage = store();
        let docs = add_folder(&mut storage, "/docs");
        let file = add_file(&mut storage, "/docs/a.txt");

        assert_eq!(storage.lookup(&path("/docs/./a.txt")), Some(file));
        assert_eq!(storage.try_get_folder(&path("/docs")).unwrap(), Some(docs));
        assert_eq!(storage.try_get_file(&path("/docs/b.txt")).unwrap(), None);
        let err = storage.try_get_folder(&path("/docs/a.txt")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictingElementType);
        storage.check_consistency().unwrap();
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut storage = store();
        add_folder(&mut storage, "/docs");
        let id = storage.allocate_id();
        let err = storage
            .register(Node::new_folder(id, path("/docs"), None))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ElementAlreadyExists);
        assert_eq!(storage.len(), 2);
        storage.check_consistency().unwrap();
    }

    #[test]
    fn test_resolve_parent_errors() {
        let mut storage = store();
        add_file(&mut storage, "/file");
        assert_eq!(
            storage.resolve_parent(&path("/")).unwrap_err().kind(),
            ErrorKind::ParentNotFound
        );
        assert_eq!(
            storage.resolve_parent(&path("/missing/x")).unwrap_err(),
            Error::parent_not_found("/missing")
        );
        assert_eq!(
            storage.resolve_parent(&path("/file/x")).unwrap_err().kind(),
            ErrorKind::ConflictingElementType
        );
    }

    #[test]
    fn test_require_names_missing_parent() {
        let mut storage = store();
        add_folder(&mut storage, "/docs");
        assert_eq!(
            storage.require_file(&path("/docs/a")).unwrap_err(),
            Error::file_not_found("/docs/a")
        );
        assert_eq!(
            storage.require_folder(&path("/nope/a")).unwrap_err(),
            Error::parent_not_found("/nope")
        );
    }

    #[test]
    fn test_ancestry_and_subtree() {
        let mut storage = store();
        let a = add_folder(&mut storage, "/a");
        let b = add_folder(&mut storage, "/a/b");
        let f = add_file(&mut storage, "/a/b/f");
        let g = add_file(&mut storage, "/a/g");

        assert!(storage.is_ancestor(a, f));
        assert!(!storage.is_ancestor(f, a));
        assert!(!storage.is_ancestor(a, a));
        assert_eq!(storage.subtree(a), vec![a, b, f, g]);
        assert_eq!(storage.sorted_children(a).unwrap(), vec![b, g]);
    }

    #[test]
    fn test_relocate_checks_before_mutating() {
        let mut storage = store();
        let a = add_folder(&mut storage, "/a");
        let b = add_folder(&mut storage, "/b");
        let root = storage.roots()[0];

        let err = storage.relocate(a, path("/b"), root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ElementAlreadyExists);
        assert_eq!(storage.lookup(&path("/a")), Some(a));

        storage.relocate(a, path("/b/a"), b).unwrap();
        assert_eq!(storage.lookup(&path("/b/a")), Some(a));
        assert_eq!(storage.lookup(&path("/a")), None);
        storage.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_node_unlinks() {
        let mut storage = store();
        let a = add_folder(&mut storage, "/a");
        storage.remove_node(a);
        assert_eq!(storage.lookup(&path("/a")), None);
        assert!(storage.get(a).is_err());
        storage.check_consistency().unwrap();
    }

    #[test]
    fn test_ensure_subtree_reports_locked_file() {
        let mut storage = store();
        let a = add_folder(&mut storage, "/a");
        let f = add_file(&mut storage, "/a/f");
        let node = storage.get(f).unwrap();
        let stream = node
            .content()
            .unwrap()
            .open(&node.path, crate::FileAccessMode::Read, false)
            .unwrap();

        assert_eq!(
            storage
                .ensure_subtree(a, ReadWriteTracker::ensure_writable)
                .unwrap_err(),
            Error::locked("/a/f")
        );
        stream.close();
        storage
            .ensure_subtree(a, ReadWriteTracker::ensure_writable)
            .unwrap();
    }
}
