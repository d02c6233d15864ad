// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory backend.
//!
//! The whole tree lives in one [`FsDataStorage`] behind a `RefCell`, so the
//! store itself is single-threaded. Streams it hands out only share the
//! content of one file and may be closed from any thread.

mod content;
mod directory;
mod file;
mod lifecycle;
mod node;
mod storage;

use std::cell::RefCell;
use std::sync::Arc;

use diagnostics::{debug, info};

use crate::attributes::FileAttributes;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::metadata::ElementProperties;
use crate::options::{CreationCollisionOption, DeletionOption, FileAccessMode, NameCollisionOption};
use crate::path::{PathInformation, StoragePath};

pub use content::{ContentLocked, FileContentStream, ReadWriteTracker};

use node::NodeID;
use storage::FsDataStorage;

/// A virtual filesystem held entirely in memory.
#[derive(Debug)]
pub struct InMemoryFileSystem {
    info: Arc<PathInformation>,
    storage: RefCell<FsDataStorage>,
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFileSystem {
    /// An empty Unix-like store containing only `/`.
    pub fn new() -> Self {
        Self::from_information(Arc::new(PathInformation::default()))
    }

    /// An empty store using `info`, containing only the root of its current
    /// directory.
    pub fn with_path_information(info: PathInformation) -> Result<Self> {
        info.validate()?;
        Ok(Self::from_information(Arc::new(info)))
    }

    fn from_information(info: Arc<PathInformation>) -> Self {
        let root = StoragePath::current_root(info.clone());
        info!("Created in-memory filesystem with root {root}", root: root.as_str());
        Self {
            info,
            storage: RefCell::new(FsDataStorage::with_root(root)),
        }
    }

    /// Number of files and folders, roots included.
    pub fn len(&self) -> usize {
        self.storage.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root folders in creation order. The first is the root of the
    /// current directory; others appear as folders on new volumes are made.
    pub fn roots(&self) -> Result<Vec<StoragePath>> {
        self.read(|s| {
            s.roots()
                .iter()
                .map(|&id| s.get(id).map(|node| node.path.clone()))
                .collect()
        })
    }

    fn read<R>(&self, f: impl FnOnce(&FsDataStorage) -> Result<R>) -> Result<R> {
        let storage = self
            .storage
            .try_borrow()
            .map_err(|e| Error::invalid_operation("<storage>", e.to_string()))?;
        f(&storage)
    }

    fn write<R>(&self, f: impl FnOnce(&mut FsDataStorage) -> Result<R>) -> Result<R> {
        let mut storage = self
            .storage
            .try_borrow_mut()
            .map_err(|e| Error::invalid_operation("<storage>", e.to_string()))?;
        f(&mut storage)
    }

    fn rename(
        &self,
        path: &StoragePath,
        new_name: &str,
        options: NameCollisionOption,
        require: fn(&FsDataStorage, &StoragePath) -> Result<NodeID>,
    ) -> Result<StoragePath> {
        self.info.validate_name(new_name)?;
        let full = path.full_path();
        let parent = full.parent().ok_or_else(|| Error::cannot_move_root(full))?;
        let destination = parent.join(new_name)?;
        self.write(|s| {
            let id = require(s, full)?;
            s.move_node(id, &destination, options.replace_existing())
        })?;
        Ok(destination)
    }

    fn children(&self, folder: &StoragePath, want_folders: bool) -> Result<Vec<StoragePath>> {
        self.read(|s| {
            let id = s.require_folder(folder)?;
            let mut paths = Vec::new();
            for child in s.sorted_children(id)? {
                let node = s.get(child)?;
                if node.is_folder() == want_folders {
                    paths.push(node.path.clone());
                }
            }
            Ok(paths)
        })
    }

    /// Verifies the internal invariants of the node registry.
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) -> std::result::Result<(), String> {
        self.storage.borrow().check_consistency()
    }
}

impl FileSystem for InMemoryFileSystem {
    type Stream = FileContentStream;

    fn path_information(&self) -> &PathInformation {
        &self.info
    }

    fn path(&self, path: &str) -> Result<StoragePath> {
        StoragePath::new(self.info.clone(), path)
    }

    fn file_exists(&self, path: &StoragePath) -> bool {
        self.read(|s| s.try_get_file(path))
            .is_ok_and(|found| found.is_some())
    }

    fn folder_exists(&self, path: &StoragePath) -> bool {
        self.read(|s| s.try_get_folder(path))
            .is_ok_and(|found| found.is_some())
    }

    fn create_file(
        &self,
        path: &StoragePath,
        recursive: bool,
        options: CreationCollisionOption,
    ) -> Result<()> {
        let full = path.full_path();
        self.write(|s| {
            if recursive {
                if let Some(parent) = full.parent() {
                    s.ensure_folders(parent)?;
                }
            }
            match options {
                CreationCollisionOption::Fail => s.create_file_node(full, false)?,
                CreationCollisionOption::UseExisting => s.create_file_node(full, true)?,
                CreationCollisionOption::ReplaceExisting => {
                    s.resolve_parent(full)?;
                    if let Some(existing) = s.try_get_file(full)? {
                        s.delete_node(existing)?;
                    }
                    s.create_file_node(full, false)?
                }
            };
            Ok(())
        })
    }

    fn create_folder(
        &self,
        path: &StoragePath,
        recursive: bool,
        options: CreationCollisionOption,
    ) -> Result<()> {
        let full = path.full_path();
        self.write(|s| {
            if recursive {
                if let Some(parent) = full.parent() {
                    s.ensure_folders(parent)?;
                }
            }
            s.create_folder_node(full, options)?;
            Ok(())
        })
    }

    fn delete_file(&self, path: &StoragePath, options: DeletionOption) -> Result<()> {
        self.write(|s| match s.try_get_file(path)? {
            Some(id) => s.delete_node(id),
            None if options == DeletionOption::IgnoreMissing => Ok(()),
            None => s.require_file(path).map(|_| ()),
        })
    }

    fn delete_folder(&self, path: &StoragePath, options: DeletionOption) -> Result<()> {
        self.write(|s| match s.try_get_folder(path)? {
            Some(id) if s.get(id)?.parent.is_none() => {
                Err(Error::invalid_operation(path.full_path(), "cannot delete a root folder"))
            }
            Some(id) => s.delete_node(id),
            None if options == DeletionOption::IgnoreMissing => Ok(()),
            None => s.require_folder(path).map(|_| ()),
        })
    }

    fn copy_file(
        &self,
        path: &StoragePath,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<()> {
        self.write(|s| {
            let id = s.require_file(path)?;
            s.copy_node(id, destination, options.replace_existing())?;
            Ok(())
        })
    }

    fn copy_folder(
        &self,
        path: &StoragePath,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<()> {
        self.write(|s| {
            let id = s.require_folder(path)?;
            s.copy_node(id, destination, options.replace_existing())?;
            Ok(())
        })
    }

    fn move_file(
        &self,
        path: &StoragePath,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<()> {
        self.write(|s| {
            let id = s.require_file(path)?;
            s.move_node(id, destination, options.replace_existing())?;
            Ok(())
        })
    }

    fn move_folder(
        &self,
        path: &StoragePath,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<()> {
        self.write(|s| {
            let id = s.require_folder(path)?;
            s.move_node(id, destination, options.replace_existing())?;
            Ok(())
        })
    }

    fn rename_file(
        &self,
        path: &StoragePath,
        new_name: &str,
        options: NameCollisionOption,
    ) -> Result<StoragePath> {
        self.rename(path, new_name, options, FsDataStorage::require_file)
    }

    fn rename_folder(
        &self,
        path: &StoragePath,
        new_name: &str,
        options: NameCollisionOption,
    ) -> Result<StoragePath> {
        self.rename(path, new_name, options, FsDataStorage::require_folder)
    }

    fn file_attributes(&self, path: &StoragePath) -> Result<FileAttributes> {
        self.read(|s| Ok(s.get(s.require_file(path)?)?.attributes))
    }

    fn set_file_attributes(&self, path: &StoragePath, attributes: FileAttributes) -> Result<()> {
        self.write(|s| {
            let id = s.require_file(path)?;
            s.get_mut(id)?.attributes = attributes.for_file();
            Ok(())
        })
    }

    fn folder_attributes(&self, path: &StoragePath) -> Result<FileAttributes> {
        self.read(|s| Ok(s.get(s.require_folder(path)?)?.attributes))
    }

    fn set_folder_attributes(
        &self,
        path: &StoragePath,
        attributes: FileAttributes,
    ) -> Result<()> {
        self.write(|s| {
            let id = s.require_folder(path)?;
            s.get_mut(id)?.attributes = attributes.for_folder();
            Ok(())
        })
    }

    fn file_properties(&self, path: &StoragePath) -> Result<ElementProperties> {
        self.read(|s| Ok(s.get(s.require_file(path)?)?.properties()))
    }

    fn folder_properties(&self, path: &StoragePath) -> Result<ElementProperties> {
        self.read(|s| Ok(s.get(s.require_folder(path)?)?.properties()))
    }

    fn open_file(&self, path: &StoragePath, mode: FileAccessMode) -> Result<FileContentStream> {
        self.open(path, mode, false)
    }

    fn read_bytes(&self, path: &StoragePath) -> Result<Vec<u8>> {
        let mut stream = self.open(path, FileAccessMode::Read, false)?;
        let bytes = stream.read_remaining()?;
        stream.close();
        Ok(bytes)
    }

    fn write_bytes(&self, path: &StoragePath, bytes: &[u8]) -> Result<()> {
        let mut stream = self.open(path, FileAccessMode::Write, true)?;
        stream.write_chunk(bytes)?;
        stream.close();
        debug!("Wrote {count} bytes to {path}", count: bytes.len() as u64, path: path.as_str());
        Ok(())
    }

    fn files_in(&self, folder: &StoragePath) -> Result<Vec<StoragePath>> {
        self.children(folder, false)
    }

    fn folders_in(&self, folder: &StoragePath) -> Result<Vec<StoragePath>> {
        self.children(folder, true)
    }
}

impl InMemoryFileSystem {
    /// Opens a stream on the file at `path`. Truncation needs write access.
    pub fn open(
        &self,
        path: &StoragePath,
        mode: FileAccessMode,
        truncate: bool,
    ) -> Result<FileContentStream> {
        if truncate && !mode.can_write() {
            return Err(Error::not_supported(format!(
                "truncating {path} opened for {mode:?}"
            )));
        }
        self.read(|s| {
            let node = s.get(s.require_file(path)?)?;
            let content = node
                .content()
                .ok_or_else(|| Error::file_not_found(&node.path))?;
            content
                .open(&node.path, mode, truncate)
                .map_err(|_| Error::locked(&node.path))
        })
    }
}
