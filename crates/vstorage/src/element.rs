// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Path-bound handles on files and folders.
//!
//! A handle is a path plus a reference to the store; it holds no state of
//! its own. Copy, move and rename return a handle on the new location and
//! leave the original handle pointing at the old one.

use std::fmt;

use crate::attributes::FileAttributes;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::metadata::ElementProperties;
use crate::options::{
    CreationCollisionOption, DeletionOption, FileAccessMode, NameCollisionOption, TextEncoding,
};
use crate::path::StoragePath;

/// A file handle: a location in a store that may or may not hold a file.
pub struct StorageFile<'fs, F: FileSystem> {
    fs: &'fs F,
    path: StoragePath,
}

/// A folder handle: a location in a store that may or may not hold a folder.
pub struct StorageFolder<'fs, F: FileSystem> {
    fs: &'fs F,
    path: StoragePath,
}

impl<'fs, F: FileSystem> StorageFile<'fs, F> {
    pub fn new(fs: &'fs F, path: StoragePath) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &StoragePath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.full_path().name()
    }

    /// The folder containing this file, if the path has one.
    pub fn parent(&self) -> Option<StorageFolder<'fs, F>> {
        let parent = self.path.full_path().parent()?;
        Some(StorageFolder::new(self.fs, parent.clone()))
    }

    pub fn exists(&self) -> bool {
        self.fs.file_exists(&self.path)
    }

    pub fn create(&self, recursive: bool, options: CreationCollisionOption) -> Result<()> {
        self.fs.create_file(&self.path, recursive, options)
    }

    pub fn delete(&self, options: DeletionOption) -> Result<()> {
        self.fs.delete_file(&self.path, options)
    }

    pub fn copy(
        &self,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<StorageFile<'fs, F>> {
        self.fs.copy_file(&self.path, destination, options)?;
        Ok(StorageFile::new(self.fs, destination.clone()))
    }

    pub fn move_to(
        &self,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<StorageFile<'fs, F>> {
        self.fs.move_file(&self.path, destination, options)?;
        Ok(StorageFile::new(self.fs, destination.clone()))
    }

    pub fn rename(&self, new_name: &str, options: NameCollisionOption) -> Result<StorageFile<'fs, F>> {
        let path = self.fs.rename_file(&self.path, new_name, options)?;
        Ok(StorageFile::new(self.fs, path))
    }

    pub fn attributes(&self) -> Result<FileAttributes> {
        self.fs.file_attributes(&self.path)
    }

    pub fn set_attributes(&self, attributes: FileAttributes) -> Result<()> {
        self.fs.set_file_attributes(&self.path, attributes)
    }

    pub fn properties(&self) -> Result<ElementProperties> {
        self.fs.file_properties(&self.path)
    }

    pub fn open(&self, mode: FileAccessMode) -> Result<F::Stream> {
        self.fs.open_file(&self.path, mode)
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        self.fs.read_bytes(&self.path)
    }

    pub fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.fs.write_bytes(&self.path, bytes)
    }

    pub fn read_text(&self, encoding: TextEncoding) -> Result<String> {
        self.fs.read_text(&self.path, encoding)
    }

    pub fn write_text(&self, text: &str, encoding: TextEncoding) -> Result<()> {
        self.fs.write_text(&self.path, text, encoding)
    }
}

impl<'fs, F: FileSystem> StorageFolder<'fs, F> {
    pub fn new(fs: &'fs F, path: StoragePath) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &StoragePath {
        &self.path
    }

    /// Empty for a root folder.
    pub fn name(&self) -> &str {
        self.path.full_path().name()
    }

    /// None for a root folder.
    pub fn parent(&self) -> Option<StorageFolder<'fs, F>> {
        let parent = self.path.full_path().parent()?;
        Some(StorageFolder::new(self.fs, parent.clone()))
    }

    pub fn exists(&self) -> bool {
        self.fs.folder_exists(&self.path)
    }

    pub fn create(&self, recursive: bool, options: CreationCollisionOption) -> Result<()> {
        self.fs.create_folder(&self.path, recursive, options)
    }

    pub fn delete(&self, options: DeletionOption) -> Result<()> {
        self.fs.delete_folder(&self.path, options)
    }

    pub fn copy(
        &self,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<StorageFolder<'fs, F>> {
        self.fs.copy_folder(&self.path, destination, options)?;
        Ok(StorageFolder::new(self.fs, destination.clone()))
    }

    pub fn move_to(
        &self,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<StorageFolder<'fs, F>> {
        self.fs.move_folder(&self.path, destination, options)?;
        Ok(StorageFolder::new(self.fs, destination.clone()))
    }

    pub fn rename(
        &self,
        new_name: &str,
        options: NameCollisionOption,
    ) -> Result<StorageFolder<'fs, F>> {
        let path = self.fs.rename_folder(&self.path, new_name, options)?;
        Ok(StorageFolder::new(self.fs, path))
    }

    pub fn attributes(&self) -> Result<FileAttributes> {
        self.fs.folder_attributes(&self.path)
    }

    pub fn set_attributes(&self, attributes: FileAttributes) -> Result<()> {
        self.fs.set_folder_attributes(&self.path, attributes)
    }

    pub fn properties(&self) -> Result<ElementProperties> {
        self.fs.folder_properties(&self.path)
    }

    /// Handle on the file `name` directly inside this folder.
    pub fn file(&self, name: &str) -> Result<StorageFile<'fs, F>> {
        Ok(StorageFile::new(self.fs, self.child_path(name)?))
    }

    /// Handle on the folder `name` directly inside this folder.
    pub fn folder(&self, name: &str) -> Result<StorageFolder<'fs, F>> {
        Ok(StorageFolder::new(self.fs, self.child_path(name)?))
    }

    fn child_path(&self, name: &str) -> Result<StoragePath> {
        self.fs.path_information().validate_name(name)?;
        self.path.full_path().join(name)
    }

    pub fn files(&self) -> Result<Vec<StorageFile<'fs, F>>> {
        Ok(self
            .fs
            .files_in(&self.path)?
            .into_iter()
            .map(|path| StorageFile::new(self.fs, path))
            .collect())
    }

    pub fn folders(&self) -> Result<Vec<StorageFolder<'fs, F>>> {
        Ok(self
            .fs
            .folders_in(&self.path)?
            .into_iter()
            .map(|path| StorageFolder::new(self.fs, path))
            .collect())
    }

    /// Creates the file `name` in this folder, which must exist.
    pub fn create_file(
        &self,
        name: &str,
        options: CreationCollisionOption,
    ) -> Result<StorageFile<'fs, F>> {
        let file = self.file(name)?;
        if !self.exists() {
            return Err(Error::folder_not_found(self.path.full_path()));
        }
        file.create(false, options)?;
        Ok(file)
    }

    /// Creates the folder `name` in this folder, which must exist.
    pub fn create_folder(
        &self,
        name: &str,
        options: CreationCollisionOption,
    ) -> Result<StorageFolder<'fs, F>> {
        let folder = self.folder(name)?;
        if !self.exists() {
            return Err(Error::folder_not_found(self.path.full_path()));
        }
        folder.create(false, options)?;
        Ok(folder)
    }
}

impl<F: FileSystem> Clone for StorageFile<'_, F> {
    fn clone(&self) -> Self {
        Self::new(self.fs, self.path.clone())
    }
}

impl<F: FileSystem> Clone for StorageFolder<'_, F> {
    fn clone(&self) -> Self {
        Self::new(self.fs, self.path.clone())
    }
}

impl<F: FileSystem> PartialEq for StorageFile<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.fs, other.fs) && self.path == other.path
    }
}

impl<F: FileSystem> PartialEq for StorageFolder<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.fs, other.fs) && self.path == other.path
    }
}

impl<F: FileSystem> fmt::Debug for StorageFile<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StorageFile").field(&self.path).finish()
    }
}

impl<F: FileSystem> fmt::Debug for StorageFolder<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StorageFolder").field(&self.path).finish()
    }
}

impl<F: FileSystem> fmt::Display for StorageFile<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl<F: FileSystem> fmt::Display for StorageFolder<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}
