// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The contract every storage backend implements.
//!
//! Operations take full or relative [`StoragePath`]s; relative paths are
//! resolved against the backend's current directory. File and folder
//! handles ([`StorageFile`], [`StorageFolder`]) are thin wrappers that
//! forward here with their own path.

use std::io::{Read, Seek, Write};

use crate::attributes::FileAttributes;
use crate::element::{StorageFile, StorageFolder};
use crate::error::{Error, Result};
use crate::metadata::ElementProperties;
use crate::options::{
    CreationCollisionOption, DeletionOption, FileAccessMode, NameCollisionOption, TextEncoding,
};
use crate::path::{PathInformation, StoragePath};

pub trait FileSystem {
    /// Stream returned by [`FileSystem::open_file`]. Closing or dropping it
    /// releases the file.
    type Stream: Read + Write + Seek + Send;

    fn path_information(&self) -> &PathInformation;

    /// Parses `path` under this store's rules.
    fn path(&self, path: &str) -> Result<StoragePath>;

    /// True only if a file is at `path`. A folder at `path` is not an error.
    fn file_exists(&self, path: &StoragePath) -> bool;

    /// True only if a folder is at `path`. A file at `path` is not an error.
    fn folder_exists(&self, path: &StoragePath) -> bool;

    /// Creates an empty file. `recursive` also creates missing ancestors.
    fn create_file(
        &self,
        path: &StoragePath,
        recursive: bool,
        options: CreationCollisionOption,
    ) -> Result<()>;

    fn create_folder(
        &self,
        path: &StoragePath,
        recursive: bool,
        options: CreationCollisionOption,
    ) -> Result<()>;

    fn delete_file(&self, path: &StoragePath, options: DeletionOption) -> Result<()>;

    /// Deletes the folder and everything below it.
    fn delete_folder(&self, path: &StoragePath, options: DeletionOption) -> Result<()>;

    fn copy_file(
        &self,
        path: &StoragePath,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<()>;

    fn copy_folder(
        &self,
        path: &StoragePath,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<()>;

    fn move_file(
        &self,
        path: &StoragePath,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<()>;

    fn move_folder(
        &self,
        path: &StoragePath,
        destination: &StoragePath,
        options: NameCollisionOption,
    ) -> Result<()>;

    /// Moves the file within its folder and returns its new path.
    fn rename_file(
        &self,
        path: &StoragePath,
        new_name: &str,
        options: NameCollisionOption,
    ) -> Result<StoragePath>;

    /// Moves the folder within its parent and returns its new path.
    fn rename_folder(
        &self,
        path: &StoragePath,
        new_name: &str,
        options: NameCollisionOption,
    ) -> Result<StoragePath>;

    fn file_attributes(&self, path: &StoragePath) -> Result<FileAttributes>;

    /// Stores `attributes` without the `DIRECTORY` bit.
    fn set_file_attributes(&self, path: &StoragePath, attributes: FileAttributes) -> Result<()>;

    fn folder_attributes(&self, path: &StoragePath) -> Result<FileAttributes>;

    /// Stores `attributes` with the `DIRECTORY` bit.
    fn set_folder_attributes(&self, path: &StoragePath, attributes: FileAttributes)
    -> Result<()>;

    fn file_properties(&self, path: &StoragePath) -> Result<ElementProperties>;

    fn folder_properties(&self, path: &StoragePath) -> Result<ElementProperties>;

    /// Opens the file for streaming. Fails with a locked error while any
    /// other stream on the file is open.
    fn open_file(&self, path: &StoragePath, mode: FileAccessMode) -> Result<Self::Stream>;

    fn read_bytes(&self, path: &StoragePath) -> Result<Vec<u8>>;

    /// Replaces the whole content of an existing file.
    fn write_bytes(&self, path: &StoragePath, bytes: &[u8]) -> Result<()>;

    /// Files directly inside the folder, ordered by path.
    fn files_in(&self, folder: &StoragePath) -> Result<Vec<StoragePath>>;

    /// Folders directly inside the folder, ordered by path.
    fn folders_in(&self, folder: &StoragePath) -> Result<Vec<StoragePath>>;

    fn read_text(&self, path: &StoragePath, encoding: TextEncoding) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        encoding
            .decode(&bytes)
            .map_err(|reason| Error::invalid_text(path, reason))
    }

    fn write_text(&self, path: &StoragePath, text: &str, encoding: TextEncoding) -> Result<()> {
        self.write_bytes(path, &encoding.encode(text))
    }

    /// A handle on the file at `path`. The file need not exist.
    fn file(&self, path: &str) -> Result<StorageFile<'_, Self>>
    where
        Self: Sized,
    {
        Ok(StorageFile::new(self, self.path(path)?))
    }

    /// A handle on the folder at `path`. The folder need not exist.
    fn folder(&self, path: &str) -> Result<StorageFolder<'_, Self>>
    where
        Self: Sized,
    {
        Ok(StorageFolder::new(self, self.path(path)?))
    }
}
