// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Uniform path, file and folder storage.
//!
//! [`StoragePath`] is an immutable path value parsed under the rules of a
//! [`PathInformation`]. [`FileSystem`] is the operation set a backend
//! provides, and [`InMemoryFileSystem`] is a complete backend that keeps
//! the whole tree in memory, suitable for tests and sandboxes.
//!
//! ```
//! use vstorage::{CreationCollisionOption, FileSystem, InMemoryFileSystem, TextEncoding};
//!
//! let fs = InMemoryFileSystem::new();
//! let file = fs.file("/docs/readme.txt")?;
//! file.create(true, CreationCollisionOption::Fail)?;
//! file.write_text("hello", TextEncoding::Utf8)?;
//! assert_eq!(file.read_text(TextEncoding::Utf8)?, "hello");
//! # Ok::<(), vstorage::Error>(())
//! ```

mod attributes;
mod element;
mod entry_type;
mod error;
mod fs;
pub mod memory;
mod metadata;
mod options;
pub mod path;

pub use attributes::FileAttributes;
pub use element::{StorageFile, StorageFolder};
pub use entry_type::EntryType;
pub use error::{Error, ErrorKind, Result};
pub use fs::FileSystem;
pub use memory::InMemoryFileSystem;
pub use metadata::ElementProperties;
pub use options::{
    CreationCollisionOption, DeletionOption, FileAccessMode, NameCollisionOption, TextEncoding,
};
pub use path::{PathComparison, PathInformation, PathKind, StoragePath};

#[cfg(test)]
mod tests;
