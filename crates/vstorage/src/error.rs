// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::EntryType;

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur in storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Parent folder not found: {0}")]
    ParentNotFound(String),

    #[error("Path has no parent folder: {0}")]
    NoParent(String),

    #[error("Destination parent folder not found: {0}")]
    DestinationParentNotFound(String),

    #[error("Conflicting element: a {existing} already exists at {path}")]
    ConflictingElement { path: String, existing: EntryType },

    #[error("Element already exists: {0}")]
    AlreadyExists(String),

    #[error("Element is locked by an open stream: {0}")]
    Locked(String),

    #[error("Cannot move or rename a root folder: {0}")]
    CannotMoveRoot(String),

    #[error("Cannot move {from} into its own descendant {to}")]
    CannotMoveIntoDescendant { from: String, to: String },

    #[error("Invalid operation on {path}: {reason}")]
    InvalidOperation { path: String, reason: String },

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Invalid text content in {path}: {reason}")]
    InvalidText { path: String, reason: String },

    #[error("Invalid path configuration: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`], independent of which operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedPath,
    NotFound,
    ParentNotFound,
    ConflictingElementType,
    ElementAlreadyExists,
    ElementLocked,
    InvalidOperation,
    NotSupported,
    InvalidData,
    Configuration,
}

impl Error {
    pub fn malformed_path<P: AsRef<str>, R: Into<String>>(path: P, reason: R) -> Self {
        Error::MalformedPath {
            path: path.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn file_not_found<P: AsRef<str>>(path: P) -> Self {
        Error::FileNotFound(path.as_ref().to_string())
    }

    pub fn folder_not_found<P: AsRef<str>>(path: P) -> Self {
        Error::FolderNotFound(path.as_ref().to_string())
    }

    pub fn parent_not_found<P: AsRef<str>>(path: P) -> Self {
        Error::ParentNotFound(path.as_ref().to_string())
    }

    pub fn no_parent<P: AsRef<str>>(path: P) -> Self {
        Error::NoParent(path.as_ref().to_string())
    }

    pub fn destination_parent_not_found<P: AsRef<str>>(path: P) -> Self {
        Error::DestinationParentNotFound(path.as_ref().to_string())
    }

    pub fn conflicting_element<P: AsRef<str>>(path: P, existing: EntryType) -> Self {
        Error::ConflictingElement {
            path: path.as_ref().to_string(),
            existing,
        }
    }

    pub fn already_exists<P: AsRef<str>>(path: P) -> Self {
        Error::AlreadyExists(path.as_ref().to_string())
    }

    pub fn locked<P: AsRef<str>>(path: P) -> Self {
        Error::Locked(path.as_ref().to_string())
    }

    pub fn cannot_move_root<P: AsRef<str>>(path: P) -> Self {
        Error::CannotMoveRoot(path.as_ref().to_string())
    }

    pub fn cannot_move_into_descendant<P: AsRef<str>, Q: AsRef<str>>(from: P, to: Q) -> Self {
        Error::CannotMoveIntoDescendant {
            from: from.as_ref().to_string(),
            to: to.as_ref().to_string(),
        }
    }

    pub fn invalid_operation<P: AsRef<str>, R: Into<String>>(path: P, reason: R) -> Self {
        Error::InvalidOperation {
            path: path.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_supported<S: Into<String>>(what: S) -> Self {
        Error::NotSupported(what.into())
    }

    pub fn invalid_text<P: AsRef<str>, R: Into<String>>(path: P, reason: R) -> Self {
        Error::InvalidText {
            path: path.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn config<S: Into<String>>(what: S) -> Self {
        Error::Config(what.into())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedPath { .. } => ErrorKind::MalformedPath,
            Error::FileNotFound(_) | Error::FolderNotFound(_) => ErrorKind::NotFound,
            Error::ParentNotFound(_)
            | Error::NoParent(_)
            | Error::DestinationParentNotFound(_) => ErrorKind::ParentNotFound,
            Error::ConflictingElement { .. } => ErrorKind::ConflictingElementType,
            Error::AlreadyExists(_) => ErrorKind::ElementAlreadyExists,
            Error::Locked(_) => ErrorKind::ElementLocked,
            Error::CannotMoveRoot(_)
            | Error::CannotMoveIntoDescendant { .. }
            | Error::InvalidOperation { .. } => ErrorKind::InvalidOperation,
            Error::NotSupported(_) => ErrorKind::NotSupported,
            Error::InvalidText { .. } => ErrorKind::InvalidData,
            Error::Config(_) => ErrorKind::Configuration,
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        use std::io::ErrorKind as Io;
        let kind = match err.kind() {
            ErrorKind::NotFound | ErrorKind::ParentNotFound => Io::NotFound,
            ErrorKind::ElementAlreadyExists => Io::AlreadyExists,
            ErrorKind::ElementLocked => Io::ResourceBusy,
            ErrorKind::NotSupported => Io::Unsupported,
            ErrorKind::MalformedPath | ErrorKind::Configuration => Io::InvalidInput,
            ErrorKind::InvalidData => Io::InvalidData,
            ErrorKind::ConflictingElementType | ErrorKind::InvalidOperation => Io::Other,
        };
        std::io::Error::new(kind, err)
    }
}
