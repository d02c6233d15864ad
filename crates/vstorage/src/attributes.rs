// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use bitflags::bitflags;

bitflags! {
    /// Attribute bits stored on every element.
    ///
    /// Bit values follow the conventional file attribute layout so that a
    /// backend over a real filesystem can pass them through unchanged.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FileAttributes: u32 {
        const READ_ONLY           = 1 << 0;
        const HIDDEN              = 1 << 1;
        const SYSTEM              = 1 << 2;
        /// Always present on folders, never on files.
        const DIRECTORY           = 1 << 4;
        const ARCHIVE             = 1 << 5;
        const NORMAL              = 1 << 7;
        const TEMPORARY           = 1 << 8;
        const COMPRESSED          = 1 << 11;
        const OFFLINE             = 1 << 12;
        const NOT_CONTENT_INDEXED = 1 << 13;
        const ENCRYPTED           = 1 << 14;
    }
}

impl FileAttributes {
    /// Attributes as they are stored on a file.
    #[must_use]
    pub fn for_file(self) -> Self {
        self - FileAttributes::DIRECTORY
    }

    /// Attributes as they are stored on a folder.
    #[must_use]
    pub fn for_folder(self) -> Self {
        self | FileAttributes::DIRECTORY
    }
}
