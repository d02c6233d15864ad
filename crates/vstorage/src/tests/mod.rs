// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Behavioral tests driving the in-memory backend through its public API.

mod streams;
mod tree;

use crate::{
    CreationCollisionOption, FileSystem, InMemoryFileSystem, PathInformation, StoragePath,
};

pub(crate) fn new_fs() -> InMemoryFileSystem {
    diagnostics::init();
    InMemoryFileSystem::new()
}

pub(crate) fn path(fs: &InMemoryFileSystem, s: &str) -> StoragePath {
    fs.path(s).unwrap()
}

pub(crate) fn mkdir(fs: &InMemoryFileSystem, s: &str) {
    fs.create_folder(&path(fs, s), true, CreationCollisionOption::UseExisting)
        .unwrap();
}

pub(crate) fn write_file(fs: &InMemoryFileSystem, s: &str, data: &[u8]) {
    let p = path(fs, s);
    fs.create_file(&p, true, CreationCollisionOption::ReplaceExisting)
        .unwrap();
    fs.write_bytes(&p, data).unwrap();
}

/// Full paths of every file and folder below `root`, sorted.
pub(crate) fn listing(fs: &InMemoryFileSystem, root: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = vec![path(fs, root)];
    while let Some(folder) = pending.pop() {
        for file in fs.files_in(&folder).unwrap() {
            out.push(file.as_str().to_string());
        }
        for sub in fs.folders_in(&folder).unwrap() {
            out.push(format!("{}/", sub.as_str()));
            pending.push(sub);
        }
    }
    out.sort();
    out
}

pub(crate) fn windows_fs() -> InMemoryFileSystem {
    InMemoryFileSystem::with_path_information(PathInformation::windows()).unwrap()
}
