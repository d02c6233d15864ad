// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Path values and the per-store rules they are parsed under.

mod info;
mod storage_path;

pub use info::{PathComparison, PathInformation};
pub use storage_path::{PathKind, StoragePath};
