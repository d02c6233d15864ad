// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File bytes, the exclusive-access tracker guarding them, and the stream
//! handed out by `open`.
//!
//! A stream works on a private copy of the bytes. Writes become visible in
//! the file only when the stream is closed (or dropped), and only one stream
//! may exist per file at a time, whatever its mode.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use diagnostics::{debug, warn};

use crate::error::{Error, Result};
use crate::options::FileAccessMode;
use crate::path::StoragePath;

/// Returned by the tracker when a stream already holds the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("content is held by an open stream")]
pub struct ContentLocked;

/// Exclusive-access gate for one file's content.
///
/// Acquire fails immediately when held; nothing ever waits.
#[derive(Debug, Default)]
pub struct ReadWriteTracker {
    locked: Mutex<bool>,
}

impl ReadWriteTracker {
    // A poisoned flag is still a valid bool.
    fn flag(&self) -> MutexGuard<'_, bool> {
        self.locked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_lock(&self) -> std::result::Result<(), ContentLocked> {
        let mut locked = self.flag();
        if *locked {
            return Err(ContentLocked);
        }
        *locked = true;
        Ok(())
    }

    fn unlock(&self) {
        *self.flag() = false;
    }

    fn check_unlocked(&self) -> std::result::Result<(), ContentLocked> {
        if *self.flag() {
            Err(ContentLocked)
        } else {
            Ok(())
        }
    }

    pub fn is_locked(&self) -> bool {
        *self.flag()
    }

    pub fn acquire_read(&self) -> std::result::Result<(), ContentLocked> {
        self.try_lock()
    }

    pub fn acquire_write(&self) -> std::result::Result<(), ContentLocked> {
        self.try_lock()
    }

    pub fn acquire_read_write(&self) -> std::result::Result<(), ContentLocked> {
        self.try_lock()
    }

    pub fn acquire(&self, mode: FileAccessMode) -> std::result::Result<(), ContentLocked> {
        match mode {
            FileAccessMode::Read => self.acquire_read(),
            FileAccessMode::Write => self.acquire_write(),
            FileAccessMode::ReadWrite => self.acquire_read_write(),
        }
    }

    pub fn release_read(&self) {
        self.unlock();
    }

    pub fn release_write(&self) {
        self.unlock();
    }

    pub fn release_read_write(&self) {
        self.unlock();
    }

    pub fn release(&self, mode: FileAccessMode) {
        match mode {
            FileAccessMode::Read => self.release_read(),
            FileAccessMode::Write => self.release_write(),
            FileAccessMode::ReadWrite => self.release_read_write(),
        }
    }

    /// Used before cloning the bytes (copy).
    pub fn ensure_readable(&self) -> std::result::Result<(), ContentLocked> {
        self.check_unlocked()
    }

    /// Used before moving or deleting the owning file.
    pub fn ensure_writable(&self) -> std::result::Result<(), ContentLocked> {
        self.check_unlocked()
    }

    pub fn ensure_read_writable(&self) -> std::result::Result<(), ContentLocked> {
        self.check_unlocked()
    }
}

#[derive(Debug, Default)]
struct ContentState {
    bytes: Vec<u8>,
    written_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct ContentCell {
    state: Mutex<ContentState>,
    tracker: ReadWriteTracker,
}

impl ContentCell {
    fn state(&self) -> MutexGuard<'_, ContentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The bytes of one file node. Never shared between nodes.
#[derive(Debug, Default)]
pub struct FileContent {
    cell: Arc<ContentCell>,
}

impl FileContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> u64 {
        self.cell.state().bytes.len() as u64
    }

    /// Time of the last write-mode close, if any.
    pub fn written_on(&self) -> Option<DateTime<Utc>> {
        self.cell.state().written_on
    }

    pub fn tracker(&self) -> &ReadWriteTracker {
        &self.cell.tracker
    }

    /// An independent copy of the bytes, refused while a stream is open.
    pub fn duplicate(&self) -> std::result::Result<FileContent, ContentLocked> {
        self.tracker().ensure_readable()?;
        let state = self.cell.state();
        Ok(FileContent {
            cell: Arc::new(ContentCell {
                state: Mutex::new(ContentState {
                    bytes: state.bytes.clone(),
                    written_on: state.written_on,
                }),
                tracker: ReadWriteTracker::default(),
            }),
        })
    }

    /// Acquires the tracker and returns a stream over a copy of the bytes,
    /// or over nothing when `truncate` is set. `path` labels errors and logs.
    pub fn open(
        &self,
        path: &StoragePath,
        mode: FileAccessMode,
        truncate: bool,
    ) -> std::result::Result<FileContentStream, ContentLocked> {
        self.tracker().acquire(mode)?;
        let lease = Lease {
            cell: self.cell.clone(),
            mode,
        };
        let buffer = if truncate {
            Vec::new()
        } else {
            self.cell.state().bytes.clone()
        };
        let mode_name = format!("{mode:?}");
        debug!("Opened stream on {path} for {mode}", path: path.as_str(), mode: mode_name.as_str());
        Ok(FileContentStream {
            lease: Some(lease),
            path: path.to_string(),
            mode,
            buffer,
            position: 0,
        })
    }
}

/// Holds the tracker for the lifetime of a stream.
#[derive(Debug)]
struct Lease {
    cell: Arc<ContentCell>,
    mode: FileAccessMode,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.cell.tracker.release(self.mode);
    }
}

/// A positioned view over a file's bytes.
///
/// Implements [`Read`], [`Write`] and [`Seek`]. Reads fail unless the mode
/// allows reading and writes fail unless it allows writing. The bytes are
/// stored back into the file by [`close`](FileContentStream::close) or on drop.
#[derive(Debug)]
pub struct FileContentStream {
    lease: Option<Lease>,
    path: String,
    mode: FileAccessMode,
    buffer: Vec<u8>,
    position: usize,
}

impl FileContentStream {
    pub fn mode(&self) -> FileAccessMode {
        self.mode
    }

    pub fn len(&self) -> u64 {
        self.buffer.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn position(&self) -> u64 {
        self.position as u64
    }

    fn require_read(&self) -> Result<()> {
        if self.mode.can_read() {
            Ok(())
        } else {
            Err(Error::not_supported(format!(
                "reading {} from a stream opened for {:?}",
                self.path, self.mode
            )))
        }
    }

    fn require_write(&self) -> Result<()> {
        if self.mode.can_write() {
            Ok(())
        } else {
            Err(Error::not_supported(format!(
                "writing {} through a stream opened for {:?}",
                self.path, self.mode
            )))
        }
    }

    /// Copies bytes from the current position into `buf`.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.require_read()?;
        let start = self.position.min(self.buffer.len());
        let n = (self.buffer.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&self.buffer[start..start + n]);
        self.position += n;
        Ok(n)
    }

    /// Everything from the current position to the end.
    pub fn read_remaining(&mut self) -> Result<Vec<u8>> {
        self.require_read()?;
        let start = self.position.min(self.buffer.len());
        self.position = self.buffer.len().max(self.position);
        Ok(self.buffer[start..].to_vec())
    }

    /// Writes at the current position, zero-filling any gap left by a seek
    /// past the end.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<()> {
        self.require_write()?;
        let end = self.position.checked_add(data.len()).ok_or_else(|| {
            Error::not_supported(format!(
                "writing {} bytes at offset {} of {}",
                data.len(),
                self.position,
                self.path
            ))
        })?;
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[self.position..end].copy_from_slice(data);
        self.position = end;
        Ok(())
    }

    /// Truncates or zero-extends the content. The position is unchanged.
    pub fn set_len(&mut self, len: u64) -> Result<()> {
        self.require_write()?;
        let len = usize::try_from(len)
            .map_err(|_| Error::not_supported(format!("length {len} for {}", self.path)))?;
        self.buffer.resize(len, 0);
        Ok(())
    }

    /// Stores the bytes back (write modes) and releases the file.
    pub fn close(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        let Some(lease) = self.lease.take() else {
            return;
        };
        if self.mode.can_write() {
            let mut state = lease.cell.state();
            state.bytes = std::mem::take(&mut self.buffer);
            state.written_on = Some(Utc::now());
        }
        // Dropping the lease releases the tracker.
        drop(lease);
        debug!("Closed stream on {path}", path: self.path.as_str());
    }
}

impl Drop for FileContentStream {
    fn drop(&mut self) {
        if self.lease.is_some() {
            warn!("Stream on {path} dropped without close", path: self.path.as_str());
            self.finish();
        }
    }
}

impl Read for FileContentStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_chunk(buf)?)
    }
}

impl Write for FileContentStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Content is only stored on close.
        Ok(())
    }
}

impl Seek for FileContentStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(n) => (0i128, i128::from(n)),
            SeekFrom::End(n) => (self.buffer.len() as i128, i128::from(n)),
            SeekFrom::Current(n) => (self.position as i128, i128::from(n)),
        };
        let target = base + offset;
        let target = usize::try_from(target).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid seek to {target} in {}", self.path),
            )
        })?;
        self.position = target;
        Ok(target as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::path::PathInformation;

    fn path() -> StoragePath {
        StoragePath::new(Arc::new(PathInformation::default()), "/file.bin").unwrap()
    }

    #[test]
    fn test_tracker_is_exclusive() {
        let tracker = ReadWriteTracker::default();
        tracker.acquire_read().unwrap();
        assert_eq!(tracker.acquire_write(), Err(ContentLocked));
        assert_eq!(tracker.acquire_read(), Err(ContentLocked));
        assert_eq!(tracker.ensure_writable(), Err(ContentLocked));
        tracker.release_read();
        assert!(!tracker.is_locked());
        tracker.ensure_readable().unwrap();
        tracker.acquire_read_write().unwrap();
        assert!(tracker.is_locked());
        tracker.release(FileAccessMode::ReadWrite);
        tracker.ensure_read_writable().unwrap();
    }

    #[test]
    fn test_write_is_visible_only_after_close() {
        let content = FileContent::new();
        let mut stream = content.open(&path(), FileAccessMode::Write, false).unwrap();
        stream.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(content.len(), 0);
        assert!(content.written_on().is_none());
        stream.close();

        assert_eq!(content.len(), 3);
        assert!(content.written_on().is_some());
        let mut reader = content.open(&path(), FileAccessMode::Read, false).unwrap();
        let mut data = Vec::new();
        reader.read_to_end(&mut data).unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_mode_enforcement() {
        let content = FileContent::new();
        let mut stream = content.open(&path(), FileAccessMode::Read, false).unwrap();
        let err = stream.write_chunk(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        let io_err = stream.write(b"x").unwrap_err();
        assert_eq!(io_err.kind(), io::ErrorKind::Unsupported);
        assert_eq!(stream.set_len(0).unwrap_err().kind(), ErrorKind::NotSupported);
        stream.close();

        let mut stream = content.open(&path(), FileAccessMode::Write, false).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(
            stream.read_chunk(&mut buf).unwrap_err().kind(),
            ErrorKind::NotSupported
        );
        stream.close();
    }

    #[test]
    fn test_second_open_fails_until_close() {
        let content = FileContent::new();
        let reader = content.open(&path(), FileAccessMode::Read, false).unwrap();
        assert_eq!(
            content.open(&path(), FileAccessMode::Write, false).unwrap_err(),
            ContentLocked
        );
        reader.close();
        content.open(&path(), FileAccessMode::Write, false).unwrap().close();
    }

    #[test]
    fn test_drop_releases_and_stores() {
        let content = FileContent::new();
        {
            let mut stream = content.open(&path(), FileAccessMode::ReadWrite, false).unwrap();
            stream.write_all(b"kept").unwrap();
        }
        assert!(!content.tracker().is_locked());
        assert_eq!(content.len(), 4);
    }

    #[test]
    fn test_truncate_and_seek() {
        let content = FileContent::new();
        let mut stream = content.open(&path(), FileAccessMode::Write, false).unwrap();
        stream.write_all(b"abcdef").unwrap();
        stream.close();

        let mut stream = content.open(&path(), FileAccessMode::ReadWrite, false).unwrap();
        stream.seek(SeekFrom::End(2)).unwrap();
        stream.write_all(b"z").unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(stream.read_remaining().unwrap(), b"abcdef\0\0z".to_vec());
        assert!(stream.seek(SeekFrom::Current(-100)).is_err());
        stream.set_len(2).unwrap();
        stream.close();
        assert_eq!(content.len(), 2);

        let stream = content.open(&path(), FileAccessMode::Write, true).unwrap();
        assert!(stream.is_empty());
        stream.close();
        assert_eq!(content.len(), 0);
    }

    #[test]
    fn test_duplicate_does_not_alias() {
        let content = FileContent::new();
        let mut stream = content.open(&path(), FileAccessMode::Write, false).unwrap();
        stream.write_all(b"original").unwrap();
        stream.close();

        let copy = content.duplicate().unwrap();
        let mut stream = copy.open(&path(), FileAccessMode::Write, true).unwrap();
        stream.write_all(b"changed").unwrap();
        stream.close();

        let mut reader = content.open(&path(), FileAccessMode::Read, false).unwrap();
        assert_eq!(reader.read_remaining().unwrap(), b"original".to_vec());
        assert_eq!(content.duplicate().unwrap_err(), ContentLocked);
        reader.close();
    }

    #[test]
    fn test_close_from_another_thread() {
        let content = FileContent::new();
        let mut stream = content.open(&path(), FileAccessMode::Write, false).unwrap();
        stream.write_all(b"threaded").unwrap();
        std::thread::spawn(move || stream.close()).join().unwrap();
        assert!(!content.tracker().is_locked());
        assert_eq!(content.len(), 8);
    }
}
