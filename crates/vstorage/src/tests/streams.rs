// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{Read, Seek, SeekFrom, Write};

use super::*;
use crate::{DeletionOption, Error, ErrorKind, FileAccessMode, NameCollisionOption};

#[test]
fn test_write_then_read() {
    let fs = new_fs();
    write_file(&fs, "/data.bin", b"");
    let file = fs.file("/data.bin").unwrap();

    let mut stream = file.open(FileAccessMode::Write).unwrap();
    stream.write_all(&[1, 2, 3]).unwrap();
    stream.close();

    let mut stream = file.open(FileAccessMode::Read).unwrap();
    let mut data = Vec::new();
    stream.read_to_end(&mut data).unwrap();
    stream.close();
    assert_eq!(data, vec![1, 2, 3]);
}

#[test]
fn test_single_stream_per_file() {
    let fs = new_fs();
    write_file(&fs, "/f", b"abc");
    let file = fs.file("/f").unwrap();

    let reader = file.open(FileAccessMode::Read).unwrap();
    let err = file.open(FileAccessMode::Write).unwrap_err();
    assert_eq!(err, Error::locked("/f"));
    assert_eq!(
        file.open(FileAccessMode::Read).unwrap_err().kind(),
        ErrorKind::ElementLocked
    );
    assert_eq!(file.read_bytes().unwrap_err().kind(), ErrorKind::ElementLocked);
    reader.close();

    let writer = file.open(FileAccessMode::Write).unwrap();
    writer.close();
}

#[test]
fn test_open_file_blocks_structural_changes() {
    let fs = new_fs();
    write_file(&fs, "/dir/f", b"abc");
    let stream = fs.file("/dir/f").unwrap().open(FileAccessMode::Read).unwrap();
    let before = listing(&fs, "/");

    let locked = |r: crate::Result<()>| r.unwrap_err().kind() == ErrorKind::ElementLocked;
    assert!(locked(fs.delete_folder(&path(&fs, "/dir"), DeletionOption::FailOnMissing)));
    assert!(locked(fs.delete_file(&path(&fs, "/dir/f"), DeletionOption::IgnoreMissing)));
    assert!(locked(fs.move_folder(&path(&fs, "/dir"), &path(&fs, "/moved"), NameCollisionOption::Fail)));
    assert!(locked(fs.copy_folder(&path(&fs, "/dir"), &path(&fs, "/copy"), NameCollisionOption::Fail)));
    assert!(locked(fs.create_file(
        &path(&fs, "/dir/f"),
        false,
        CreationCollisionOption::ReplaceExisting
    )));
    assert!(locked(fs.create_folder(
        &path(&fs, "/dir"),
        false,
        CreationCollisionOption::ReplaceExisting
    )));
    assert_eq!(listing(&fs, "/"), before);

    stream.close();
    fs.move_folder(&path(&fs, "/dir"), &path(&fs, "/moved"), NameCollisionOption::Fail)
        .unwrap();
    fs.check_consistency().unwrap();
}

#[test]
fn test_writes_land_on_close() {
    let fs = new_fs();
    write_file(&fs, "/f", b"before");
    let file = fs.file("/f").unwrap();

    let mut stream = file.open(FileAccessMode::ReadWrite).unwrap();
    stream.seek(SeekFrom::End(0)).unwrap();
    stream.write_all(b"+after").unwrap();
    assert_eq!(stream.len(), 12);
    stream.close();

    assert_eq!(file.read_bytes().unwrap(), b"before+after");
}

#[test]
fn test_mode_mismatch_is_not_supported() {
    let fs = new_fs();
    write_file(&fs, "/f", b"abc");
    let file = fs.file("/f").unwrap();

    let mut reader = file.open(FileAccessMode::Read).unwrap();
    let err = reader.write(b"x").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::Unsupported);
    reader.close();

    let mut writer = file.open(FileAccessMode::Write).unwrap();
    let mut buf = [0u8; 3];
    assert_eq!(writer.read(&mut buf).unwrap_err().kind(), std::io::ErrorKind::Unsupported);
    writer.close();

    let err = fs
        .open(&path(&fs, "/f"), FileAccessMode::Read, true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert_eq!(file.read_bytes().unwrap(), b"abc");
}

#[test]
fn test_open_on_folder_conflicts() {
    let fs = new_fs();
    mkdir(&fs, "/dir");
    let err = fs.file("/dir").unwrap().open(FileAccessMode::Read).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConflictingElementType);
}

#[test]
fn test_dropped_stream_is_closed() {
    let fs = new_fs();
    write_file(&fs, "/f", b"");
    let file = fs.file("/f").unwrap();
    {
        let mut stream = file.open(FileAccessMode::Write).unwrap();
        stream.write_all(b"dropped").unwrap();
    }
    assert_eq!(file.read_bytes().unwrap(), b"dropped");
}

#[test]
fn test_close_from_another_thread() {
    let fs = new_fs();
    write_file(&fs, "/f", b"");
    let file = fs.file("/f").unwrap();

    let mut stream = file.open(FileAccessMode::Write).unwrap();
    let handle = std::thread::spawn(move || {
        stream.write_all(b"from a thread").unwrap();
        stream.close();
    });
    handle.join().unwrap();

    assert_eq!(file.read_bytes().unwrap(), b"from a thread");
    file.delete(DeletionOption::FailOnMissing).unwrap();
}

#[test]
fn test_content_survives_move() {
    let fs = new_fs();
    write_file(&fs, "/f", b"abc");
    let original = fs.file("/f").unwrap();
    let moved = original
        .move_to(&path(&fs, "/g"), NameCollisionOption::Fail)
        .unwrap();
    let mut stream = moved.open(FileAccessMode::ReadWrite).unwrap();
    stream.set_len(1).unwrap();
    stream.close();
    assert_eq!(moved.read_bytes().unwrap(), b"a");
}

#[test]
fn test_read_past_end_returns_nothing() {
    let fs = new_fs();
    write_file(&fs, "/f", b"abc");
    let mut stream = fs.file("/f").unwrap().open(FileAccessMode::Read).unwrap();
    stream.seek(SeekFrom::Start(10)).unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(stream.read(&mut buf).unwrap(), 0);
    let mut rest = Vec::new();
    assert_eq!(stream.read_to_end(&mut rest).unwrap(), 0);
    assert_eq!(stream.position(), 10);
    stream.close();
}

#[test]
fn test_write_at_unreachable_offset_fails() {
    let fs = new_fs();
    write_file(&fs, "/f", b"abc");
    let file = fs.file("/f").unwrap();

    let mut stream = file.open(FileAccessMode::Write).unwrap();
    stream.seek(SeekFrom::Start(u64::MAX)).unwrap();
    let err = stream.write(b"x").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::Unsupported);
    assert_eq!(stream.len(), 3);
    stream.close();

    assert_eq!(file.read_bytes().unwrap(), b"abc");
}
