// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::{ErrorKind, NameCollisionOption, TextEncoding};

#[test]
fn test_new_store_has_root() {
    let fs = new_fs();
    assert!(fs.folder_exists(&path(&fs, "/")));
    assert_eq!(fs.len(), 1);
    assert!(listing(&fs, "/").is_empty());

    let fs = windows_fs();
    assert!(fs.folder_exists(&path(&fs, "c:/")));
    fs.check_consistency().unwrap();
}

#[test]
fn test_folders_on_other_volumes_become_roots() {
    let fs = windows_fs();
    mkdir(&fs, "D:\\Data");
    let roots: Vec<String> = fs
        .roots()
        .unwrap()
        .iter()
        .map(|root| root.as_str().to_string())
        .collect();
    assert_eq!(roots, vec!["C:\\".to_string(), "D:\\".to_string()]);
    fs.check_consistency().unwrap();
}

#[test]
fn test_equivalent_paths_find_same_node() {
    let fs = new_fs();
    write_file(&fs, "/a/b/file.txt", b"x");
    for alias in ["/a/b/file.txt", "/a/./b/file.txt", "/a/c/../b/file.txt", "a/b/file.txt", "//a//b/file.txt"] {
        assert!(fs.file_exists(&path(&fs, alias)), "{alias}");
    }
    assert!(!fs.file_exists(&path(&fs, "/A/b/file.txt")));
}

#[test]
fn test_case_insensitive_store() {
    let fs = windows_fs();
    write_file(&fs, "C:\\Docs\\Report.TXT", b"data");
    assert!(fs.file_exists(&path(&fs, "c:/docs/report.txt")));

    let err = fs
        .create_file(&path(&fs, "C:\\DOCS\\report.txt"), false, CreationCollisionOption::Fail)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ElementAlreadyExists);

    let files = fs.files_in(&path(&fs, "c:\\docs")).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].as_str(), "C:\\Docs\\Report.TXT");
    fs.check_consistency().unwrap();
}

#[test]
fn test_no_duplicate_occupancy() {
    let fs = new_fs();
    write_file(&fs, "/x/a", b"1");
    write_file(&fs, "/y/a", b"2");
    mkdir(&fs, "/x/sub");

    let replace = NameCollisionOption::ReplaceExisting;
    fs.copy_file(&path(&fs, "/x/a"), &path(&fs, "/y/a"), replace).unwrap();
    fs.move_folder(&path(&fs, "/x"), &path(&fs, "/y/x"), replace).unwrap();
    fs.copy_folder(&path(&fs, "/y"), &path(&fs, "/z"), replace).unwrap();
    fs.move_file(&path(&fs, "/z/a"), &path(&fs, "/z/x/a"), replace).unwrap();

    let all = listing(&fs, "/");
    let mut unique = all.clone();
    unique.dedup();
    assert_eq!(all, unique);
    assert_eq!(
        all,
        vec!["/y/", "/y/a", "/y/x/", "/y/x/a", "/y/x/sub/", "/z/", "/z/x/", "/z/x/a", "/z/x/sub/"]
    );
    fs.check_consistency().unwrap();
}

#[test]
fn test_move_folder_with_subtree() {
    let fs = new_fs();
    write_file(&fs, "/F/a", b"a");
    write_file(&fs, "/F/b", b"b");
    write_file(&fs, "/F/G/c", b"c");
    mkdir(&fs, "/D");

    fs.move_folder(&path(&fs, "/F"), &path(&fs, "/D/F"), NameCollisionOption::Fail)
        .unwrap();

    assert_eq!(listing(&fs, "/D/F"), vec!["/D/F/G/", "/D/F/G/c", "/D/F/a", "/D/F/b"]);
    assert!(!fs.folder_exists(&path(&fs, "/F")));
    assert!(!fs.file_exists(&path(&fs, "/F/G/c")));
    assert_eq!(fs.read_bytes(&path(&fs, "/D/F/G/c")).unwrap(), b"c");
    fs.check_consistency().unwrap();
}

#[test]
fn test_move_folder_replaces_destination() {
    let fs = new_fs();
    write_file(&fs, "/F/a", b"a");
    write_file(&fs, "/D/old", b"old");

    fs.move_folder(&path(&fs, "/F"), &path(&fs, "/D"), NameCollisionOption::ReplaceExisting)
        .unwrap();
    assert_eq!(listing(&fs, "/"), vec!["/D/", "/D/a"]);
    fs.check_consistency().unwrap();
}

#[test]
fn test_move_into_own_subtree_leaves_tree_unchanged() {
    let fs = new_fs();
    write_file(&fs, "/F/a", b"a");
    mkdir(&fs, "/F/sub");
    let before = listing(&fs, "/");

    let err = fs
        .move_folder(&path(&fs, "/F"), &path(&fs, "/F/sub"), NameCollisionOption::ReplaceExisting)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    let err = fs
        .move_folder(&path(&fs, "/F"), &path(&fs, "/F/sub/F"), NameCollisionOption::Fail)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    assert_eq!(listing(&fs, "/"), before);
    fs.check_consistency().unwrap();
}

#[test]
fn test_move_by_prefix_is_not_descendant() {
    // "/ab" shares a string prefix with "/a" but is not inside it
    let fs = new_fs();
    mkdir(&fs, "/a");
    mkdir(&fs, "/ab");
    fs.move_folder(&path(&fs, "/a"), &path(&fs, "/ab/a"), NameCollisionOption::Fail)
        .unwrap();
    assert!(fs.folder_exists(&path(&fs, "/ab/a")));
}

#[test]
fn test_copy_is_independent() {
    let fs = new_fs();
    write_file(&fs, "/x", b"original");
    fs.copy_file(&path(&fs, "/x"), &path(&fs, "/y"), NameCollisionOption::Fail)
        .unwrap();
    fs.write_bytes(&path(&fs, "/y"), b"changed").unwrap();

    assert_eq!(fs.read_bytes(&path(&fs, "/x")).unwrap(), b"original");
    assert_eq!(fs.read_bytes(&path(&fs, "/y")).unwrap(), b"changed");
}

#[test]
fn test_copy_folder_keeps_source() {
    let fs = new_fs();
    write_file(&fs, "/src/one.txt", b"1");
    write_file(&fs, "/src/deep/two.txt", b"2");

    fs.copy_folder(&path(&fs, "/src"), &path(&fs, "/dst"), NameCollisionOption::Fail)
        .unwrap();
    assert_eq!(
        listing(&fs, "/"),
        vec![
            "/dst/",
            "/dst/deep/",
            "/dst/deep/two.txt",
            "/dst/one.txt",
            "/src/",
            "/src/deep/",
            "/src/deep/two.txt",
            "/src/one.txt",
        ]
    );
    assert_eq!(
        fs.read_text(&path(&fs, "/dst/deep/two.txt"), TextEncoding::Utf8).unwrap(),
        "2"
    );
    fs.check_consistency().unwrap();
}

#[test]
fn test_copy_to_same_location() {
    let fs = new_fs();
    write_file(&fs, "/x", b"1");
    let err = fs
        .copy_file(&path(&fs, "/x"), &path(&fs, "/./x"), NameCollisionOption::ReplaceExisting)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert_eq!(fs.read_bytes(&path(&fs, "/x")).unwrap(), b"1");
}

#[test]
fn test_delete_folder_removes_everything_below() {
    let fs = new_fs();
    write_file(&fs, "/F/a", b"a");
    write_file(&fs, "/F/G/H/c", b"c");
    fs.delete_folder(&path(&fs, "/F"), crate::DeletionOption::FailOnMissing)
        .unwrap();
    assert!(listing(&fs, "/").is_empty());
    assert_eq!(fs.len(), 1);
    assert!(!fs.file_exists(&path(&fs, "/F/G/H/c")));
    fs.check_consistency().unwrap();
}
