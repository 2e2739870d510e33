//! Whole-file replacement for store files.
//!
//! Contents go to a hidden sibling file first and are renamed over the
//! target, so readers never observe a half-written table.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::error::StoreError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replaces `file_name` inside `dir` with `contents`.
///
/// `file_name` must be a single normal path component.
///
/// # Errors
///
/// Returns [`StoreError::WriteError`] naming the target file when any step
/// fails. The temporary file is removed on failure.
pub(crate) fn replace_file(
    dir: &Dir,
    file_name: &Utf8Path,
    contents: &[u8],
) -> Result<(), StoreError> {
    let write_error = |message: String| StoreError::WriteError {
        path: file_name.to_path_buf(),
        message,
    };

    let mut components = file_name.components();
    let (Some(Utf8Component::Normal(name)), None) = (components.next(), components.next()) else {
        return Err(write_error("store path must be a bare file name".to_owned()));
    };

    let tmp_name = temp_name_for(name);
    if let Err(err) = write_temp(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(write_error(err.to_string()));
    }
    if let Err(err) = rename_over(dir, &tmp_name, name) {
        drop(dir.remove_file(&tmp_name));
        return Err(write_error(err.to_string()));
    }

    // Directory sync is best effort; some filesystems refuse it.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
    Ok(())
}

fn temp_name_for(name: &str) -> String {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    format!(".{name}.tmp.{}.{nanos}.{counter}", std::process::id())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(windows)]
fn rename_over(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    // Windows refuses to rename over an existing file.
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target)
}

#[cfg(not(windows))]
fn rename_over(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target)
}

#[cfg(test)]
mod tests {
    use cap_std::ambient_authority;
    use rstest::rstest;

    use super::*;

    fn scratch_dir(label: &str) -> (std::path::PathBuf, Dir) {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos());
        let path = std::env::temp_dir().join(format!("farm-data-{label}-{nanos}"));
        std::fs::create_dir_all(&path).expect("create scratch dir");
        let dir = Dir::open_ambient_dir(&path, ambient_authority()).expect("open scratch dir");
        (path, dir)
    }

    #[test]
    fn replaces_existing_contents() {
        let (path, dir) = scratch_dir("replace");
        let target = Utf8Path::new("table.csv");
        replace_file(&dir, target, b"first").expect("first write");
        replace_file(&dir, target, b"second").expect("second write");
        assert_eq!(dir.read_to_string(target).expect("read back"), "second");

        let leftovers = dir
            .entries()
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
        std::fs::remove_dir_all(path).expect("clean up");
    }

    #[rstest]
    #[case("nested/table.csv")]
    #[case("../table.csv")]
    #[case("")]
    fn rejects_paths_that_are_not_file_names(#[case] raw: &str) {
        let (path, dir) = scratch_dir("reject");
        let result = replace_file(&dir, Utf8Path::new(raw), b"data");
        assert!(matches!(result, Err(StoreError::WriteError { .. })));
        std::fs::remove_dir_all(path).expect("clean up");
    }
}
