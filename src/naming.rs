//! Collision-free destination names.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns a path inside `target_dir` that does not exist yet.
///
/// The plain `file_name` is tried first, then `1_file_name`, `2_file_name`,
/// and so on. The check is not atomic: another process may claim the name
/// between this call and the move.
///
/// # Examples
///
/// ```no_run
/// use foldersort::naming::unique_destination;
/// use std::ffi::OsStr;
/// use std::path::Path;
///
/// let path = unique_destination(Path::new("/organized/docs"), OsStr::new("note.txt"));
/// println!("{}", path.display());
/// ```
pub fn unique_destination(target_dir: &Path, file_name: &OsStr) -> PathBuf {
    let mut candidate = target_dir.join(file_name);
    let mut slot: u64 = 0;
    while is_taken(&candidate) {
        slot += 1;
        candidate = target_dir.join(prefixed(slot, file_name));
    }
    candidate
}

/// Links count as taken even when dangling. A slot that cannot be inspected
/// is returned as is; the move into it fails with the same error.
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn prefixed(slot: u64, file_name: &OsStr) -> OsString {
    let mut name = OsString::from(format!("{}_", slot));
    name.push(file_name);
    name
}
