/// Moving files into their category folders.
///
/// A move is an atomic rename when source and destination share a
/// filesystem. When the rename fails (typically across devices) the file is
/// copied and the source removed afterwards. Every failure along that path is
/// reported; a file is never silently lost.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::file_category::Category;

/// Errors that can occur while organizing files.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Failed to create a destination or category directory.
    #[error("create folder {}: {source}", .path.display())]
    DirectoryCreation { path: PathBuf, source: io::Error },

    /// A root path could not be resolved.
    #[error("invalid path {}: {source}", .path.display())]
    InvalidPath { path: PathBuf, source: io::Error },

    /// The file could not be stat'ed while waiting for it to settle.
    #[error("stat {}: {source}", .path.display())]
    Stat { path: PathBuf, source: io::Error },

    /// The file kept changing size for the whole polling budget.
    #[error("file {} is still changing", .path.display())]
    StillChanging { path: PathBuf },

    /// The path has no final component to reuse as a file name.
    #[error("file {} has no name component", .path.display())]
    MissingFileName { path: PathBuf },

    /// Rename failed, and so did the copy fallback. The source is untouched.
    #[error(
        "move {} → {}: rename={rename_error}, copy={copy_error}",
        .from.display(),
        .to.display()
    )]
    CopyFallback {
        from: PathBuf,
        to: PathBuf,
        rename_error: io::Error,
        #[source]
        copy_error: io::Error,
    },

    /// The copy succeeded but the source could not be removed, leaving a duplicate.
    #[error("remove source after copy {}: {source}", .path.display())]
    SourceRemoval { path: PathBuf, source: io::Error },

    /// Reading the source tree failed during a one-shot run.
    #[error("walk {}: {source}", .path.display())]
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// The filesystem notification subscription could not be opened.
    #[error("new watcher: {source}")]
    Watcher { source: notify::Error },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Record of one file that went through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Where the file was found.
    pub source: PathBuf,
    /// Where the file was (or would have been) placed.
    pub destination: PathBuf,
    /// The category folder it was sorted into.
    pub category: Category,
    /// True when nothing was touched on disk.
    pub dry_run: bool,
}

/// Performs the physical relocation of files.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `source` to `destination`.
    ///
    /// The parent directory of `destination` is created first when missing.
    /// With `dry_run` set, nothing on disk is touched and the call always
    /// succeeds.
    ///
    /// # Errors
    ///
    /// * [`OrganizeError::DirectoryCreation`] if the category folder cannot be created.
    /// * [`OrganizeError::CopyFallback`] if both rename and copy failed.
    /// * [`OrganizeError::SourceRemoval`] if the copy landed but the source stayed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foldersort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// FileOrganizer::move_file(
    ///     Path::new("/downloads/photo.jpg"),
    ///     Path::new("/organized/pics/photo.jpg"),
    ///     false,
    /// )
    /// .expect("move failed");
    /// ```
    pub fn move_file(source: &Path, destination: &Path, dry_run: bool) -> OrganizeResult<()> {
        if dry_run {
            return Ok(());
        }
        relocate(source, destination, |from, to| fs::rename(from, to))
    }
}

/// Creates the parent of `destination`, then tries `rename` and falls back to
/// copy + remove when it fails.
fn relocate<R>(source: &Path, destination: &Path, rename: R) -> OrganizeResult<()>
where
    R: FnOnce(&Path, &Path) -> io::Result<()>,
{
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| OrganizeError::DirectoryCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    if let Err(rename_error) = rename(source, destination) {
        debug!(
            source = %source.display(),
            error = %rename_error,
            "rename failed, falling back to copy"
        );
        if let Err(copy_error) = copy_contents(source, destination) {
            return Err(OrganizeError::CopyFallback {
                from: source.to_path_buf(),
                to: destination.to_path_buf(),
                rename_error,
                copy_error,
            });
        }
        fs::remove_file(source).map_err(|e| OrganizeError::SourceRemoval {
            path: source.to_path_buf(),
            source: e,
        })?;
    }

    debug!(
        source = %source.display(),
        destination = %destination.display(),
        "moved"
    );
    Ok(())
}

/// Copies the bytes of `source` into a freshly created `destination`.
///
/// The destination is opened create-new, so an existing file is never
/// overwritten.
fn copy_contents(source: &Path, destination: &Path) -> io::Result<u64> {
    let mut input = File::open(source)?;
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;
    let copied = io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    Ok(copied)
}
