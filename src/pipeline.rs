//! The per-file pipeline shared by one-shot and watch mode.
//!
//! Classifier → stability wait → unique name → move. Both drivers hand each
//! discovered file to [`Organizer::process_file`] and deal with the result;
//! a failure only ever affects the file it was raised for.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CompiledFilters;
use crate::file_category::classify;
use crate::file_organizer::{FileOrganizer, MoveOutcome, OrganizeError, OrganizeResult};
use crate::naming::unique_destination;
use crate::stability::{StabilityPolicy, wait_for_stable_size};

/// Switches shared by both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Descend into (and watch) subdirectories of the source.
    pub recursive: bool,
    /// Report intended moves without touching the filesystem.
    pub dry_run: bool,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            dry_run: false,
        }
    }
}

/// Result of one file going through the pipeline, as seen by observers.
pub type FileReport = OrganizeResult<MoveOutcome>;

/// Sorts files from a source tree into category folders of a destination.
#[derive(Debug)]
pub struct Organizer {
    source: PathBuf,
    destination: PathBuf,
    options: OrganizeOptions,
    stability: StabilityPolicy,
    filters: CompiledFilters,
}

impl Organizer {
    /// Prepares an organizer, creating the destination root when missing.
    ///
    /// Both roots are canonicalized so that events and walk entries can be
    /// compared against the destination by prefix.
    ///
    /// # Errors
    ///
    /// [`OrganizeError::DirectoryCreation`] when the destination cannot be
    /// created, [`OrganizeError::InvalidPath`] when either root cannot be
    /// resolved.
    pub fn new(
        source: &Path,
        destination: &Path,
        options: OrganizeOptions,
    ) -> OrganizeResult<Self> {
        fs::create_dir_all(destination).map_err(|e| OrganizeError::DirectoryCreation {
            path: destination.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            source: canonical(source)?,
            destination: canonical(destination)?,
            options,
            stability: StabilityPolicy::default(),
            filters: CompiledFilters::default(),
        })
    }

    /// Replaces the stability policy.
    pub fn with_stability(mut self, stability: StabilityPolicy) -> Self {
        self.stability = stability;
        self
    }

    /// Replaces the file filters.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn options(&self) -> OrganizeOptions {
        self.options
    }

    /// True for paths at or below the destination root.
    ///
    /// A symlink that resolves into the destination counts as well, so a
    /// destination reached through a link inside the source is never walked,
    /// watched or moved.
    pub fn is_inside_destination(&self, path: &Path) -> bool {
        if path.starts_with(&self.destination) {
            return true;
        }
        let is_link = fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink());
        is_link && fs::canonicalize(path).is_ok_and(|target| target.starts_with(&self.destination))
    }

    /// True when `path` should go through the pipeline.
    pub fn is_candidate(&self, path: &Path) -> bool {
        !self.is_inside_destination(path) && self.filters.should_include(path)
    }

    /// Runs one file through the whole pipeline.
    pub fn process_file(&self, path: &Path) -> OrganizeResult<MoveOutcome> {
        let category = classify(path);
        wait_for_stable_size(path, &self.stability)?;

        let file_name = path.file_name().ok_or_else(|| OrganizeError::MissingFileName {
            path: path.to_path_buf(),
        })?;
        let target_dir = self.destination.join(category.dir_name());
        let destination = unique_destination(&target_dir, file_name);

        FileOrganizer::move_file(path, &destination, self.options.dry_run)?;

        Ok(MoveOutcome {
            source: path.to_path_buf(),
            destination,
            category,
            dry_run: self.options.dry_run,
        })
    }
}

fn canonical(path: &Path) -> OrganizeResult<PathBuf> {
    fs::canonicalize(path).map_err(|e| OrganizeError::InvalidPath {
        path: path.to_path_buf(),
        source: e,
    })
}
