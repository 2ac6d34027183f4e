//! One-shot organization of a source tree.

use std::collections::HashMap;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::file_organizer::{OrganizeError, OrganizeResult};
use crate::pipeline::{FileReport, Organizer};

/// Counters for a finished one-shot run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizeSummary {
    /// Files moved (or, in a dry run, that would have been moved).
    pub moved: usize,
    /// Files whose pipeline failed.
    pub failed: usize,
    /// Moved files per category folder.
    pub by_category: HashMap<String, usize>,
}

impl OrganizeSummary {
    fn record(&mut self, report: &FileReport) {
        match report {
            Ok(outcome) => {
                self.moved += 1;
                *self
                    .by_category
                    .entry(outcome.category.dir_name().to_string())
                    .or_insert(0) += 1;
            }
            Err(_) => self.failed += 1,
        }
    }
}

impl Organizer {
    /// Walks the source tree once and organizes every file found.
    ///
    /// Entries are visited depth-first in file-name order. The destination
    /// subtree is never entered, and with recursion disabled only the direct
    /// children of the source root are considered. Each file is handed to
    /// `observer` after its pipeline finishes; failures are logged and do
    /// not stop the walk.
    ///
    /// # Errors
    ///
    /// [`OrganizeError::Traversal`] when a directory cannot be read. Files
    /// already processed stay where they were moved.
    pub fn organize_once<F>(&self, mut observer: F) -> OrganizeResult<OrganizeSummary>
    where
        F: FnMut(&FileReport),
    {
        let mut walker = WalkDir::new(self.source()).sort_by_file_name();
        if !self.options().recursive {
            walker = walker.max_depth(1);
        }

        let mut summary = OrganizeSummary::default();
        let entries = walker.into_iter().filter_entry(|entry| {
            !(entry.file_type().is_dir() && self.is_inside_destination(entry.path()))
        });

        for entry in entries {
            let entry = entry.map_err(|e| OrganizeError::Traversal {
                path: e
                    .path()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| self.source().to_path_buf()),
                source: e,
            })?;

            if entry.file_type().is_dir() || !self.is_candidate(entry.path()) {
                continue;
            }

            let report = self.process_file(entry.path());
            if let Err(err) = &report {
                warn!("move failed: {}", err);
            }
            summary.record(&report);
            observer(&report);
        }

        info!(
            moved = summary.moved,
            failed = summary.failed,
            "one-shot run finished"
        );
        Ok(summary)
    }
}
