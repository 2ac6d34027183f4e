//! Continuous organization driven by filesystem notifications.
//!
//! A [`WatchSession`] goes through three states:
//!
//! 1. **Initializing** — [`Organizer::start_watch`] opens the notification
//!    subscription and registers the source root (and, when recursive, every
//!    directory below it except the destination subtree).
//! 2. **Running** — [`WatchSession::run_until`] consumes events on a worker
//!    thread, one at a time and in delivery order, while the caller blocks on
//!    the [`StopSignal`].
//! 3. **Stopped** — once the signal fires the worker finishes the file it is
//!    working on, the subscription is dropped and `run_until` returns.
//!
//! Events arriving around shutdown may be lost.

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::fs;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::file_organizer::{OrganizeError, OrganizeResult};
use crate::pipeline::{FileReport, Organizer};

/// How long the worker waits for an event before re-checking for a stop request.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Creates a connected trigger/signal pair.
pub fn stop_channel() -> (StopTrigger, StopSignal) {
    let (tx, rx) = mpsc::channel();
    (StopTrigger(tx), StopSignal(rx))
}

/// Sending side of the stop notification. Firing it more than once is harmless.
#[derive(Debug, Clone)]
pub struct StopTrigger(Sender<()>);

impl StopTrigger {
    pub fn trigger(&self) {
        // The session may already be gone.
        let _ = self.0.send(());
    }
}

/// Receiving side of the stop notification, consumed by the watch session.
#[derive(Debug)]
pub struct StopSignal(Receiver<()>);

impl StopSignal {
    /// Blocks until the trigger fires or every trigger has been dropped.
    fn wait(self) {
        let _ = self.0.recv();
    }
}

/// A live notification subscription over the source tree.
pub struct WatchSession<'a> {
    organizer: &'a Organizer,
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    watch_set: HashSet<PathBuf>,
}

impl Organizer {
    /// Opens the notification subscription and registers the initial directories.
    ///
    /// # Errors
    ///
    /// [`OrganizeError::Watcher`] when the platform watcher cannot be created.
    /// Directories that fail to register are logged and skipped.
    pub fn start_watch(&self) -> OrganizeResult<WatchSession<'_>> {
        let (tx, events) = mpsc::channel();
        let watcher =
            notify::recommended_watcher(tx).map_err(|source| OrganizeError::Watcher { source })?;

        let mut session = WatchSession {
            organizer: self,
            watcher,
            events,
            watch_set: HashSet::new(),
        };

        if self.options().recursive {
            session.subscribe_tree(self.source());
        } else {
            session.subscribe(self.source());
        }

        info!(directories = session.watch_set.len(), "watch subscription ready");
        Ok(session)
    }
}

impl WatchSession<'_> {
    /// Directories currently subscribed.
    pub fn watched_dirs(&self) -> impl Iterator<Item = &Path> {
        self.watch_set.iter().map(PathBuf::as_path)
    }

    pub fn is_watching(&self, dir: &Path) -> bool {
        self.watch_set.contains(dir)
    }

    /// Processes events until `stop` fires, then releases the subscription.
    ///
    /// `observer` receives the report of every file the pipeline ran on. It
    /// is called from the worker thread.
    pub fn run_until<F>(self, stop: StopSignal, observer: F)
    where
        F: FnMut(&FileReport) + Send,
    {
        let running = AtomicBool::new(true);
        thread::scope(|scope| {
            let worker = scope.spawn(|| self.event_loop(&running, observer));
            stop.wait();
            info!("stop requested");
            running.store(false, Ordering::SeqCst);
            if let Err(payload) = worker.join() {
                panic::resume_unwind(payload);
            }
        });
    }

    fn event_loop<F>(mut self, running: &AtomicBool, mut observer: F)
    where
        F: FnMut(&FileReport),
    {
        while running.load(Ordering::SeqCst) {
            match self.events.recv_timeout(STOP_POLL_INTERVAL) {
                Ok(Ok(event)) => self.handle_event(&event, &mut observer),
                Ok(Err(err)) => warn!("watcher error: {}", err),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!(directories = self.watch_set.len(), "releasing watch subscription");
    }

    fn handle_event<F>(&mut self, event: &Event, observer: &mut F)
    where
        F: FnMut(&FileReport),
    {
        if !is_content_change(&event.kind) {
            return;
        }

        for path in &event.paths {
            // Already moved or deleted.
            let Ok(metadata) = fs::metadata(path) else {
                continue;
            };

            if metadata.is_dir() {
                if self.organizer.options().recursive {
                    self.subscribe_tree(path);
                }
                continue;
            }

            if !self.organizer.is_candidate(path) {
                continue;
            }

            let report = self.organizer.process_file(path);
            if let Err(err) = &report {
                warn!("move failed: {}", err);
            }
            observer(&report);
        }
    }

    fn subscribe(&mut self, dir: &Path) {
        if self.organizer.is_inside_destination(dir) || self.watch_set.contains(dir) {
            return;
        }
        match self.watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                debug!(dir = %dir.display(), "watching directory");
                self.watch_set.insert(dir.to_path_buf());
            }
            Err(err) => warn!("watch add error: {}", err),
        }
    }

    /// Subscribes `root` and every directory below it, skipping the destination.
    fn subscribe_tree(&mut self, root: &Path) {
        let organizer = self.organizer;
        let dirs: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| !organizer.is_inside_destination(entry.path()))
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.into_path())
            .collect();

        for dir in dirs {
            self.subscribe(&dir);
        }
    }
}

/// Creation and content changes; metadata-only updates and removals are ignored.
fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}
