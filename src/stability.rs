//! Waiting for a file to stop growing.
//!
//! A file that is still being written (a download, a copy in progress) must
//! not be moved. The detector samples the file size at a fixed interval and
//! declares the file stable once two consecutive samples agree.

use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::file_organizer::{OrganizeError, OrganizeResult};

/// How often and how many times to sample a file's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityPolicy {
    /// Pause between two size samples.
    pub interval: Duration,
    /// Maximum number of samples taken.
    pub attempts: u32,
}

impl Default for StabilityPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            attempts: 5,
        }
    }
}

/// Blocks until `path` has the same size on two consecutive samples.
///
/// # Errors
///
/// Returns [`OrganizeError::Stat`] as soon as the file cannot be stat'ed and
/// [`OrganizeError::StillChanging`] when the sample budget runs out.
pub fn wait_for_stable_size(path: &Path, policy: &StabilityPolicy) -> OrganizeResult<()> {
    poll_until_stable(|| fs::metadata(path).map(|meta| meta.len()), policy).map_err(|failure| {
        match failure {
            PollFailure::Read(source) => OrganizeError::Stat {
                path: path.to_path_buf(),
                source,
            },
            PollFailure::Exhausted => OrganizeError::StillChanging {
                path: path.to_path_buf(),
            },
        }
    })
}

#[derive(Debug)]
enum PollFailure {
    Read(io::Error),
    Exhausted,
}

fn poll_until_stable<F>(mut read_size: F, policy: &StabilityPolicy) -> Result<(), PollFailure>
where
    F: FnMut() -> io::Result<u64>,
{
    let mut previous = None;
    for attempt in 1..=policy.attempts {
        let size = read_size().map_err(PollFailure::Read)?;
        if previous == Some(size) {
            return Ok(());
        }
        previous = Some(size);
        if attempt < policy.attempts {
            thread::sleep(policy.interval);
        }
    }
    Err(PollFailure::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn instant(attempts: u32) -> StabilityPolicy {
        StabilityPolicy {
            interval: Duration::ZERO,
            attempts,
        }
    }

    /// Replays `sizes`, counting how many samples were taken.
    fn scripted_sizes(
        sizes: Vec<io::Result<u64>>,
    ) -> (impl FnMut() -> io::Result<u64>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut sizes = sizes.into_iter();
        let read = move || {
            counter.set(counter.get() + 1);
            sizes.next().unwrap_or_else(|| Ok(u64::MAX))
        };
        (read, calls)
    }

    #[test]
    fn test_default_policy() {
        let policy = StabilityPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(500));
        assert_eq!(policy.attempts, 5);
    }

    #[test]
    fn test_stable_after_two_equal_readings() {
        let (read, calls) = scripted_sizes(vec![Ok(10), Ok(10)]);
        assert!(poll_until_stable(read, &instant(5)).is_ok());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_growing_then_settling() {
        let (read, calls) = scripted_sizes(vec![Ok(1), Ok(5), Ok(9), Ok(9)]);
        assert!(poll_until_stable(read, &instant(5)).is_ok());
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_settling_on_last_attempt() {
        let (read, _) = scripted_sizes(vec![Ok(1), Ok(2), Ok(3), Ok(4), Ok(4)]);
        assert!(poll_until_stable(read, &instant(5)).is_ok());
    }

    #[test]
    fn test_always_changing_exhausts_budget() {
        let (read, calls) = scripted_sizes(vec![Ok(1), Ok(2), Ok(3), Ok(4), Ok(5), Ok(5)]);
        let result = poll_until_stable(read, &instant(5));
        assert!(matches!(result, Err(PollFailure::Exhausted)));
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn test_equal_but_not_consecutive_is_not_stable() {
        let (read, _) = scripted_sizes(vec![Ok(3), Ok(4), Ok(3), Ok(4)]);
        let result = poll_until_stable(read, &instant(4));
        assert!(matches!(result, Err(PollFailure::Exhausted)));
    }

    #[test]
    fn test_read_error_stops_immediately() {
        let (read, calls) = scripted_sizes(vec![
            Ok(3),
            Err(io::Error::new(io::ErrorKind::NotFound, "removed")),
            Ok(3),
        ]);
        let result = poll_until_stable(read, &instant(5));
        assert!(matches!(result, Err(PollFailure::Read(_))));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_single_attempt_never_stable() {
        let (read, _) = scripted_sizes(vec![Ok(3), Ok(3)]);
        assert!(matches!(
            poll_until_stable(read, &instant(1)),
            Err(PollFailure::Exhausted)
        ));
    }

    #[test]
    fn test_wait_for_stable_size_on_idle_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("done.txt");
        fs::write(&path, "finished").unwrap();

        let policy = StabilityPolicy {
            interval: Duration::from_millis(5),
            attempts: 3,
        };
        wait_for_stable_size(&path, &policy).expect("idle file should be stable");
    }

    #[test]
    fn test_wait_for_stable_size_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("missing.txt");

        let err = wait_for_stable_size(&path, &instant(3)).unwrap_err();
        assert!(matches!(err, OrganizeError::Stat { .. }));
        assert!(err.to_string().starts_with("stat "));
    }
}
