//! foldersort - sort files into category folders by extension
//!
//! Files from a source directory are moved into `pics/`, `docs/`, `video/`,
//! `audio/`, `archives/` or `other/` under a destination directory. Each file
//! is first given time to finish being written, collisions get a numeric
//! prefix (`1_name`, `2_name`, ...), and moves fall back to copy + delete when
//! a rename is not possible. Organization runs either once over the whole
//! tree or continuously from filesystem notifications.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod stability;
pub mod traversal;
pub mod watch;

pub use config::{CompiledFilters, ConfigError, OrganizerConfig};
pub use file_category::{Category, classify};
pub use file_organizer::{FileOrganizer, MoveOutcome, OrganizeError, OrganizeResult};
pub use pipeline::{FileReport, OrganizeOptions, Organizer};
pub use stability::StabilityPolicy;
pub use traversal::OrganizeSummary;
pub use watch::{StopSignal, StopTrigger, WatchSession, stop_channel};

pub use cli::{Cli, run_cli};
