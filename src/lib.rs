//! Scroll-synchronized table of contents.
//!
//! The crate is split into a framework-independent core and the terminal
//! reader that hosts it:
//!
//! - [`outline`] - markdown rendering into block nodes, heading extraction,
//!   and the range table between consecutive headings
//! - [`tracker`] - scroll resolution, throttling, spring navigation and the
//!   [`tracker::OutlineTracker`] that owns all of it
//! - [`config`] - TOML configuration for the reader and the tracker
//! - [`util`] - display-width helpers for sidebar rendering
//!
//! All geometry reaches the core through [`tracker::Geometry`], and all
//! timing through explicit `tokio::time::Instant` values, so the tracker can
//! be driven by synthetic inputs in tests.

pub mod config;
pub mod outline;
pub mod tracker;
pub mod util;
