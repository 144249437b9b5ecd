//! Utility functions for common operations.
//!
//! - **Text processing**: Unicode-aware width calculation, truncation, and
//!   control-character stripping for outline titles
//!
//! # Examples
//!
//! ```
//! use toc_tracker::util::{display_width, truncate_to_width};
//!
//! let width = display_width("Getting started");
//! let fitted = truncate_to_width("Getting started", 10);
//! assert!(display_width(&fitted) <= 10);
//! assert_eq!(width, 15);
//! ```

mod text;

pub use text::{display_width, strip_control_chars, truncate_to_width};
