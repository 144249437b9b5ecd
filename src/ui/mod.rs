//! Terminal User Interface module.
//!
//! This module provides the TUI for the document reader, including:
//! - Main event loop (`run`)
//! - Input handling for the reader and the outline sidebar
//! - Rendering for the reader, sidebar, and status bar
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Layout and render dispatch
//! - `reader` - Document reader widget
//! - `toc` - Outline sidebar widget
//! - `status` - Status bar widget

mod input;
mod loop_runner;
mod reader;
mod render;
mod status;
mod toc;

pub use loop_runner::{run, Action};
