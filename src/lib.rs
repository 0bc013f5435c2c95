//! Library crate for userpager.
//!
//! This crate exposes the building blocks of the TUI:
//! - Application state, loader and update loop (`app`)
//! - Command-line flags (`cli`)
//! - Search-box debouncing (`debounce`)
//! - Error and result types (`error`)
//! - Observer plumbing with teardown scopes (`events`)
//! - View state and its shareable link (`location`)
//! - In-memory search and pagination (`search`)
//! - User data sources (`sys`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `userpager` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod cli;
pub mod debounce;
pub mod error;
pub mod events;
pub mod location;
pub mod search;
pub mod sys;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
