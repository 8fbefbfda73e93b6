//! SKF seeder - loads the Security Knowledge Framework markdown corpus into SQLite.
//!
//! This crate provides the core functionality for the `skf-seed` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Database path, resource root and corpus layout resolution
//! - [`markdown`] - Filename parsing, content escaping, directory listing
//! - [`model`] - Data types (ChecklistCategory, KbItem, CodeItem)
//! - [`seed`] - Lifecycle operations (clear, init, clean, update)
//! - [`storage`] - SQLite database layer
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod markdown;
pub mod model;
pub mod seed;
pub mod storage;

pub use error::{Error, Result};
pub use seed::Seeder;
