//! Multi-page build CLI.
//!
//! `multipage build` runs one bundler process per build unit and assembles
//! their outputs; `multipage dev` serves pages straight from their templates.
//! The binary is a thin wrapper over [`commands`], which tests call directly.

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, Result};
