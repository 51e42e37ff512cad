//! `multipage resolve`: print the bundler config for the current unit.
//!
//! Bundler config files run this (or read the manifest themselves) to learn
//! which unit they are building.

use std::path::PathBuf;

use multipage_core::{BuildUnit, UNIT_ENV_VAR};

use crate::cli::ResolveArgs;
use crate::error::{BuildError, Result};

pub fn execute(args: ResolveArgs) -> Result<()> {
    let path = match args.unit {
        Some(path) => path,
        None => std::env::var_os(UNIT_ENV_VAR)
            .map(PathBuf::from)
            .ok_or(BuildError::NoUnit { var: UNIT_ENV_VAR })?,
    };

    let unit = BuildUnit::read_manifest(&path)?;
    let json = if args.manifest {
        serde_json::to_string_pretty(&unit)?
    } else {
        serde_json::to_string_pretty(&unit.config)?
    };
    println!("{json}");
    Ok(())
}
