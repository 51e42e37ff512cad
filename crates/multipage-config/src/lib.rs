//! Configuration for multipage builds.
//!
//! The options schema lives in [`options`], file discovery in [`discovery`],
//! and the full layering pipeline (file, context overrides, environment) in
//! [`loading`]. Library users holding a config in memory can go straight
//! through [`MultiPageOptions::from_value`].

pub mod context;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod loading;
pub mod merge;
pub mod options;
pub mod validation;

pub use context::{CommandKind, ConfigContext, Mode};
pub use discovery::{ConfigDiscovery, CONFIG_FILE_NAMES, PACKAGE_JSON_FIELD};
pub use error::{ConfigError, Result};
pub use loading::{apply_context, load, LoadedOptions, ENV_KEYS, ENV_PREFIX};
pub use merge::merge_values;
pub use validation::{validate_strategy_name, RESERVED_OUTPUT_NAMES};
pub use options::{
    BundlerSettings, MatchPatterns, MergeMode, MultiPageOptions, PageConfig, StrategyConfig,
    DEFAULT_STRATEGY,
};
