//! Multi-page build orchestration.
//!
//! The pipeline runs in strict phases:
//!
//! 1. [`entry::discover`] finds page entry files and names them.
//! 2. [`plan::plan`] resolves each page's [`PageConfig`] and groups pages by
//!    strategy.
//! 3. [`unit::synthesize`] turns the plan into [`BuildUnit`]s, writing the
//!    temporary templates and unit manifests under a [`TempArtifacts`] guard.
//! 4. [`Orchestrator::run_all`] spawns one bundler process per unit.
//! 5. [`reorganize::merge_all`] and [`reorganize::reorganize`] assemble the
//!    final output tree.
//!
//! [`DevRouter`] serves pages straight from their templates during
//! development and shares phases 1 and 2.
//!
//! [`PageConfig`]: multipage_config::PageConfig

pub mod entry;
pub mod error;
pub mod orchestrator;
pub mod page_config;
pub mod pattern;
pub mod plan;
pub mod reorganize;
pub mod router;
pub mod strategy;
pub mod temp;
pub mod template;
pub mod unit;

pub use entry::{discover, CandidateFile, EntryFile};
pub use error::{Error, Result};
pub use orchestrator::{cancel_pair, BuildResult, CancelHandle, CancelSignal, Orchestrator};
pub use page_config::{PageConfigSource, PageContext};
pub use plan::{plan, BuildPlan, PlannedPage};
pub use reorganize::{merge_all, reorganize, AssetUsageMap, MergeSummary, ReorganizeSummary};
pub use router::{DevPage, DevRoute, DevRouter};
pub use strategy::{StrategyBuild, StrategyConfigBuilder};
pub use temp::TempArtifacts;
pub use unit::{synthesize, BuildUnit, UnitKind, UNIT_ENV_VAR};
