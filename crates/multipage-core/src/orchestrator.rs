//! Running the bundler once per build unit.
//!
//! Every unit gets its own child process and output directory. All units run
//! concurrently and the join waits for every one of them: a failing unit never
//! cancels its siblings. Each child has a timeout and observes a shared
//! cancellation signal; either one kills the child.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use multipage_config::BundlerSettings;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::temp::temp_html_name;
use crate::unit::{BuildUnit, UnitKind, UNIT_ENV_VAR};

/// Lines of captured output kept in a failure message.
const ERROR_TAIL_LINES: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub id: String,
    pub kind: UnitKind,
    pub success: bool,
    pub error: Option<String>,
    pub out_dir: PathBuf,
    pub duration: Duration,
}

#[derive(Debug, Error)]
enum UnitFailure {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for the bundler: {0}")]
    Wait(#[source] std::io::Error),

    #[error("bundler exited with code {code}{}", output_suffix(.output))]
    Exit { code: i32, output: String },

    #[error("bundler timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("bundler manifest missing: {}", .0.display())]
    MissingManifest(PathBuf),

    #[error("failed to move the HTML for page '{page}' into place: {source}")]
    Finalize {
        page: String,
        #[source]
        source: std::io::Error,
    },
}

fn output_suffix(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(":\n{output}")
    }
}

/// Sending half of the cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half, cloned into every running unit.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Sender gone without cancelling.
            std::future::pending::<()>().await;
        }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    root: PathBuf,
    command: Vec<String>,
    forward: Vec<String>,
    timeout: Duration,
    debug: bool,
    cancel: CancelSignal,
}

impl Orchestrator {
    pub fn new(root: impl Into<PathBuf>, bundler: &BundlerSettings) -> Self {
        Self {
            root: root.into(),
            command: bundler.command.clone(),
            forward: Vec::new(),
            timeout: Duration::from_secs(bundler.timeout_secs),
            debug: false,
            cancel: CancelSignal::never(),
        }
    }

    /// Arguments appended after the configured command.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.forward = args;
        self
    }

    /// Inherit the child's stdio instead of capturing it.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every unit concurrently and wait for all of them. Results come
    /// back in unit order.
    pub async fn run_all(&self, units: &[BuildUnit]) -> Vec<BuildResult> {
        self.run_all_with(units, |_, _| {}).await
    }

    /// Like [`run_all`](Self::run_all), calling `on_finish` with the unit's
    /// index as each unit completes.
    pub async fn run_all_with<F>(&self, units: &[BuildUnit], mut on_finish: F) -> Vec<BuildResult>
    where
        F: FnMut(usize, &BuildResult),
    {
        let mut set = JoinSet::new();
        for (index, unit) in units.iter().enumerate() {
            let this = self.clone();
            let unit = unit.clone();
            set.spawn(async move { (index, this.run_single(&unit).await) });
        }

        let mut results: Vec<Option<BuildResult>> = vec![None; units.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => {
                    on_finish(index, &result);
                    results[index] = Some(result);
                }
                Err(err) => tracing::error!(%err, "build task failed to complete"),
            }
        }

        results
            .into_iter()
            .zip(units)
            .map(|(result, unit)| {
                result.unwrap_or_else(|| BuildResult {
                    id: unit.id.clone(),
                    kind: unit.kind,
                    success: false,
                    error: Some("build task panicked".to_string()),
                    out_dir: unit.out_dir.clone(),
                    duration: Duration::ZERO,
                })
            })
            .collect()
    }

    /// Run one unit to completion.
    pub async fn run_single(&self, unit: &BuildUnit) -> BuildResult {
        let started = Instant::now();
        tracing::debug!(unit = %unit.id, kind = unit.kind.as_str(), "starting build");

        let outcome = match self.execute(unit).await {
            Ok(()) => finalize_outputs(unit).await,
            Err(err) => Err(err),
        };

        let duration = started.elapsed();
        match outcome {
            Ok(()) => {
                tracing::debug!(unit = %unit.id, ?duration, "build finished");
                BuildResult {
                    id: unit.id.clone(),
                    kind: unit.kind,
                    success: true,
                    error: None,
                    out_dir: unit.out_dir.clone(),
                    duration,
                }
            }
            Err(err) => {
                tracing::debug!(unit = %unit.id, %err, "build failed");
                BuildResult {
                    id: unit.id.clone(),
                    kind: unit.kind,
                    success: false,
                    error: Some(err.to_string()),
                    out_dir: unit.out_dir.clone(),
                    duration,
                }
            }
        }
    }

    async fn execute(&self, unit: &BuildUnit) -> Result<(), UnitFailure> {
        let manifest = unit.manifest_path(&self.root);
        if !manifest.is_file() {
            return Err(UnitFailure::MissingManifest(manifest));
        }
        if self.cancel.is_cancelled() {
            return Err(UnitFailure::Cancelled);
        }

        let (program, args) = self.command.split_first().ok_or_else(|| UnitFailure::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty bundler command"),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args.iter().map(|arg| expand_tokens(arg, unit, &manifest)))
            .args(&self.forward)
            .current_dir(&self.root)
            .env(UNIT_ENV_VAR, &manifest)
            .envs(&unit.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if self.debug {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let child = cmd.spawn().map_err(|source| UnitFailure::Spawn {
            program: program.clone(),
            source,
        })?;

        let mut cancel = self.cancel.clone();
        let output = tokio::select! {
            waited = timeout(self.timeout, child.wait_with_output()) => match waited {
                Ok(output) => output.map_err(UnitFailure::Wait)?,
                Err(_) => return Err(UnitFailure::Timeout(self.timeout)),
            },
            _ = cancel.cancelled() => return Err(UnitFailure::Cancelled),
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let captured = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            stderr.into_owned()
        };
        Err(UnitFailure::Exit {
            code: output.status.code().unwrap_or(-1),
            output: tail(&captured, ERROR_TAIL_LINES),
        })
    }
}

/// Substitute `{unit}`, `{outDir}` and `{id}` in a command argument.
pub fn expand_tokens(arg: &str, unit: &BuildUnit, manifest: &Path) -> String {
    arg.replace("{unit}", &manifest.to_string_lossy())
        .replace("{outDir}", &unit.out_dir.to_string_lossy())
        .replace("{id}", &unit.id)
}

/// Rename `.temp.mp.<page>.html` outputs back to `<page>.html`.
async fn finalize_outputs(unit: &BuildUnit) -> Result<(), UnitFailure> {
    for page in &unit.pages {
        let failed = |source| UnitFailure::Finalize {
            page: page.clone(),
            source,
        };
        let temp = unit.out_dir.join(temp_html_name(page));
        if !tokio::fs::try_exists(&temp).await.map_err(failed)? {
            tracing::debug!(unit = %unit.id, page = %page, "no html output to rename");
            continue;
        }
        tokio::fs::rename(&temp, unit.out_dir.join(format!("{page}.html")))
            .await
            .map_err(failed)?;
    }
    Ok(())
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
