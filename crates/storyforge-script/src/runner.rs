use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use storyforge_core::{CancellationToken, StoryError, StoryResult, VariableValue};
use storyforge_ir::{GroupSet, Video};

use crate::capability::{Capabilities, LogEntry};
use crate::context::{ScriptContext, ScriptOutput};
use crate::rhai_host::RhaiScript;
use crate::script::Script;
use crate::variables::VariableRegistry;

/// Inputs shared by every script of one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub capabilities: Capabilities,
    /// Values and functions visible to every script.
    pub variables: VariableRegistry,
    /// Per-script value overrides keyed by script name.
    pub overrides: HashMap<String, BTreeMap<String, VariableValue>>,
    pub cancel: CancellationToken,
}

/// Result of one script's execution.
#[derive(Debug)]
pub struct ScriptOutcome {
    pub script: String,
    /// Error or panic that stopped the script; its groups were discarded.
    pub fault: Option<StoryError>,
    pub logs: Vec<LogEntry>,
    pub element_count: usize,
    pub elapsed: Duration,
}

impl ScriptOutcome {
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }
}

/// Merged output of every script of a run.
#[derive(Debug, Default)]
pub struct RunOutput {
    pub groups: GroupSet,
    pub video: Option<Video>,
    /// One entry per script, sorted by script name.
    pub outcomes: Vec<ScriptOutcome>,
}

impl RunOutput {
    pub fn faults(&self) -> impl Iterator<Item = &ScriptOutcome> {
        self.outcomes.iter().filter(|o| o.is_faulted())
    }
}

/// Owns the scripts of a project and runs them.
#[derive(Default)]
pub struct ScriptManager {
    scripts: Vec<Arc<dyn Script>>,
}

impl ScriptManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.rhai` file in `dir`; each script is named after its file stem.
    pub fn discover(dir: &Path) -> StoryResult<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "rhai"))
            .collect();
        paths.sort();

        let mut manager = Self::new();
        for path in paths {
            manager.add(RhaiScript::from_file(&path)?)?;
        }
        tracing::debug!(dir = %dir.display(), scripts = manager.len(), "discovered scripts");
        Ok(manager)
    }

    pub fn add(&mut self, script: impl Script + 'static) -> StoryResult<()> {
        self.add_shared(Arc::new(script))
    }

    pub fn add_shared(&mut self, script: Arc<dyn Script>) -> StoryResult<()> {
        if self.scripts.iter().any(|s| s.name() == script.name()) {
            return Err(StoryError::contract(format!(
                "a script named '{}' is already registered",
                script.name()
            )));
        }
        self.scripts.push(script);
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.scripts.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Run every script, in parallel, and merge the groups of those that succeeded.
    ///
    /// Cancellation is all-or-nothing: a run cancelled before or during
    /// execution returns `Err(Cancelled)` instead of a partial merge.
    pub fn run(&self, options: &RunOptions) -> StoryResult<RunOutput> {
        options.cancel.check()?;
        let started = Instant::now();

        let mut results: Vec<(ScriptOutcome, Option<ScriptOutput>)> = self
            .scripts
            .par_iter()
            .map(|script| execute_one(script.as_ref(), options))
            .collect();

        options.cancel.check()?;

        // merge order must not depend on scheduling
        results.sort_by(|a, b| a.0.script.cmp(&b.0.script));

        let mut groups = GroupSet::new();
        let mut video: Option<Video> = None;
        let mut outcomes = Vec::with_capacity(results.len());
        for (mut outcome, output) in results {
            if let Some(output) = output {
                if let (Some(existing), Some(duplicate)) = (&video, &output.video) {
                    let err = StoryError::contract(format!(
                        "video '{}' conflicts with '{}' set by an earlier script",
                        duplicate.path, existing.path
                    ));
                    tracing::warn!(script = %outcome.script, error = %err, "script faulted");
                    outcome.fault = Some(err);
                    outcome.element_count = 0;
                    outcomes.push(outcome);
                    continue;
                }
                if output.video.is_some() {
                    video = output.video;
                }
                groups.merge(output.groups);
            }
            outcomes.push(outcome);
        }

        let faults = outcomes.iter().filter(|o| o.is_faulted()).count();
        tracing::info!(
            scripts = outcomes.len(),
            faults = faults,
            groups = groups.len(),
            elements = groups.element_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scripts finished"
        );

        Ok(RunOutput {
            groups,
            video,
            outcomes,
        })
    }
}

impl std::fmt::Debug for ScriptManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptManager")
            .field("scripts", &self.names())
            .finish()
    }
}

fn execute_one(script: &dyn Script, options: &RunOptions) -> (ScriptOutcome, Option<ScriptOutput>) {
    let name = script.name().to_string();
    let started = Instant::now();

    if options.cancel.is_cancelled() {
        let outcome = ScriptOutcome {
            script: name,
            fault: Some(StoryError::Cancelled),
            logs: Vec::new(),
            element_count: 0,
            elapsed: started.elapsed(),
        };
        return (outcome, None);
    }

    let mut variables = options.variables.clone();
    if let Some(overrides) = options.overrides.get(&name) {
        variables.extend_values(overrides);
    }
    let mut ctx = ScriptContext::new(&name, options.capabilities.clone(), variables)
        .with_cancellation(options.cancel.clone());

    tracing::debug!(script = %name, "running script");
    let result = panic::catch_unwind(AssertUnwindSafe(|| script.execute(&mut ctx)))
        .unwrap_or_else(|payload| Err(StoryError::script(&name, panic_message(payload.as_ref()))));

    let output = ctx.into_output();
    let elapsed = started.elapsed();
    match result {
        Ok(()) => {
            let outcome = ScriptOutcome {
                script: name,
                fault: None,
                logs: output.logs.clone(),
                element_count: output.groups.element_count(),
                elapsed,
            };
            (outcome, Some(output))
        }
        Err(err) => {
            tracing::warn!(script = %name, error = %err, "script faulted");
            let outcome = ScriptOutcome {
                script: name,
                fault: Some(err),
                logs: output.logs,
                element_count: 0,
                elapsed,
            };
            (outcome, None)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
