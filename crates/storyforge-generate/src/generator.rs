use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use storyforge_core::{Diagnostic, GroupsConfig, StoryResult, StoryforgeConfig};
use storyforge_encode::StoryboardEncoder;
use storyforge_ir::{validate_stream, ElementStream, GroupSet};
use storyforge_script::{AssetProvider, RunOptions, ScriptManager, ScriptOutcome};
use uuid::Uuid;

use crate::step::{GenerationStep, StepContext};
use crate::steps::{
    DropNonFinite, FilterByTarget, FilterByVisibility, MaterializeAssets, RoundPrecision,
    WidescreenOffset,
};

/// Everything one generation run produced.
#[derive(Debug)]
pub struct GenerationResult<T> {
    pub run_id: Uuid,
    /// Encoder output; built from the scripts that did not fault.
    pub output: T,
    /// One entry per script, faulted or not, sorted by script name.
    pub outcomes: Vec<ScriptOutcome>,
    pub assets_generated: usize,
    pub assets_reused: usize,
    /// Every group name seen in this run, before filtering.
    pub group_names: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Merged groups with persisted settings applied.
    pub groups: GroupSet,
}

impl<T> GenerationResult<T> {
    pub fn faults(&self) -> impl Iterator<Item = &ScriptOutcome> {
        self.outcomes.iter().filter(|o| o.is_faulted())
    }
}

/// Runs scripts, orders their output and applies the step chain.
#[derive(Default)]
pub struct Generator {
    groups: GroupsConfig,
    steps: Vec<Box<dyn GenerationStep>>,
}

impl Generator {
    /// A generator with no steps and default group settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical chain: target filter, visibility filter, rounding,
    /// widescreen offset (when enabled), non-finite element removal, then
    /// asset materialization into `output_dir`.
    pub fn from_config(config: &StoryforgeConfig, assets: Arc<dyn AssetProvider>, output_dir: &Path) -> Self {
        let export = &config.export;
        let mut generator = Self::new()
            .with_groups(config.groups.clone())
            .with_step(FilterByTarget::new(export.target))
            .with_step(FilterByVisibility::new(export.include_hidden))
            .with_step(RoundPrecision::from_settings(export));
        if export.widescreen {
            generator = generator.with_step(WidescreenOffset::from_settings(export));
        }
        generator
            .with_step(DropNonFinite::new())
            .with_step(MaterializeAssets::new(assets, output_dir))
    }

    /// Persisted group settings and ordering.
    pub fn with_groups(mut self, groups: GroupsConfig) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_step(mut self, step: impl GenerationStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every script, build the ordered stream, apply the steps and encode.
    ///
    /// Script faults are reported in the result. Cancellation, a failing
    /// step or a failing encoder return `Err` and no output.
    pub fn generate<E: StoryboardEncoder>(
        &self,
        scripts: &ScriptManager,
        options: &RunOptions,
        encoder: &E,
    ) -> StoryResult<GenerationResult<E::Output>> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("generate", run_id = %run_id);
        let _enter = span.enter();
        let started = Instant::now();

        let run = scripts.run(options)?;
        let mut groups = run.groups;
        groups.apply_settings(&self.groups);
        groups.order_by(&self.groups.order);
        let group_names: BTreeSet<String> = groups.names().map(str::to_string).collect();

        let mut stream = ElementStream::build(&groups, run.video);
        let mut ctx = StepContext::new(&groups);
        ctx.diagnostics = validate_stream(&stream, &groups);

        for step in &self.steps {
            options.cancel.check()?;
            let before = stream.len();
            step.apply(&mut stream, &mut ctx)?;
            tracing::debug!(step = step.name(), before = before, after = stream.len(), "applied step");
        }

        options.cancel.check()?;
        let output = encoder.encode(&stream, &groups)?;

        let StepContext {
            diagnostics,
            assets_generated,
            assets_reused,
            ..
        } = ctx;
        let faults = run.outcomes.iter().filter(|o| o.is_faulted()).count();
        tracing::info!(
            scripts = run.outcomes.len(),
            faults = faults,
            elements = stream.len(),
            assets_generated = assets_generated,
            assets_reused = assets_reused,
            diagnostics = diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation finished"
        );

        Ok(GenerationResult {
            run_id,
            output,
            outcomes: run.outcomes,
            assets_generated,
            assets_reused,
            group_names,
            diagnostics,
            groups,
        })
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("groups", &self.groups)
            .field("steps", &self.step_names())
            .finish()
    }
}
