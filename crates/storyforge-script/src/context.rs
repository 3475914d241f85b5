use storyforge_core::{CancellationToken, LogLevel, StoryError, StoryResult, VariableValue};
use storyforge_ir::{Group, GroupSet, Video};

use crate::asset::AssetDescriptor;
use crate::beatmap::{Beatmap, Waveform};
use crate::capability::{Capabilities, LogEntry};
use crate::variables::VariableRegistry;

/// What a script produced once its execution call returned.
#[derive(Debug, Default)]
pub struct ScriptOutput {
    pub groups: GroupSet,
    pub video: Option<Video>,
    pub logs: Vec<LogEntry>,
}

/// The API surface a script works against during one execution.
///
/// Each execution gets a fresh context; groups created here belong to this
/// script until the runner merges them.
#[derive(Debug, Default)]
pub struct ScriptContext {
    script: String,
    groups: GroupSet,
    video: Option<Video>,
    capabilities: Capabilities,
    variables: VariableRegistry,
    logs: Vec<LogEntry>,
    cancel: CancellationToken,
}

impl ScriptContext {
    pub fn new(script: impl Into<String>, capabilities: Capabilities, variables: VariableRegistry) -> Self {
        Self {
            script: script.into(),
            capabilities,
            variables,
            ..Default::default()
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn script_name(&self) -> &str {
        &self.script
    }

    /// Look up a group by exact name, creating it on first use.
    pub fn get_group(&mut self, name: &str) -> &mut Group {
        self.groups.get_or_create(name)
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut GroupSet {
        &mut self.groups
    }

    /// Set the run's video. A second call is rejected and keeps the first video.
    pub fn set_video(&mut self, path: impl Into<String>, offset: f64) -> StoryResult<()> {
        let path = path.into();
        if let Some(existing) = &self.video {
            return Err(StoryError::contract(format!(
                "video '{}' is already set; cannot set '{path}'",
                existing.path
            )));
        }
        self.video = Some(Video::new(path, offset));
        Ok(())
    }

    pub fn video(&self) -> Option<&Video> {
        self.video.as_ref()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn beatmap(&self) -> Option<&Beatmap> {
        self.capabilities.beatmap.as_deref()
    }

    pub fn waveform(&self) -> Option<&dyn Waveform> {
        self.capabilities.waveform.as_deref()
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&VariableValue> {
        self.variables.value(name)
    }

    /// Numeric variable or `default` when unset or not a number.
    pub fn float_or(&self, name: &str, default: f64) -> f64 {
        self.variable(name)
            .and_then(VariableValue::as_f64)
            .unwrap_or(default)
    }

    pub fn call(&self, name: &str, args: &[VariableValue]) -> StoryResult<VariableValue> {
        self.variables.call(name, args)
    }

    /// Read a project file as text through the file capability.
    pub fn fetch(&self, path: &str) -> StoryResult<String> {
        match &self.capabilities.files {
            Some(files) => files.read_to_string(path),
            None => Err(StoryError::contract(format!(
                "cannot fetch '{path}': no file access in this run"
            ))),
        }
    }

    pub fn fetch_bytes(&self, path: &str) -> StoryResult<Vec<u8>> {
        match &self.capabilities.files {
            Some(files) => files.read(path),
            None => Err(StoryError::contract(format!(
                "cannot fetch '{path}': no file access in this run"
            ))),
        }
    }

    /// Register a generatable asset and return the path token for it.
    pub fn get_asset(&self, name: &str, descriptor: AssetDescriptor) -> StoryResult<String> {
        match &self.capabilities.assets {
            Some(assets) => assets.register(name, descriptor),
            None => Err(StoryError::contract(format!(
                "cannot register asset '{name}': no asset provider in this run"
            ))),
        }
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        if let Some(logger) = &self.capabilities.logger {
            logger.log(&self.script, level, &message);
        }
        self.logs.push(LogEntry { level, message });
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn into_output(self) -> ScriptOutput {
        ScriptOutput {
            groups: self.groups,
            video: self.video,
            logs: self.logs,
        }
    }
}
