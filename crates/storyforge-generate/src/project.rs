use std::path::{Path, PathBuf};
use std::sync::Arc;

use storyforge_core::{CancellationToken, StoryError, StoryResult, StoryforgeConfig};
use storyforge_encode::{OsbEncoder, StoryboardEncoder};
use storyforge_script::{
    AssetRegistry, Beatmap, Capabilities, ProjectFiles, RunOptions, ScriptManager, TracingLogger,
    VariableRegistry,
};

use crate::generator::{GenerationResult, Generator};

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "storyforge.toml";

/// A storyboard project directory: `storyforge.toml`, a scripts directory
/// and a mapset output directory.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: StoryforgeConfig,
    beatmap: Option<Arc<Beatmap>>,
    variables: VariableRegistry,
}

impl Project {
    /// Open `root`, reading `storyforge.toml` when present.
    pub fn open(root: impl Into<PathBuf>) -> StoryResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoryError::Config(format!(
                "project directory {} does not exist",
                root.display()
            )));
        }
        let config_path = root.join(CONFIG_FILE_NAME);
        let config = if config_path.is_file() {
            StoryforgeConfig::load_from_file(&config_path)?
        } else {
            tracing::debug!(root = %root.display(), "no {CONFIG_FILE_NAME}, using defaults");
            StoryforgeConfig::default()
        };
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: impl Into<PathBuf>, config: StoryforgeConfig) -> Self {
        Self {
            root: root.into(),
            config,
            beatmap: None,
            variables: VariableRegistry::new(),
        }
    }

    /// Beatmap timing exposed to scripts.
    pub fn with_beatmap(mut self, beatmap: Beatmap) -> Self {
        self.beatmap = Some(Arc::new(beatmap));
        self
    }

    /// Values and functions shared by every script, below per-script overrides.
    pub fn with_variables(mut self, variables: VariableRegistry) -> Self {
        self.variables = variables;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &StoryforgeConfig {
        &self.config
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(&self.config.project.scripts)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.project.output)
    }

    pub fn osb_path(&self) -> PathBuf {
        self.output_dir().join(&self.config.project.osb)
    }

    pub fn load_scripts(&self) -> StoryResult<ScriptManager> {
        let dir = self.scripts_dir();
        if !dir.is_dir() {
            return Err(StoryError::Config(format!(
                "scripts directory {} does not exist",
                dir.display()
            )));
        }
        ScriptManager::discover(&dir)
    }

    /// Options for one run: project file access, a fresh asset registry,
    /// tracing-backed script logs and the configured variable overrides.
    pub fn run_options(&self, assets: Arc<AssetRegistry>, cancel: CancellationToken) -> RunOptions {
        let mut capabilities = Capabilities::new()
            .with_files(Arc::new(ProjectFiles::new(self.root.clone())))
            .with_assets(assets)
            .with_logger(Arc::new(TracingLogger));
        if let Some(beatmap) = &self.beatmap {
            capabilities = capabilities.with_beatmap(beatmap.clone());
        }
        RunOptions {
            capabilities,
            variables: self.variables.clone(),
            overrides: self.config.variables.clone(),
            cancel,
        }
    }

    /// Generate with any encoder.
    pub fn generate<E: StoryboardEncoder>(
        &self,
        encoder: &E,
        cancel: CancellationToken,
    ) -> StoryResult<GenerationResult<E::Output>> {
        let scripts = self.load_scripts()?;
        let assets = Arc::new(AssetRegistry::new());
        let options = self.run_options(assets.clone(), cancel);
        let generator = Generator::from_config(&self.config, assets, &self.output_dir());
        generator.generate(&scripts, &options, encoder)
    }

    /// Generate the storyboard text and write it to [`Project::osb_path`].
    pub fn write_storyboard(&self, cancel: CancellationToken) -> StoryResult<GenerationResult<String>> {
        let result = self.generate(&OsbEncoder::new(), cancel)?;
        OsbEncoder::write_text(&result.output, &self.osb_path())?;
        Ok(result)
    }
}
