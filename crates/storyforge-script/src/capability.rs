//! Capabilities injected into every script execution.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use storyforge_core::{LogLevel, StoryError, StoryResult};

use crate::asset::AssetProvider;
use crate::beatmap::{Beatmap, Waveform};

/// Read access to project files.
pub trait FileProvider: Send + Sync {
    fn read(&self, path: &str) -> StoryResult<Vec<u8>>;

    fn read_to_string(&self, path: &str) -> StoryResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes)
            .map_err(|e| StoryError::InvalidArgument(format!("'{path}' is not UTF-8: {e}")))
    }
}

/// Receives `log` calls made by scripts.
pub trait ScriptLogger: Send + Sync {
    fn log(&self, script: &str, level: LogLevel, message: &str);
}

/// One message a script logged, kept on its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Forwards script logs to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl ScriptLogger for TracingLogger {
    fn log(&self, script: &str, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(script = %script, "{message}"),
            LogLevel::Info => tracing::info!(script = %script, "{message}"),
            LogLevel::Warning => tracing::warn!(script = %script, "{message}"),
            LogLevel::Error => tracing::error!(script = %script, "{message}"),
        }
    }
}

/// Serves files from below a project root.
#[derive(Debug, Clone)]
pub struct ProjectFiles {
    root: PathBuf,
}

impl ProjectFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Normalize a script-supplied relative path, refusing anything that
/// escapes the root.
pub fn normalize_rel_path(path: &str) -> StoryResult<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(StoryError::InvalidArgument(format!(
                        "path '{path}' escapes the project directory"
                    )));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StoryError::InvalidArgument(format!(
                    "path '{path}' must be relative"
                )));
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(StoryError::InvalidArgument("empty path".to_string()));
    }
    Ok(normalized)
}

impl FileProvider for ProjectFiles {
    fn read(&self, path: &str) -> StoryResult<Vec<u8>> {
        let relative = normalize_rel_path(path)?;
        let full = self.root.join(relative);
        std::fs::read(&full).map_err(|e| StoryError::asset(e.to_string(), full))
    }
}

/// Everything a script may use besides its groups. Every capability is optional.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub assets: Option<Arc<dyn AssetProvider>>,
    pub files: Option<Arc<dyn FileProvider>>,
    pub logger: Option<Arc<dyn ScriptLogger>>,
    pub beatmap: Option<Arc<Beatmap>>,
    pub waveform: Option<Arc<dyn Waveform>>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(mut self, assets: Arc<dyn AssetProvider>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_files(mut self, files: Arc<dyn FileProvider>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ScriptLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_beatmap(mut self, beatmap: Arc<Beatmap>) -> Self {
        self.beatmap = Some(beatmap);
        self
    }

    pub fn with_waveform(mut self, waveform: Arc<dyn Waveform>) -> Self {
        self.waveform = Some(waveform);
        self
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("assets", &self.assets.is_some())
            .field("files", &self.files.is_some())
            .field("logger", &self.logger.is_some())
            .field("beatmap", &self.beatmap.is_some())
            .field("waveform", &self.waveform.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rel_path() {
        assert_eq!(normalize_rel_path("sb/./a.png").unwrap(), PathBuf::from("sb/a.png"));
        assert_eq!(normalize_rel_path("sb/x/../a.png").unwrap(), PathBuf::from("sb/a.png"));
        assert!(normalize_rel_path("../secret").is_err());
        assert!(normalize_rel_path("/etc/passwd").is_err());
        assert!(normalize_rel_path("").is_err());
    }

    #[test]
    fn test_project_files_reads_below_root() {
        let dir = std::env::temp_dir().join(format!("storyforge_files_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("data")).unwrap();
        std::fs::write(dir.join("data/lyrics.txt"), "hello").unwrap();

        let files = ProjectFiles::new(&dir);
        assert_eq!(files.read_to_string("data/lyrics.txt").unwrap(), "hello");
        assert!(files.read("data/missing.txt").is_err());
        assert!(files.read("../outside.txt").is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
