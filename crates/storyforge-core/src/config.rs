use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::math::MAX_DECIMALS;
use crate::types::ExportTarget;
use crate::StoryResult;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Directory scanned for script files, relative to the project root.
    pub scripts: String,
    /// Mapset directory receiving the storyboard and generated assets.
    pub output: String,
    /// File name of the written storyboard.
    pub osb: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "storyboard".to_string(),
            scripts: "scripts".to_string(),
            output: "mapset".to_string(),
            osb: "storyboard.osb".to_string(),
        }
    }
}

/// Numeric knobs applied by the generation steps.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Decimal places kept for positions and move commands.
    pub move_precision: u32,
    /// Decimal places kept for scale and vector-scale commands.
    pub scale_precision: u32,
    /// Decimal places kept for fade commands.
    pub alpha_precision: u32,
    /// Decimal places kept for rotation commands.
    pub rotation_precision: u32,
    /// Shift 4:3-authored X coordinates onto a widescreen canvas.
    pub widescreen: bool,
    pub widescreen_width: f64,
    pub standard_width: f64,
    /// Only export groups targeting this output (all groups when unset).
    pub target: Option<ExportTarget>,
    /// Keep elements of groups marked hidden.
    pub include_hidden: bool,
}

impl ExportSettings {
    /// Cap every precision at [`MAX_DECIMALS`].
    pub fn clamp_precision(&mut self) {
        for precision in [
            &mut self.move_precision,
            &mut self.scale_precision,
            &mut self.alpha_precision,
            &mut self.rotation_precision,
        ] {
            *precision = (*precision).min(MAX_DECIMALS);
        }
    }

    /// Horizontal offset added to X coordinates when widescreen is enabled.
    pub fn widescreen_offset(&self) -> f64 {
        (self.widescreen_width - self.standard_width) / 2.0
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            move_precision: 4,
            scale_precision: 4,
            alpha_precision: 4,
            rotation_precision: 5,
            widescreen: false,
            widescreen_width: 854.0,
            standard_width: 640.0,
            target: None,
            include_hidden: false,
        }
    }
}

/// Persisted per-group settings, owned by the project rather than the scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupSettings {
    pub visible: bool,
    pub export_target: ExportTarget,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            visible: true,
            export_target: ExportTarget::Storyboard,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GroupsConfig {
    /// Explicit group ordering; unlisted groups sort before listed ones.
    pub order: Vec<String>,
    pub settings: HashMap<String, GroupSettings>,
}

impl GroupsConfig {
    pub fn settings_for(&self, name: &str) -> GroupSettings {
        self.settings.get(name).copied().unwrap_or_default()
    }
}

/// A scalar variable value injected into a script.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl VariableValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            VariableValue::Int(v) => Some(*v as f64),
            VariableValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariableValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariableValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StoryforgeConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub groups: GroupsConfig,
    /// Per-script variable overrides, keyed by script name.
    #[serde(default)]
    pub variables: HashMap<String, BTreeMap<String, VariableValue>>,
}

impl StoryforgeConfig {
    pub fn load_from_file(path: &Path) -> StoryResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: StoryforgeConfig = toml::from_str(&contents)?;
        config.export.clamp_precision();
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> StoryResult<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoryforgeConfig::default();
        assert_eq!(config.export.move_precision, 4);
        assert!(!config.export.widescreen);
        assert!((config.export.widescreen_offset() - 107.0).abs() < 1e-9);
        assert!(config.groups.settings_for("anything").visible);
    }

    #[test]
    fn test_loaded_precision_is_capped() {
        let path = std::env::temp_dir().join(format!("storyforge_precision_{}.toml", std::process::id()));
        std::fs::write(&path, "[export]\nmove_precision = 400\nalpha_precision = 2\n").unwrap();
        let config = StoryforgeConfig::load_from_file(&path).unwrap();
        assert_eq!(config.export.move_precision, MAX_DECIMALS);
        assert_eq!(config.export.alpha_precision, 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_parse_full_config() {
        let src = r#"
            [project]
            name = "Night Drive"
            scripts = "scripts"
            output = "out"
            osb = "night.osb"

            [export]
            move_precision = 2
            widescreen = true
            target = "difficulty"

            [groups]
            order = ["Background", "Lyrics"]

            [groups.settings.Lyrics]
            visible = false

            [variables.lyrics]
            speed = 1.5
            label = "chorus"
            repeat = 3
        "#;
        let config: StoryforgeConfig = toml::from_str(src).unwrap();
        assert_eq!(config.project.osb, "night.osb");
        assert_eq!(config.export.move_precision, 2);
        assert_eq!(config.export.scale_precision, 4);
        assert_eq!(config.export.target, Some(ExportTarget::Difficulty));
        assert_eq!(config.groups.order, vec!["Background", "Lyrics"]);
        let lyrics = config.groups.settings_for("Lyrics");
        assert!(!lyrics.visible);
        assert_eq!(lyrics.export_target, ExportTarget::Storyboard);

        let vars = &config.variables["lyrics"];
        assert_eq!(vars["speed"], VariableValue::Float(1.5));
        assert_eq!(vars["repeat"], VariableValue::Int(3));
        assert_eq!(vars["label"].as_str(), Some("chorus"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let root = std::env::temp_dir().join(format!("storyforge_config_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        let path = root.join("storyforge.toml");

        let mut config = StoryforgeConfig::default();
        config.project.name = "Roundtrip".into();
        config.groups.order.push("Intro".into());
        config.save_to_file(&path).unwrap();

        let loaded = StoryforgeConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.project.name, "Roundtrip");
        assert_eq!(loaded.groups.order, vec!["Intro"]);

        let _ = std::fs::remove_dir_all(&root);
    }
}
