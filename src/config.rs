//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dectree/dectree.toml` (or an explicit `--config` file)
//! 3. Local config: `./.dectree.toml` next to the data
//! 4. Environment variables: `DECTREE_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, DEFAULT_TRANSITION_MS};
use crate::application::{LayoutConfig, ViewportConfig};
use crate::domain::{EmptyLeafPolicy, DEFAULT_ROOT_ID};

/// Unified configuration for dectree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// JSON array of node records (default: data.json, `-` for stdin)
    pub data_file: PathBuf,
    /// nodeNumber of the tree root
    pub root_id: i64,
    /// Ratio reported for leaves without observations
    pub empty_leaf: EmptyLeafPolicy,
    /// Transition length handed to the renderer
    pub transition_ms: u64,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data.json"),
            root_id: DEFAULT_ROOT_ID,
            empty_leaf: EmptyLeafPolicy::default(),
            transition_ms: DEFAULT_TRANSITION_MS,
            layout: LayoutConfig::default(),
            viewport: ViewportConfig::default(),
        }
    }
}

/// Raw layout section (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub char_width: Option<f64>,
    pub level_factor: Option<f64>,
    pub sibling_separation: Option<f64>,
    pub subtree_separation: Option<f64>,
    pub pass_bar_width: Option<f64>,
    pub pass_bar_height: Option<f64>,
}

/// Raw viewport section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawViewportConfig {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_scale: Option<f64>,
    pub max_scale: Option<f64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub root_id: Option<i64>,
    pub empty_leaf: Option<EmptyLeafPolicy>,
    pub transition_ms: Option<u64>,
    pub layout: RawLayoutConfig,
    pub viewport: RawViewportConfig,
}

impl RawLayoutConfig {
    fn apply(&self, base: &LayoutConfig) -> LayoutConfig {
        LayoutConfig {
            char_width: self.char_width.unwrap_or(base.char_width),
            level_factor: self.level_factor.unwrap_or(base.level_factor),
            sibling_separation: self.sibling_separation.unwrap_or(base.sibling_separation),
            subtree_separation: self.subtree_separation.unwrap_or(base.subtree_separation),
            pass_bar_width: self.pass_bar_width.unwrap_or(base.pass_bar_width),
            pass_bar_height: self.pass_bar_height.unwrap_or(base.pass_bar_height),
        }
    }
}

impl RawViewportConfig {
    fn apply(&self, base: &ViewportConfig) -> ViewportConfig {
        ViewportConfig {
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            min_scale: self.min_scale.unwrap_or(base.min_scale),
            max_scale: self.max_scale.unwrap_or(base.max_scale),
        }
    }
}

/// Get the XDG config directory for dectree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dectree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dectree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".dectree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in the data path.
    fn expand_paths(&mut self) {
        let raw = self.data_file.to_string_lossy().to_string();
        let expanded = shellexpand::full(&raw)
            .map(|s| s.into_owned())
            .unwrap_or(raw);
        self.data_file = PathBuf::from(expanded);
    }

    /// Overlay values that are set in `raw`.
    fn merge_with(&self, raw: &RawSettings) -> Self {
        Self {
            data_file: raw
                .data_file
                .clone()
                .unwrap_or_else(|| self.data_file.clone()),
            root_id: raw.root_id.unwrap_or(self.root_id),
            empty_leaf: raw.empty_leaf.unwrap_or(self.empty_leaf),
            transition_ms: raw.transition_ms.unwrap_or(self.transition_ms),
            layout: raw.layout.apply(&self.layout),
            viewport: raw.viewport.apply(&self.viewport),
        }
    }

    /// Load settings with layered precedence from the standard locations.
    ///
    /// `config_file` replaces the global config when given and must exist.
    /// The local config is looked up in the current directory.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
        }
        let global = config_file.map(Path::to_path_buf).or_else(global_config_path);
        let cwd = std::env::current_dir().ok();
        Self::load_from(global.as_deref(), cwd.as_deref())
    }

    /// Load settings from an explicit global file and local directory.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `global` file, if it exists
    /// 3. `<local_dir>/.dectree.toml`, if it exists
    /// 4. Environment variables: `DECTREE_*`
    pub fn load_from(global: Option<&Path>, local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(path) = global {
            if path.exists() {
                debug!("global config: {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply DECTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DECTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_int("root_id") {
            settings.root_id = val;
        }
        if let Ok(val) = config.get::<EmptyLeafPolicy>("empty_leaf") {
            settings.empty_leaf = val;
        }
        if let Ok(val) = config.get_int("transition_ms") {
            settings.transition_ms = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("transition_ms must not be negative: {}", val),
            })?;
        }

        let layout = &mut settings.layout;
        for (key, field) in [
            ("layout.char_width", &mut layout.char_width),
            ("layout.level_factor", &mut layout.level_factor),
            ("layout.sibling_separation", &mut layout.sibling_separation),
            ("layout.subtree_separation", &mut layout.subtree_separation),
            ("layout.pass_bar_width", &mut layout.pass_bar_width),
            ("layout.pass_bar_height", &mut layout.pass_bar_height),
        ] {
            if let Ok(val) = config.get_float(key) {
                *field = val;
            }
        }

        let viewport = &mut settings.viewport;
        for (key, field) in [
            ("viewport.width", &mut viewport.width),
            ("viewport.height", &mut viewport.height),
            ("viewport.min_scale", &mut viewport.min_scale),
            ("viewport.max_scale", &mut viewport.max_scale),
        ] {
            if let Ok(val) = config.get_float(key) {
                *field = val;
            }
        }

        Ok(settings)
    }

    /// Reject values the layout cannot work with.
    fn validate(&self) -> Result<(), ApplicationError> {
        let invalid = |message: String| Err(ApplicationError::Config { message });
        let vp = &self.viewport;
        if !(vp.min_scale > 0.0 && vp.min_scale <= vp.max_scale) {
            return invalid(format!(
                "viewport scale range is empty: {}..{}",
                vp.min_scale, vp.max_scale
            ));
        }
        let l = &self.layout;
        if l.char_width <= 0.0 || l.level_factor <= 0.0 {
            return invalid("layout.char_width and layout.level_factor must be positive".into());
        }
        if l.sibling_separation <= 0.0 || l.subtree_separation <= 0.0 {
            return invalid("layout separations must be positive".into());
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# dectree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/dectree/dectree.toml
#   Local:  ./.dectree.toml
#   Env:    DECTREE_* environment variables, e.g. DECTREE_LAYOUT__CHAR_WIDTH=7

# Node records (JSON array), "-" reads stdin
# data_file = "data.json"

# nodeNumber of the root
# root_id = 1

# Leaves with passed + failed == 0: "zero", "not_a_number" or "reject"
# empty_leaf = "zero"

# transition_ms = 750

[layout]
# char_width = 6.0
# level_factor = 4.0
# sibling_separation = 1.0
# subtree_separation = 2.0
# pass_bar_width = 25.0
# pass_bar_height = 5.0

[viewport]
# width = 1280.0
# height = 800.0
# min_scale = 0.1
# max_scale = 3.0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
