//! User configuration (YAML) and color schemes (JSON).
//!
//! Both live under `<config_dir>/docktop/`. Every config field is optional;
//! command line flags are merged on top by the binary.

use std::{
    fs,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    layout::{Layout, DEFAULT_LAYOUT},
};

pub const APP_NAME: &str = "docktop";
pub const CONFIG_FILE: &str = "docktop.yaml";
pub const DEFAULT_SCHEME: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub update_interval_ms: u64,
    pub graph_horizontal_scale: u16,
    pub colorscheme: String,
    /// Inline layout text; takes precedence over `layout_file`.
    pub layout: Option<String>,
    pub layout_file: Option<PathBuf>,
    pub max_containers: usize,
    pub docker_binary: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_interval_ms: 1000,
            graph_horizontal_scale: 5,
            colorscheme: DEFAULT_SCHEME.to_string(),
            layout: None,
            layout_file: None,
            max_containers: 5,
            docker_binary: "docker".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// `<config_dir>/docktop`, if the platform has a config directory.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|d| d.join(CONFIG_FILE))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document is a valid, all-default config.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads `explicit` if given (it must exist), else the default path when
    /// present, else the built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.max(1))
    }

    /// Resolves the layout: inline text, then `layout_file`, then the default.
    pub fn load_layout(&self) -> Result<Layout> {
        if let Some(text) = &self.layout {
            return Ok(Layout::parse(text));
        }
        if let Some(path) = &self.layout_file {
            let file = fs::File::open(path)?;
            return Layout::from_reader(BufReader::new(file));
        }
        Ok(Layout::parse(DEFAULT_LAYOUT))
    }
}

/// Colors are 256-color indices; negative means the terminal default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub name: String,
    pub fg: i16,
    pub bg: i16,
    pub border_fg: i16,
    pub border_bg: i16,
    /// Palette cycled over graph series.
    pub series_colors: Vec<u8>,
    pub label_bold: bool,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            name: DEFAULT_SCHEME.to_string(),
            fg: 7,
            bg: -1,
            border_fg: 6,
            border_bg: -1,
            series_colors: vec![1, 2, 3, 4, 5, 6, 9, 10, 11, 12, 13, 14],
            label_bold: true,
        }
    }
}

/// Finds a color scheme by name. `"default"` is built in, anything else is
/// read from `<config_dir>/docktop/<name>.json`.
pub fn lookup_color_scheme(name: &str) -> Result<ColorScheme> {
    let dirs: Vec<PathBuf> = config_dir().into_iter().collect();
    lookup_color_scheme_in(name, &dirs)
}

pub fn lookup_color_scheme_in(name: &str, dirs: &[PathBuf]) -> Result<ColorScheme> {
    if name == DEFAULT_SCHEME {
        return Ok(ColorScheme::default());
    }

    let file_name = format!("{name}.json");
    let searched: Vec<PathBuf> = dirs.iter().map(|d| d.join(&file_name)).collect();
    let Some(path) = searched.iter().find(|p| p.is_file()) else {
        return Err(Error::ColorScheme {
            name: name.to_string(),
            searched,
        });
    };

    let mut scheme: ColorScheme = serde_json::from_str(&fs::read_to_string(path)?)?;
    if scheme.name.is_empty() {
        scheme.name = name.to_string();
    }
    debug!(path = %path.display(), "loaded colorscheme");
    Ok(scheme)
}
