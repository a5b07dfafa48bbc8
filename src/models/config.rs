use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Which rendering backends may be used
    #[serde(default)]
    pub backends: BackendAvailability,

    /// Rendering options shared by both backends
    #[serde(default)]
    pub render: RenderOptions,

    /// Directory with extra font files (*.ttf, *.otf, *.ttc)
    #[serde(default)]
    pub fonts_dir: Option<PathBuf>,

    /// Load system fonts as fallback
    #[serde(default = "default_true")]
    pub system_fonts: bool,
}

/// Which rendering backends are present. Computed once at startup and handed
/// to the converter; nothing reads it from global state.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BackendAvailability {
    #[serde(default = "default_true")]
    pub primary: bool,

    #[serde(default = "default_true")]
    pub secondary: bool,
}

impl BackendAvailability {
    pub const ALL: Self = Self {
        primary: true,
        secondary: true,
    };

    pub const NONE: Self = Self {
        primary: false,
        secondary: false,
    };

    pub fn any(&self) -> bool {
        self.primary || self.secondary
    }
}

impl Default for BackendAvailability {
    fn default() -> Self {
        Self::ALL
    }
}

/// Rasterization options
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Output size multiplier relative to the SVG's intrinsic size
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Resolution used to resolve physical units (mm, in, pt)
    #[serde(default = "default_dpi")]
    pub dpi: f32,
}

fn default_scale() -> f32 {
    1.0
}

fn default_dpi() -> f32 {
    96.0
}

fn default_true() -> bool {
    true
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            dpi: default_dpi(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backends: BackendAvailability::default(),
            render: RenderOptions::default(),
            fonts_dir: None,
            system_fonts: true,
        }
    }
}

impl AppConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load configuration from a file, falling back to defaults when the file
    /// is missing or invalid
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        primary = config.backends.primary,
                        secondary = config.backends.secondary,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }
}
