use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a YAML config file
pub const CONFIG_ENV: &str = "PIXFISH_CONFIG";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pixels per chunk when a fish runs through scratch buffers
    pub chunk_size: usize,

    /// Name of the type decomposed paths convert through
    pub reference_type: String,

    /// Log a warning on every name lookup
    pub warn_on_name_lookups: bool,

    /// Install the built-in types, models and formats on first init
    pub base_set: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            reference_type: "double".to_string(),
            warn_on_name_lookups: false,
            base_set: false,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config.sanitized())
    }

    /// Load configuration from `path`, or from `PIXFISH_CONFIG` when no path
    /// is given. Unreadable or invalid files fall back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let from_env = std::env::var_os(CONFIG_ENV).map(std::path::PathBuf::from);
        let Some(path) = path.or(from_env.as_deref()) else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        chunk_size = config.chunk_size,
                        reference_type = %config.reference_type,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if self.chunk_size == 0 {
            tracing::warn!("chunk_size must be positive, using 1");
            self.chunk_size = 1;
        }
        self
    }
}
