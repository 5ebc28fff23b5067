use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ExtractionSettings, LlmConfig};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub llm: Option<LlmSection>,
    pub extraction: Option<ExtractionSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSection {
    pub merge_threshold: Option<usize>,
    pub transition_margin: Option<usize>,
}

/// Platform config directory path: `<config_dir>/topicsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("topicsift").join("config.toml"))
}

/// Load config by cascading CWD `.topicsift.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".topicsift.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_llm = base.llm.unwrap_or_default();
    let over_llm = overlay.llm.unwrap_or_default();
    let base_ext = base.extraction.unwrap_or_default();
    let over_ext = overlay.extraction.unwrap_or_default();

    ConfigFile {
        llm: Some(LlmSection {
            api_key: over_llm.api_key.or(base_llm.api_key),
            base_url: over_llm.base_url.or(base_llm.base_url),
            model: over_llm.model.or(base_llm.model),
            timeout_secs: over_llm.timeout_secs.or(base_llm.timeout_secs),
        }),
        extraction: Some(ExtractionSection {
            merge_threshold: over_ext.merge_threshold.or(base_ext.merge_threshold),
            transition_margin: over_ext.transition_margin.or(base_ext.transition_margin),
        }),
    }
}

impl ConfigFile {
    /// Resolve the LLM section against built-in defaults.
    pub fn llm_config(&self) -> LlmConfig {
        let defaults = LlmConfig::default();
        let Some(ref llm) = self.llm else {
            return defaults;
        };
        LlmConfig {
            api_key: llm.api_key.clone().or(defaults.api_key),
            base_url: llm.base_url.clone().unwrap_or(defaults.base_url),
            model: llm.model.clone().unwrap_or(defaults.model),
            timeout_secs: llm.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn extraction_settings(&self) -> ExtractionSettings {
        let defaults = ExtractionSettings::default();
        let Some(ref ext) = self.extraction else {
            return defaults;
        };
        ExtractionSettings {
            merge_threshold: ext.merge_threshold.unwrap_or(defaults.merge_threshold),
            transition_margin: ext.transition_margin.unwrap_or(defaults.transition_margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};

    #[test]
    fn model_round_trip_toml() {
        let config = ConfigFile {
            llm: Some(LlmSection {
                model: Some("gpt-4.1-mini".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.llm.unwrap().model.unwrap(), "gpt-4.1-mini");
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let toml_str = "[extraction]\nmerge_threshold = 400\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();

        let settings = parsed.extraction_settings();
        assert_eq!(settings.merge_threshold, 400);
        assert_eq!(
            settings.transition_margin,
            ExtractionSettings::default().transition_margin
        );

        let llm = parsed.llm_config();
        assert_eq!(llm.model, DEFAULT_MODEL);
        assert_eq!(llm.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            llm: Some(LlmSection {
                model: Some("base-model".to_string()),
                base_url: Some("http://base".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            llm: Some(LlmSection {
                model: Some("overlay-model".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let llm = merged.llm.unwrap();
        assert_eq!(llm.model.unwrap(), "overlay-model");
        assert_eq!(llm.base_url.unwrap(), "http://base");
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\ntimeout_secs = 30\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.llm_config().timeout_secs, 30);
    }

    #[test]
    fn load_from_path_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert!(load_from_path(&path).is_none());
    }
}
