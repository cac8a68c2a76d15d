//! Rune configuration system
//!
//! This crate provides centralized configuration management for the rune
//! engine, loading settings from `rune.toml` with environment variable
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RuneConfig {
    /// Frame loop and runtime settings
    pub engine: EngineConfig,
    /// Save-game settings
    pub save: SaveConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Frame loop and runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Target frames per second of the frame loop
    pub frame_rate: u32,
    /// Finish every animation on the frame it starts
    pub skip_animations: bool,
    /// Default scene transition length in frames
    pub transition_duration: u32,
    /// Pixels scrolled per mouse-wheel unit
    pub scroll_speed: f32,
    /// Stop a headless run after this many frames
    pub max_frames: Option<u64>,
}

/// Save-game configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SaveConfig {
    /// Directory holding save slots (defaults to ~/.rune/saves)
    pub directory: Option<PathBuf>,
    /// Slot written by the quick-save at shutdown
    pub slot: u32,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger filter string, e.g. "info,rune_scene=debug"
    pub filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            skip_animations: false,
            transition_duration: 30,
            scroll_speed: 1.0,
            max_frames: None,
        }
    }
}

fn env_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl RuneConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the rune.toml configuration file
    ///
    /// # Returns
    /// * `Ok(RuneConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        // Engine settings
        if let Ok(val) = std::env::var("RUNE_FRAME_RATE")
            && let Ok(rate) = val.parse::<u32>()
        {
            self.engine.frame_rate = rate;
        }
        if let Ok(val) = std::env::var("RUNE_SKIP_ANIMATIONS") {
            self.engine.skip_animations = env_flag(&val);
        }
        if let Ok(val) = std::env::var("RUNE_TRANSITION_DURATION")
            && let Ok(frames) = val.parse::<u32>()
        {
            self.engine.transition_duration = frames;
        }
        if let Ok(val) = std::env::var("RUNE_SCROLL_SPEED")
            && let Ok(speed) = val.parse::<f32>()
        {
            self.engine.scroll_speed = speed;
        }
        if let Ok(val) = std::env::var("RUNE_MAX_FRAMES")
            && let Ok(frames) = val.parse::<u64>()
        {
            self.engine.max_frames = Some(frames);
        }

        // Save settings
        if let Ok(dir) = std::env::var("RUNE_SAVE_DIR") {
            self.save.directory = Some(PathBuf::from(dir));
        }

        // Logging
        if let Ok(filter) = std::env::var("RUNE_LOG") {
            self.logging.filter = Some(filter);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuneConfig::default();
        assert_eq!(config.engine.frame_rate, 60);
        assert_eq!(config.engine.transition_duration, 30);
        assert!(!config.engine.skip_animations);
        assert_eq!(config.save.slot, 0);
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = RuneConfig::default();
        config.engine.max_frames = Some(120);
        config.save.directory = Some(PathBuf::from("saves"));
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RuneConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: RuneConfig = toml::from_str("[engine]\nskip_animations = true\n").unwrap();
        assert!(parsed.engine.skip_animations);
        assert_eq!(parsed.engine.frame_rate, 60);
        assert_eq!(parsed.logging.filter, None);
    }

    #[test]
    fn test_load_from_missing_file_is_an_error() {
        assert!(RuneConfig::load_from_file("definitely/not/here/rune.toml").is_err());
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("RUNE_SKIP_ANIMATIONS", "true");
            std::env::set_var("RUNE_TRANSITION_DURATION", "12");
            std::env::set_var("RUNE_SCROLL_SPEED", "not-a-number");
        }

        let mut config = RuneConfig::default();
        config.merge_with_env();

        assert!(config.engine.skip_animations);
        assert_eq!(config.engine.transition_duration, 12);
        assert_eq!(config.engine.scroll_speed, 1.0);

        unsafe {
            std::env::remove_var("RUNE_SKIP_ANIMATIONS");
            std::env::remove_var("RUNE_TRANSITION_DURATION");
            std::env::remove_var("RUNE_SCROLL_SPEED");
        }
    }
}
