use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::midi::PortSelection;
use crate::problem::MAX_INTERVAL;

/// Configuration manager for trainer settings
/// Separates the schema (defaults, valid ranges, descriptions) from the
/// persisted values. Configuration is stored in ~/.intervals/config.json by default
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

/// Trainer settings. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // MIDI settings
    pub midi_input_port: Option<String>,
    pub midi_output_port: Option<String>,
    pub port_exclude_pattern: String,
    pub velocity: u8,

    // Timing settings
    pub note_hold_ms: u64,
    pub note_gap_ms: u64,
    pub settle_delay_ms: u64,
    pub next_problem_delay_ms: u64,

    // Exercise settings
    pub replay_pitch: u8,
    pub root_pitches: Vec<u8>,

    // Storage settings
    pub score_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            midi_input_port: None,
            midi_output_port: None,
            port_exclude_pattern: "through".to_string(),
            velocity: 0x28,

            note_hold_ms: 200,
            note_gap_ms: 100,
            settle_delay_ms: 500,
            next_problem_delay_ms: 1000,

            replay_pitch: 24,
            root_pitches: vec![0x3c, 0x35],

            score_dir: None,
        }
    }
}

impl Settings {
    pub fn timing(&self) -> Timing {
        Timing {
            note_hold: Duration::from_millis(self.note_hold_ms),
            note_gap: Duration::from_millis(self.note_gap_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            next_problem_delay: Duration::from_millis(self.next_problem_delay_ms),
        }
    }

    pub fn input_selection(&self) -> PortSelection {
        PortSelection {
            preferred: self.midi_input_port.clone(),
            exclude: self.port_exclude_pattern.clone(),
        }
    }

    pub fn output_selection(&self) -> PortSelection {
        PortSelection {
            preferred: self.midi_output_port.clone(),
            exclude: self.port_exclude_pattern.clone(),
        }
    }
}

/// Fixed delays used when playing notes and pacing rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// How long each note sounds.
    pub note_hold: Duration,
    /// Silence after each note.
    pub note_gap: Duration,
    /// Pause before a replay or before the feedback cue.
    pub settle_delay: Duration,
    /// Pause between the feedback cue and the next problem.
    pub next_problem_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Settings::default().timing()
    }
}

/// Available configuration options with validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub midi: MidiConfigSchema,
    pub timing: TimingConfigSchema,
    pub exercise: ExerciseConfigSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiConfigSchema {
    pub midi_input_port: ConfigOption<Option<String>>,
    pub midi_output_port: ConfigOption<Option<String>>,
    pub port_exclude_pattern: ConfigOption<String>,
    pub velocity: ConfigOption<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfigSchema {
    pub note_hold_ms: ConfigOption<u64>,
    pub note_gap_ms: ConfigOption<u64>,
    pub settle_delay_ms: ConfigOption<u64>,
    pub next_problem_delay_ms: ConfigOption<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseConfigSchema {
    pub replay_pitch: ConfigOption<u8>,
    pub root_pitches: ConfigOption<Vec<u8>>,
}

/// Configuration option with validation and available choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub description: String,
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    /// If no path is provided, defaults to ~/.intervals/config.json
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(Self::default_path);

        Self {
            config_path,
            settings: Settings::default(),
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".intervals")
            .join("config.json")
    }

    /// Load settings from configuration file
    /// Writes out defaults if the file doesn't exist yet
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Validate version compatibility
        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match application version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        // Ensure config directory exists (if config is in a subdirectory)
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: now.clone(),
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get configuration schema with available options
    pub fn schema() -> ConfigSchema {
        let defaults = Settings::default();

        ConfigSchema {
            midi: MidiConfigSchema {
                midi_input_port: ConfigOption {
                    default: None,
                    valid_range: None,
                    description: "Substring of the MIDI input port name to listen on".to_string(),
                },
                midi_output_port: ConfigOption {
                    default: None,
                    valid_range: None,
                    description: "Substring of the MIDI output port name to play on".to_string(),
                },
                port_exclude_pattern: ConfigOption {
                    default: defaults.port_exclude_pattern,
                    valid_range: None,
                    description: "Ports whose name contains this text are skipped during automatic selection"
                        .to_string(),
                },
                velocity: ConfigOption {
                    default: defaults.velocity,
                    valid_range: Some((1, 127)),
                    description: "Velocity of played notes".to_string(),
                },
            },
            timing: TimingConfigSchema {
                note_hold_ms: ConfigOption {
                    default: defaults.note_hold_ms,
                    valid_range: Some((10, 5000)),
                    description: "How long each played note sounds, in milliseconds".to_string(),
                },
                note_gap_ms: ConfigOption {
                    default: defaults.note_gap_ms,
                    valid_range: Some((0, 5000)),
                    description: "Silence after each played note, in milliseconds".to_string(),
                },
                settle_delay_ms: ConfigOption {
                    default: defaults.settle_delay_ms,
                    valid_range: Some((0, 10000)),
                    description: "Pause before a replay or the feedback cue, in milliseconds"
                        .to_string(),
                },
                next_problem_delay_ms: ConfigOption {
                    default: defaults.next_problem_delay_ms,
                    valid_range: Some((0, 10000)),
                    description: "Pause between the feedback cue and the next problem, in milliseconds"
                        .to_string(),
                },
            },
            exercise: ExerciseConfigSchema {
                replay_pitch: ConfigOption {
                    default: defaults.replay_pitch,
                    valid_range: Some((0, 127)),
                    description: "Pitch that requests a replay instead of counting as an answer"
                        .to_string(),
                },
                root_pitches: ConfigOption {
                    default: defaults.root_pitches,
                    valid_range: None,
                    description: "Lower notes intervals are built on".to_string(),
                },
            },
        }
    }

    /// Validate settings against schema
    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        // Validate MIDI settings
        if let Some((min, max)) = schema.midi.velocity.valid_range {
            if settings.velocity < min || settings.velocity > max {
                errors.push(format!("velocity must be between {} and {}", min, max));
            }
        }

        // Validate timing settings
        let timings = [
            ("note_hold_ms", settings.note_hold_ms, &schema.timing.note_hold_ms),
            ("note_gap_ms", settings.note_gap_ms, &schema.timing.note_gap_ms),
            (
                "settle_delay_ms",
                settings.settle_delay_ms,
                &schema.timing.settle_delay_ms,
            ),
            (
                "next_problem_delay_ms",
                settings.next_problem_delay_ms,
                &schema.timing.next_problem_delay_ms,
            ),
        ];
        for (name, value, option) in timings {
            if let Some((min, max)) = option.valid_range {
                if value < min || value > max {
                    errors.push(format!("{} must be between {} and {}", name, min, max));
                }
            }
        }

        // Validate exercise settings
        if let Some((min, max)) = schema.exercise.replay_pitch.valid_range {
            if settings.replay_pitch < min || settings.replay_pitch > max {
                errors.push(format!("replay_pitch must be between {} and {}", min, max));
            }
        }

        if settings.root_pitches.is_empty() {
            errors.push("root_pitches must not be empty".to_string());
        }
        for root in &settings.root_pitches {
            if *root as u16 + MAX_INTERVAL as u16 > 127 {
                errors.push(format!(
                    "root pitch {} leaves no room for an octave above it",
                    root
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
    #[error("Config validation errors: {}", .0.join(", "))]
    ValidationError(Vec<String>),
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_config_manager_new() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.json");

        let manager = ConfigManager::new(Some(config_path.clone()));
        assert_eq!(manager.config_path(), config_path);
        assert_eq!(manager.settings, Settings::default());
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sub").join("config.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));
        let settings = manager.load().unwrap();
        assert_eq!(settings, Settings::default());
        assert!(config_path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));

        let mut settings = Settings::default();
        settings.note_hold_ms = 350;
        settings.midi_output_port = Some("Synth".to_string());

        manager.settings = settings;
        manager.save().unwrap();

        let mut manager2 = ConfigManager::new(Some(config_path));
        let loaded_settings = manager2.load().unwrap();

        assert_eq!(loaded_settings.note_hold_ms, 350);
        assert_eq!(loaded_settings.midi_output_port.as_deref(), Some("Synth"));
        assert_eq!(loaded_settings.timing().note_hold, Duration::from_millis(350));
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.json");
        fs::write(
            &config_path,
            r#"{"version":"0.0.0","settings":{"velocity":100},"created_at":"","modified_at":""}"#,
        )
        .unwrap();

        let mut manager = ConfigManager::new(Some(config_path));
        let settings = manager.load().unwrap();
        assert_eq!(settings.velocity, 100);
        assert_eq!(settings.replay_pitch, 24);
        assert_eq!(settings.root_pitches, vec![0x3c, 0x35]);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.json");
        fs::write(&config_path, "{ not json").unwrap();

        let mut manager = ConfigManager::new(Some(config_path));
        assert!(matches!(manager.load(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();

        // Valid settings should pass
        assert!(ConfigManager::validate_settings(&settings).is_ok());

        settings.velocity = 0;
        assert!(ConfigManager::validate_settings(&settings).is_err());

        settings.velocity = 40;
        settings.note_hold_ms = 1;
        assert!(ConfigManager::validate_settings(&settings).is_err());

        settings.note_hold_ms = 200;
        settings.root_pitches = vec![];
        assert!(ConfigManager::validate_settings(&settings).is_err());

        settings.root_pitches = vec![60, 120];
        let errors = ConfigManager::validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("120"));
    }

    #[test]
    fn test_default_timing() {
        let timing = Timing::default();
        assert_eq!(timing.note_hold, Duration::from_millis(200));
        assert_eq!(timing.note_gap, Duration::from_millis(100));
        assert_eq!(timing.settle_delay, Duration::from_millis(500));
        assert_eq!(timing.next_problem_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_port_selection_from_settings() {
        let mut settings = Settings::default();
        settings.midi_input_port = Some("Keys".to_string());
        let selection = settings.input_selection();
        assert_eq!(selection.preferred.as_deref(), Some("Keys"));
        assert_eq!(selection.exclude, "through");
        assert_eq!(settings.output_selection().preferred, None);
    }
}
