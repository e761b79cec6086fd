/// Console configuration
use crate::error::{ConsoleError, Result};
use encore_core::TrackRef;
use encore_playback::{PlaybackConfig, DEFAULT_HISTORY_SIZE, MAX_VOLUME};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "encore.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_backend")]
    pub backend: BackendSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Multiplier on track length; 0.01 plays a 3 minute track in ~2 seconds
    #[serde(default = "default_speed")]
    pub speed: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_tracks")]
    pub tracks: Vec<CatalogEntry>,
}

/// One searchable track
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub title: String,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    #[serde(default)]
    pub artwork: Option<String>,
}

impl CatalogEntry {
    pub fn to_track(&self) -> TrackRef {
        let mut track = TrackRef::new(self.title.clone(), self.duration_secs * 1000);
        track.author.clone_from(&self.author);
        track.artwork.clone_from(&self.artwork);
        track
    }
}

impl ConsoleConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConsoleError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (ENCORE_PLAYBACK__VOLUME_STEP=50)
        settings = settings.add_source(
            config::Environment::with_prefix("ENCORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: ConsoleConfig = settings.build()?.try_deserialize()?;
        if config.catalog.tracks.is_empty() {
            config.catalog.tracks = default_tracks();
        }
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;

        if playback.volume_step == 0 {
            return Err(ConsoleError::Config(
                "playback.volume_step must be greater than 0".to_string(),
            ));
        }

        if playback.history_size == 0 {
            return Err(ConsoleError::Config(
                "playback.history_size must be greater than 0".to_string(),
            ));
        }

        if playback.history_size > DEFAULT_HISTORY_SIZE {
            return Err(ConsoleError::Config(format!(
                "playback.history_size ({}) exceeds {}",
                playback.history_size, DEFAULT_HISTORY_SIZE
            )));
        }

        if playback.max_volume > MAX_VOLUME {
            return Err(ConsoleError::Config(format!(
                "playback.max_volume ({}) exceeds {}",
                playback.max_volume, MAX_VOLUME
            )));
        }

        if playback.default_volume > playback.max_volume {
            return Err(ConsoleError::Config(format!(
                "playback.default_volume ({}) exceeds max_volume ({})",
                playback.default_volume, playback.max_volume
            )));
        }

        if self.backend.speed.is_nan() || self.backend.speed <= 0.0 {
            return Err(ConsoleError::Config(format!(
                "backend.speed must be positive, got {}",
                self.backend.speed
            )));
        }

        Ok(())
    }
}

// Default values
fn default_backend() -> BackendSettings {
    BackendSettings {
        speed: default_speed(),
    }
}

fn default_speed() -> f64 {
    1.0
}

fn default_duration_secs() -> u64 {
    180
}

fn default_tracks() -> Vec<CatalogEntry> {
    [
        ("Around the World", "Daft Punk", 429),
        ("Blue Monday", "New Order", 448),
        ("Midnight City", "M83", 243),
        ("Teardrop", "Massive Attack", 330),
        ("Windowlicker", "Aphex Twin", 367),
    ]
    .into_iter()
    .map(|(title, author, duration_secs)| CatalogEntry {
        title: title.to_string(),
        author: Some(author.to_string()),
        duration_secs,
        artwork: None,
    })
    .collect()
}

impl Default for BackendSettings {
    fn default() -> Self {
        default_backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_file_with_defaults_for_missing_fields() {
        let file = write_config(
            r#"
[playback]
volume_step = 50

[backend]
speed = 0.01

[[catalog.tracks]]
title = "Intro"
duration_secs = 90
"#,
        );

        let config = ConsoleConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.playback.volume_step, 50);
        assert_eq!(config.playback.history_size, 10);
        assert_eq!(config.playback.default_volume, 1000);
        assert!((config.backend.speed - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.catalog.tracks.len(), 1);
        assert_eq!(config.catalog.tracks[0].author, None);
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            ConsoleConfig::load(Some(&path)),
            Err(ConsoleError::Config(_))
        ));
    }

    #[test]
    fn test_empty_catalog_falls_back_to_builtin_tracks() {
        let file = write_config("[playback]\nhistory_size = 5\n");
        let config = ConsoleConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.playback.history_size, 5);
        assert_eq!(config.catalog.tracks, default_tracks());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ConsoleConfig::default();
        config.validate().unwrap();

        let mut bad = config.clone();
        bad.playback.volume_step = 0;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.playback.history_size = 0;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.playback.default_volume = 1200;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.playback.history_size = 50;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.playback.max_volume = 5000;
        bad.playback.default_volume = 4000;
        assert!(bad.validate().is_err());

        let mut bad = config;
        bad.backend.speed = 0.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_catalog_entry_to_track() {
        let entry = CatalogEntry {
            title: "Teardrop".to_string(),
            author: Some("Massive Attack".to_string()),
            duration_secs: 330,
            artwork: None,
        };
        let track = entry.to_track();
        assert_eq!(track.title, "Teardrop");
        assert_eq!(track.duration_ms, 330_000);
        assert_eq!(track.author.as_deref(), Some("Massive Attack"));
    }
}
