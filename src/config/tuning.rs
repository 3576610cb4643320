use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shortest beat interval the clock will run at, in seconds.
const MIN_BEAT_INTERVAL: f32 = 0.05;
/// Finest radius-circle resolution accepted.
const MIN_RADIUS_DRAW_SCALE: f32 = 0.001;

/// All tunable game parameters, loaded from tuning.ron.
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Length of the aim vector and full size of the radius circle (world units).
    pub max_radius: f32,
    /// Seconds for a radius fade in or out.
    pub radius_fade_duration: f32,
    /// Angular step of the radius circle as a fraction of a full turn. Lower = more vertices.
    pub radius_draw_scale: f32,
    pub beats_per_minute: f32,
    pub pixels_per_unit: f32,
    pub anchor_draw_radius: f32,
    pub handle_draw_radius: f32,
    /// Seconds for the connecting segment to fill or empty.
    pub segment_fill_duration: f32,
    /// Stick magnitude above which the gamepad takes over aiming.
    pub stick_deadzone: f32,
    /// Asset path of the sound played on every anchor spawn.
    pub kick_sound: String,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_radius: 10.0,
            radius_fade_duration: 1.0,
            radius_draw_scale: 0.01,
            beats_per_minute: 100.0,
            pixels_per_unit: 20.0,
            anchor_draw_radius: 0.35,
            handle_draw_radius: 0.3,
            segment_fill_duration: 0.15,
            stick_deadzone: 0.2,
            kick_sound: "sounds/kick.ogg".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize tuning: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to write tuning to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Tuning {
    /// Get the data directory for tuning files.
    pub fn data_dir() -> PathBuf {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("beat_swing")
    }

    /// Path to the tuning file.
    pub fn file_path() -> PathBuf {
        Self::data_dir().join("tuning.ron")
    }

    /// Seconds between two beats.
    pub fn beat_interval(&self) -> f32 {
        if self.beats_per_minute.is_finite() && self.beats_per_minute > 0.0 {
            (60.0 / self.beats_per_minute).max(MIN_BEAT_INTERVAL)
        } else {
            MIN_BEAT_INTERVAL
        }
    }

    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TuningError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| TuningError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), TuningError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let pretty = ron::ser::PrettyConfig::default();
        let s = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, s).map_err(|source| TuningError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from file, or create default if not found.
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&Self::file_path())
    }

    /// A file that fails to parse is left untouched so the typo can be fixed.
    pub fn load_or_default_from(path: &Path) -> Self {
        if path.exists() {
            match Self::load(path) {
                Ok(tuning) => return tuning,
                Err(e @ TuningError::Parse { .. }) => {
                    warn!("{e}, using defaults");
                    return Self::default();
                }
                Err(e) => warn!("{e}, using defaults"),
            }
        }
        let tuning = Self::default();
        if let Err(e) = tuning.save_to(path) {
            warn!("{e}");
        }
        tuning
    }

    /// Reload from file (called by key press).
    pub fn reload(&mut self) {
        *self = Self::load_or_default();
        info!("Tuning reloaded");
    }
}

/// `(1 / scale + 1)` vertices, with the scale clamped to a sane minimum.
pub fn radius_vertex_count(draw_scale: f32) -> usize {
    let scale = if draw_scale.is_finite() {
        draw_scale.clamp(MIN_RADIUS_DRAW_SCALE, 1.0)
    } else {
        MIN_RADIUS_DRAW_SCALE
    };
    ((1.0 / scale) + 1.0) as usize
}

/// Reload tuning with F5.
pub fn tuning_reload_input(keyboard: Res<ButtonInput<KeyCode>>, mut tuning: ResMut<Tuning>) {
    if keyboard.just_pressed(KeyCode::F5) {
        tuning.reload();
    }
}
