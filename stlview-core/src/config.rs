/// Viewer configuration
///
/// Every field has a default matching the classic viewer, so an empty JSON
/// object (or no file at all) gives the stock behavior.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::stl::GroupingMode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting X, Y, Z angles in 1/16 degree units
    pub initial_rotation: [i64; 3],
    /// Angle units per pixel of mouse motion
    pub drag_sensitivity: i32,
    /// Scale change per scroll step
    pub zoom_step: f32,
    /// Lower bound on the zoom scale. `None` leaves it unbounded, which lets
    /// the view collapse at zero and mirror below it.
    pub min_scale: Option<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_rotation: [2440, 2160, 0],
            drag_sensitivity: 8,
            zoom_step: 0.1,
            min_scale: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of grid cells along each side
    pub grid_divisions: u32,
    /// Grid spans `[-grid_half_extent, grid_half_extent]` in X and Z
    pub grid_half_extent: f32,
    pub axis_length: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid_divisions: 20,
            grid_half_extent: 100.0,
            axis_length: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Half width of the visible square in world units
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
    /// Distance the scene is pushed away from the eye
    pub view_depth: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            half_extent: 50.0,
            near: -100.0,
            far: 500.0,
            view_depth: 20.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    pub projection: ProjectionConfig,
    pub grouping: GroupingMode,
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the projection degenerate or fill
    /// frames with non-finite geometry
    pub fn validate(&self) -> Result<(), ConfigError> {
        let projection = &self.projection;
        for (name, value) in [
            ("camera.zoom_step", self.camera.zoom_step),
            ("scene.grid_half_extent", self.scene.grid_half_extent),
            ("scene.axis_length", self.scene.axis_length),
            ("projection.near", projection.near),
            ("projection.far", projection.far),
            ("projection.view_depth", projection.view_depth),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if !(projection.half_extent > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "projection.half_extent must be positive, got {}",
                projection.half_extent
            )));
        }
        if projection.near == projection.far {
            return Err(ConfigError::Invalid(
                "projection.near and projection.far must differ".to_string(),
            ));
        }
        if let Some(min) = self.camera.min_scale {
            if !min.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "camera.min_scale must be finite, got {}",
                    min
                )));
            }
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = ViewerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ViewerConfig::from_json_str(
            r#"{ "camera": { "min_scale": 0.2 }, "grouping": "facet" }"#,
        )
        .unwrap();
        assert_eq!(config.camera.min_scale, Some(0.2));
        assert_eq!(config.camera.drag_sensitivity, 8);
        assert_eq!(config.grouping, GroupingMode::Facet);
        assert_eq!(config.scene, SceneConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        let err = ViewerConfig::from_json_str("{ camera: 1 }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_degenerate_projection_rejected() {
        let err = ViewerConfig::from_json_str(r#"{ "projection": { "half_extent": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ViewerConfig::from_json_str(r#"{ "projection": { "near": 5.0, "far": 5.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut config = ViewerConfig::default();
        config.camera.zoom_step = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::default();
        config.camera.zoom_step = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::default();
        config.projection.view_depth = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::default();
        config.scene.grid_half_extent = f32::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scene.grid_half_extent"));

        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_round_trip_through_pretty_json() {
        let mut config = ViewerConfig::default();
        config.scene.grid_divisions = 8;
        let json = config.to_json_pretty().unwrap();
        assert_eq!(ViewerConfig::from_json_str(&json).unwrap(), config);
    }
}
