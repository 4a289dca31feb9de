use serde::Deserialize;

use crate::error::TrackError;

/// Closed interval `[min, max]` on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        self.min + self.span() / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Target display volume for normalized tracks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeOptions {
    /// Longitude maps onto x (default: [-5, 5])
    #[serde(default = "default_horizontal_range")]
    pub x_range: Range,

    /// Elevation maps onto y (default: [0, 2])
    #[serde(default = "default_vertical_range")]
    pub y_range: Range,

    /// Latitude maps onto z (default: [-5, 5])
    #[serde(default = "default_horizontal_range")]
    pub z_range: Range,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            x_range: default_horizontal_range(),
            y_range: default_vertical_range(),
            z_range: default_horizontal_range(),
        }
    }
}

/// Camera framing parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraOptions {
    /// Vertical field of view in degrees (default: 75)
    #[serde(default = "default_fov")]
    pub fov_degrees: f64,

    /// Multiplier applied to the fitted distance (default: 1.5)
    #[serde(default = "default_padding")]
    pub camera_padding: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            camera_padding: default_padding(),
        }
    }
}

/// Everything a load needs, deserialized from a flat JS object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerOptions {
    #[serde(flatten)]
    pub normalize: NormalizeOptions,

    #[serde(flatten)]
    pub camera: CameraOptions,

    /// Which <trk> of the document to display (default: 0)
    #[serde(default)]
    pub track_index: usize,

    /// Mesh id handed to the renderer (default: "gpx-track")
    #[serde(default = "default_track_id")]
    pub track_id: String,

    /// Tube color as 0xRRGGBB (default: 0x00ffff)
    #[serde(default = "default_color")]
    pub color: u32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            camera: CameraOptions::default(),
            track_index: 0,
            track_id: default_track_id(),
            color: default_color(),
        }
    }
}

impl ViewerOptions {
    pub fn validate(&self) -> Result<(), TrackError> {
        for (name, range) in [
            ("xRange", self.normalize.x_range),
            ("yRange", self.normalize.y_range),
            ("zRange", self.normalize.z_range),
        ] {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(TrackError::InvalidOptions(format!(
                    "{name} must be finite with min <= max, got [{}, {}]",
                    range.min, range.max
                )));
            }
        }
        let fov = self.camera.fov_degrees;
        if !fov.is_finite() || fov <= 0.0 || fov >= 180.0 {
            return Err(TrackError::InvalidOptions(format!(
                "fovDegrees must be in (0, 180), got {fov}"
            )));
        }
        let padding = self.camera.camera_padding;
        if !padding.is_finite() || padding <= 0.0 {
            return Err(TrackError::InvalidOptions(format!(
                "cameraPadding must be positive, got {padding}"
            )));
        }
        if self.track_id.is_empty() {
            return Err(TrackError::InvalidOptions("trackId must not be empty".into()));
        }
        Ok(())
    }
}

fn default_horizontal_range() -> Range {
    Range::new(-5.0, 5.0)
}

fn default_vertical_range() -> Range {
    Range::new(0.0, 2.0)
}

fn default_fov() -> f64 {
    75.0
}

fn default_padding() -> f64 {
    1.5
}

fn default_track_id() -> String {
    "gpx-track".to_string()
}

fn default_color() -> u32 {
    0x00ffff
}
