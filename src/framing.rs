use glam::DVec3;
use serde::Serialize;

use crate::normalizer::NormalizedPoint;
use crate::options::CameraOptions;
use crate::track::Track;

/// Closest the camera is placed to the track center, in display units.
pub const MIN_CAMERA_DISTANCE: f64 = 1.0;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    pub fn from_points(points: &[NormalizedPoint]) -> Option<Self> {
        let mut iter = points.iter().map(|p| DVec3::new(p.x, p.y, p.z));
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |b, v| Self {
            min: b.min.min(v),
            max: b.max.max(v),
        }))
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f64 {
        self.size().max_element()
    }
}

/// Where to put the camera and what to look at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraFrame {
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub distance: f64,
}

/// Fit the whole track inside the vertical field of view, looking down -z.
pub fn frame_track(track: &Track, opts: &CameraOptions) -> CameraFrame {
    // Track guarantees at least two points.
    let bounds = Bounds::from_points(track.points()).unwrap_or(Bounds {
        min: DVec3::ZERO,
        max: DVec3::ZERO,
    });
    let center = bounds.center();
    let half_fov = opts.fov_degrees.to_radians() / 2.0;
    let fitted = (bounds.max_extent() / 2.0) / half_fov.tan() * opts.camera_padding;
    let distance = fitted.max(MIN_CAMERA_DISTANCE);
    let position = center + DVec3::Z * distance;

    CameraFrame {
        position: position.to_array(),
        target: center.to_array(),
        distance,
    }
}
