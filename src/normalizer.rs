use serde::Serialize;

use crate::gpx_types::RawGeoPoint;
use crate::options::{NormalizeOptions, Range};

/// A track point mapped into the display volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Source ranges of the complete points of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackExtent {
    pub lon: Range,
    pub lat: Range,
    pub ele: Range,
}

impl TrackExtent {
    /// `None` when no point has all three coordinates.
    pub fn from_points(points: &[RawGeoPoint]) -> Option<Self> {
        let mut complete = points.iter().filter_map(RawGeoPoint::complete);
        let (lon, lat, ele) = complete.next()?;
        let init = Self {
            lon: Range::new(lon, lon),
            lat: Range::new(lat, lat),
            ele: Range::new(ele, ele),
        };
        Some(complete.fold(init, |acc, (lon, lat, ele)| Self {
            lon: widen(acc.lon, lon),
            lat: widen(acc.lat, lat),
            ele: widen(acc.ele, ele),
        }))
    }
}

fn widen(range: Range, value: f64) -> Range {
    Range::new(range.min.min(value), range.max.max(value))
}

/// Linear map of `value` from `from` onto `to`.
///
/// A zero-width source range maps to the midpoint of `to`. The result is
/// clamped into `to`.
pub fn remap(value: f64, from: Range, to: Range) -> f64 {
    let span = from.span();
    if span == 0.0 {
        return to.midpoint();
    }
    let mapped = to.min + (value - from.min) * to.span() / span;
    mapped.max(to.min).min(to.max)
}

/// Normalize raw track points into the configured display volume.
///
/// Points missing any coordinate are dropped; order of the remaining points
/// is preserved. Longitude drives x, elevation y, latitude z.
pub fn normalize(points: &[RawGeoPoint], opts: &NormalizeOptions) -> Vec<NormalizedPoint> {
    let Some(extent) = TrackExtent::from_points(points) else {
        return Vec::new();
    };

    points
        .iter()
        .filter_map(RawGeoPoint::complete)
        .map(|(lon, lat, ele)| NormalizedPoint {
            x: remap(lon, extent.lon, opts.x_range),
            y: remap(ele, extent.ele, opts.y_range),
            z: remap(lat, extent.lat, opts.z_range),
        })
        .collect()
}
