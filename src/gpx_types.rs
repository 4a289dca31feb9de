/// Parsed GPX data. Only track content is retained.
#[derive(Debug, Default)]
pub struct GpxData {
    pub version: Option<String>,
    pub creator: Option<String>,
    pub tracks: Vec<GpxTrack>,
}

/// One recorded track point (<trkpt>). Elevation is optional in GPX.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawGeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub ele: Option<f64>,
}

impl RawGeoPoint {
    pub fn new(lon: f64, lat: f64, ele: Option<f64>) -> Self {
        Self { lon, lat, ele }
    }

    /// Returns `(lon, lat, ele)` when every coordinate is present and finite.
    pub fn complete(&self) -> Option<(f64, f64, f64)> {
        let ele = self.ele?;
        if self.lon.is_finite() && self.lat.is_finite() && ele.is_finite() {
            Some((self.lon, self.lat, ele))
        } else {
            None
        }
    }
}

/// A GPX track (<trk>).
#[derive(Debug, Default)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub track_type: Option<String>,
    pub segments: Vec<GpxSegment>,
}

impl GpxTrack {
    /// All points of the track, segments concatenated in document order.
    pub fn points(&self) -> Vec<RawGeoPoint> {
        self.segments
            .iter()
            .flat_map(|s| s.points.iter().copied())
            .collect()
    }

    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}

/// A GPX track segment (<trkseg>).
#[derive(Debug, Default)]
pub struct GpxSegment {
    pub points: Vec<RawGeoPoint>,
}
