use crate::error::TrackError;
use crate::normalizer::NormalizedPoint;

/// Fewest points that still form a path.
pub const MIN_TRACK_POINTS: usize = 2;

/// Ordered, renderable sequence of normalized points.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<NormalizedPoint>,
    name: Option<String>,
}

impl Track {
    pub fn new(points: Vec<NormalizedPoint>) -> Result<Self, TrackError> {
        if points.len() < MIN_TRACK_POINTS {
            return Err(TrackError::TooFewPoints {
                found: points.len(),
                required: MIN_TRACK_POINTS,
            });
        }
        Ok(Self { points, name: None })
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// The `<name>` of the source `<trk>`, if it had one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a track holds at least [`MIN_TRACK_POINTS`].
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<NormalizedPoint> {
        self.points
    }
}
