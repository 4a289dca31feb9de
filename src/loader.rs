use log::{debug, error, info};

use crate::error::TrackError;
use crate::framing::{frame_track, CameraFrame};
use crate::normalizer::{normalize, NormalizedPoint};
use crate::options::ViewerOptions;
use crate::parser::{parse_gpx, select_track};
use crate::track::Track;

/// Scene operations the loader drives. Implemented by the host's 3D engine.
///
/// Failures are reported as [`TrackError::Render`]; the load is then rejected.
pub trait Renderer {
    /// Build a tube mesh along `points`. An existing mesh with the same `id`
    /// must be removed and its resources disposed first.
    fn build_path_mesh(
        &mut self,
        points: &[NormalizedPoint],
        id: &str,
        color: u32,
    ) -> Result<(), TrackError>;

    /// Build (or rebuild) the ground plane under the track.
    fn build_ground_plane(&mut self) -> Result<(), TrackError>;

    fn frame_camera(&mut self, frame: &CameraFrame) -> Result<(), TrackError>;
}

/// Parse, select, normalize and validate a track. No side effects.
pub fn prepare_track(gpx: &str, opts: &ViewerOptions) -> Result<Track, TrackError> {
    opts.validate()?;
    let data = parse_gpx(gpx)?;
    debug!(
        "parsed GPX version={:?} creator={:?} with {} track(s)",
        data.version,
        data.creator,
        data.tracks.len()
    );
    let selected = select_track(&data, opts.track_index)?;
    let raw = selected.points();
    let normalized = normalize(&raw, &opts.normalize);
    debug!(
        "track {} (type {:?}): {} raw points, {} complete",
        opts.track_index,
        selected.track_type,
        raw.len(),
        normalized.len()
    );
    Ok(Track::new(normalized)?.with_name(selected.name.clone()))
}

/// Identifies one load. Only the most recently issued token may install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u32);

impl LoadToken {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for LoadToken {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// The track was handed to the renderer.
    Installed { points: usize },
    /// A newer load was started (or this one cancelled); nothing changed.
    Superseded,
    /// The GPX could not be turned into a track, or the renderer failed to
    /// show it; the previous track stays current.
    Rejected(TrackError),
}

impl LoadOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

/// Application context: owns the renderer, the displayed track and the
/// in-flight load token.
pub struct TrackScene<R: Renderer> {
    renderer: R,
    options: ViewerOptions,
    current: Option<Track>,
    next_token: u32,
    pending: Option<LoadToken>,
}

impl<R: Renderer> TrackScene<R> {
    pub fn new(renderer: R, options: ViewerOptions) -> Result<Self, TrackError> {
        options.validate()?;
        Ok(Self {
            renderer,
            options,
            current: None,
            next_token: 0,
            pending: None,
        })
    }

    /// Start a load; any earlier pending load becomes stale.
    pub fn begin_load(&mut self) -> LoadToken {
        self.next_token = self.next_token.wrapping_add(1);
        let token = LoadToken(self.next_token);
        if let Some(prev) = self.pending.replace(token) {
            debug!("load {} superseded by {}", prev.0, token.0);
        }
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            debug!("load {} cancelled", token.0);
        }
    }

    /// Complete the load identified by `token` with the fetched GPX text.
    pub fn finish_load(&mut self, token: LoadToken, gpx: &str) -> LoadOutcome {
        if self.pending != Some(token) {
            debug!("discarding stale load {}", token.0);
            return LoadOutcome::Superseded;
        }
        self.pending = None;

        match prepare_track(gpx, &self.options).and_then(|track| self.install(track)) {
            Ok(points) => LoadOutcome::Installed { points },
            Err(e) => {
                error!("Error loading GPX ({:?}): {e}", e.kind());
                LoadOutcome::Rejected(e)
            }
        }
    }

    /// Synchronous begin + finish.
    pub fn load(&mut self, gpx: &str) -> LoadOutcome {
        let token = self.begin_load();
        self.finish_load(token, gpx)
    }

    /// `current` only changes once every renderer call has succeeded.
    fn install(&mut self, track: Track) -> Result<usize, TrackError> {
        self.renderer
            .build_path_mesh(track.points(), &self.options.track_id, self.options.color)?;
        self.renderer.build_ground_plane()?;
        let frame = frame_track(&track, &self.options.camera);
        self.renderer.frame_camera(&frame)?;

        let points = track.len();
        info!(
            "installed track '{}' ({}) with {points} points",
            track.name().unwrap_or("unnamed"),
            self.options.track_id
        );
        self.current = Some(track);
        Ok(points)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
