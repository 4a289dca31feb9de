use wasm_bindgen::JsValue;

/// Failure class of a [`TrackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed XML or a document that is not GPX.
    Parse,
    /// No usable track: zero tracks, or too few complete points.
    EmptyTrack,
    /// Rejected options.
    Config,
    /// The renderer failed to display the track.
    Render,
}

#[derive(Debug)]
pub enum TrackError {
    XmlParse(quick_xml::Error),
    MissingRoot,
    Truncated { element: String },
    NoTracks,
    TrackIndexOutOfRange { index: usize, available: usize },
    TooFewPoints { found: usize, required: usize },
    InvalidOptions(String),
    Render(String),
}

impl TrackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::XmlParse(_) | Self::MissingRoot | Self::Truncated { .. } => ErrorKind::Parse,
            Self::NoTracks | Self::TrackIndexOutOfRange { .. } | Self::TooFewPoints { .. } => {
                ErrorKind::EmptyTrack
            }
            Self::InvalidOptions(_) => ErrorKind::Config,
            Self::Render(_) => ErrorKind::Render,
        }
    }
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XmlParse(e) => write!(f, "XML parse error: {e}"),
            Self::MissingRoot => write!(f, "Document has no <gpx> root element"),
            Self::Truncated { element } => {
                write!(f, "Document ends before </{element}>")
            }
            Self::NoTracks => write!(f, "No tracks found in GPX file"),
            Self::TrackIndexOutOfRange { index, available } => write!(
                f,
                "Track index {index} out of range ({available} tracks available)"
            ),
            Self::TooFewPoints { found, required } => write!(
                f,
                "Track has {found} complete points, at least {required} required"
            ),
            Self::InvalidOptions(msg) => write!(f, "Invalid options: {msg}"),
            Self::Render(msg) => write!(f, "Renderer error: {msg}"),
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::XmlParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for TrackError {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlParse(e)
    }
}

impl From<TrackError> for JsValue {
    fn from(e: TrackError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
