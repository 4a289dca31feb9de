pub mod error;
pub mod framing;
pub mod gpx_types;
pub mod js_renderer;
pub mod loader;
pub mod normalizer;
pub mod options;
pub mod parser;
pub mod track;

use std::sync::Once;

use wasm_bindgen::prelude::*;

use crate::js_renderer::JsRenderer;
use crate::loader::{LoadToken, TrackScene};
use crate::options::ViewerOptions;

/// Parse a GPX string and return the selected track as an array of `{x, y, z}`.
#[wasm_bindgen(js_name = normalizeGpx)]
pub fn normalize_gpx(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    init_hooks();

    let opts = parse_options(options)?;
    let track = loader::prepare_track(gpx_string, &opts)?;
    serde_wasm_bindgen::to_value(&track.into_points())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Same as `normalizeGpx`, returned as a JSON string.
#[wasm_bindgen(js_name = normalizeGpxString)]
pub fn normalize_gpx_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    init_hooks();

    let opts = parse_options(options)?;
    let track = loader::prepare_track(gpx_string, &opts)?;
    serde_json::to_string(track.points()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Camera placement `{position, target, distance}` framing the selected track.
#[wasm_bindgen(js_name = frameGpx)]
pub fn frame_gpx(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    init_hooks();

    let opts = parse_options(options)?;
    let track = loader::prepare_track(gpx_string, &opts)?;
    let frame = framing::frame_track(&track, &opts.camera);
    serde_wasm_bindgen::to_value(&frame).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Owns the page's renderer and serializes GPX loads against it.
#[wasm_bindgen]
pub struct TrackViewer {
    scene: TrackScene<JsRenderer>,
}

#[wasm_bindgen]
impl TrackViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(renderer: JsValue, options: JsValue) -> Result<TrackViewer, JsValue> {
        init_hooks();

        let opts = parse_options(options)?;
        let scene = TrackScene::new(JsRenderer::new(renderer), opts)?;
        Ok(TrackViewer { scene })
    }

    /// Call when a fetch or file read starts; pass the token to `finishLoad`.
    #[wasm_bindgen(js_name = beginLoad)]
    pub fn begin_load(&mut self) -> u32 {
        self.scene.begin_load().value()
    }

    /// Returns true when the track was installed. Failures are logged.
    #[wasm_bindgen(js_name = finishLoad)]
    pub fn finish_load(&mut self, token: u32, gpx_string: &str) -> bool {
        self.scene
            .finish_load(LoadToken::from(token), gpx_string)
            .is_installed()
    }

    pub fn load(&mut self, gpx_string: &str) -> bool {
        self.scene.load(gpx_string).is_installed()
    }

    pub fn cancel(&mut self) {
        self.scene.cancel();
    }

    #[wasm_bindgen(js_name = pointCount)]
    pub fn point_count(&self) -> usize {
        self.scene.current_track().map_or(0, |t| t.len())
    }
}

fn init_hooks() {
    static LOGGER: Once = Once::new();

    console_error_panic_hook::set_once();
    LOGGER.call_once(|| {
        // The host page may have installed its own logger already.
        let _ = console_log::init_with_level(log::Level::Info);
    });
}

fn parse_options(options: JsValue) -> Result<ViewerOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(ViewerOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
