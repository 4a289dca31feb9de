use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::error::TrackError;
use crate::framing::CameraFrame;
use crate::loader::Renderer;
use crate::normalizer::NormalizedPoint;

type Result<T> = std::result::Result<T, TrackError>;

/// [`Renderer`] backed by a JS object exposing `buildPathMesh(points, id, color)`,
/// `buildGroundPlane()` and `frameCamera(frame)`.
///
/// A missing method or an exception thrown by one becomes [`TrackError::Render`].
pub struct JsRenderer {
    target: JsValue,
}

impl JsRenderer {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn call(&self, method: &str, args: Array) -> Result<()> {
        Reflect::get(&self.target, &JsValue::from_str(method))
            .and_then(|f| {
                f.dyn_into::<Function>()
                    .map_err(|_| JsValue::from_str("not a function"))
            })
            .and_then(|f| f.apply(&self.target, &args))
            .map(|_| ())
            .map_err(|e| TrackError::Render(format!("{method}: {e:?}")))
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| TrackError::Render(format!("argument conversion: {e}")))
}

impl Renderer for JsRenderer {
    fn build_path_mesh(
        &mut self,
        points: &[NormalizedPoint],
        id: &str,
        color: u32,
    ) -> Result<()> {
        let points = to_js(&points)?;
        let args = Array::of3(&points, &JsValue::from_str(id), &JsValue::from(color));
        self.call("buildPathMesh", args)
    }

    fn build_ground_plane(&mut self) -> Result<()> {
        self.call("buildGroundPlane", Array::new())
    }

    fn frame_camera(&mut self, frame: &CameraFrame) -> Result<()> {
        let frame = to_js(frame)?;
        self.call("frameCamera", Array::of1(&frame))
    }
}
