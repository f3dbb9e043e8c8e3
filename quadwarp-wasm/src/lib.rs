use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use quadwarp::{Point2, QuadImage, RectTransform, WarpError};

// ── Tsify types for TypeScript interface generation ──

/// Rectangle placement passed from JavaScript. Missing fields keep defaults.
#[derive(Tsify, Serialize, Deserialize, Default)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WasmRect {
    /// World position of the pivot [x, y].
    #[serde(default)]
    pub position: Option<[f64; 2]>,
    /// In-plane rotation in radians.
    #[serde(default)]
    pub rotation: Option<f64>,
    /// World scale [x, y] (default: [1, 1]).
    #[serde(default)]
    pub lossy_scale: Option<[f64; 2]>,
    /// Pivot as a fraction of the rect (default: [0.5, 0.5]).
    #[serde(default)]
    pub pivot: Option<[f64; 2]>,
    #[serde(default)]
    pub anchor_min: Option<[f64; 2]>,
    #[serde(default)]
    pub anchor_max: Option<[f64; 2]>,
    #[serde(default)]
    pub size_delta: Option<[f64; 2]>,
    #[serde(default)]
    pub parent_size: Option<[f64; 2]>,
}

impl WasmRect {
    fn to_core(&self) -> RectTransform {
        let mut rect = RectTransform::default();
        if let Some(p) = self.position {
            rect.position = p.into();
        }
        if let Some(r) = self.rotation {
            rect.rotation = r;
        }
        if let Some(s) = self.lossy_scale {
            rect.lossy_scale = s.into();
        }
        if let Some(p) = self.pivot {
            rect.pivot = p.into();
        }
        if let Some(a) = self.anchor_min {
            rect.anchor_min = a.into();
        }
        if let Some(a) = self.anchor_max {
            rect.anchor_max = a.into();
        }
        if let Some(s) = self.size_delta {
            rect.size_delta = s.into();
        }
        if let Some(s) = self.parent_size {
            rect.parent_size = s.into();
        }
        rect
    }

    fn from_core(rect: &RectTransform) -> Self {
        WasmRect {
            position: Some(rect.position.into()),
            rotation: Some(rect.rotation),
            lossy_scale: Some(rect.lossy_scale.into()),
            pivot: Some(rect.pivot.into()),
            anchor_min: Some(rect.anchor_min.into()),
            anchor_max: Some(rect.anchor_max.into()),
            size_delta: Some(rect.size_delta.into()),
            parent_size: Some(rect.parent_size.into()),
        }
    }
}

fn js_err(e: WarpError) -> JsError {
    JsError::new(&e.to_string())
}

/// Last exception thrown by an `onChange` callback, shared with the sink.
#[derive(Clone, Default)]
struct CallbackErrors {
    last: Rc<RefCell<Option<String>>>,
}

impl CallbackErrors {
    fn record(&self, message: String) {
        tracing::warn!(error = %message, "onChange callback threw");
        *self.last.borrow_mut() = Some(message);
    }

    fn take(&self) -> Option<String> {
        self.last.borrow_mut().take()
    }
}

// ── Image wrapper ──

/// A warped image for use from JavaScript/TypeScript.
///
/// Register a callback with `onChange` to receive the inverse homography as a
/// `Float32Array` whenever the corners change.
#[wasm_bindgen]
pub struct QuadWarp {
    inner: QuadImage,
    callback_errors: CallbackErrors,
}

#[wasm_bindgen]
impl QuadWarp {
    /// Create an image with unit-square corners inside the given rectangle.
    #[wasm_bindgen(constructor)]
    pub fn new(rect: Option<WasmRect>) -> QuadWarp {
        let rect = rect.unwrap_or_default().to_core();
        QuadWarp {
            inner: QuadImage::new(rect),
            callback_errors: CallbackErrors::default(),
        }
    }

    /// Call `callback(name, values)` with the inverse homography now and on
    /// every later corner change.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: js_sys::Function) {
        let errors = self.callback_errors.clone();
        self.inner.subscribe(move |name: &str, values: &[f32; 9]| {
            let array = js_sys::Float32Array::from(&values[..]);
            if let Err(e) = callback.call2(&JsValue::NULL, &JsValue::from_str(name), &array) {
                errors.record(format!("{e:?}"));
            }
        });
    }

    /// The most recent exception thrown by an `onChange` callback, cleared
    /// on read.
    #[wasm_bindgen(js_name = takeCallbackError)]
    pub fn take_callback_error(&self) -> Option<String> {
        self.callback_errors.take()
    }

    /// Set one normalized corner (clamped to [0, 1]).
    #[wasm_bindgen(js_name = setPoint)]
    pub fn set_point(&mut self, index: usize, x: f64, y: f64) -> Result<(), JsError> {
        self.inner.set_point(index, Point2::new(x, y)).map_err(js_err)
    }

    /// Normalized corner as [x, y].
    #[wasm_bindgen(js_name = getPoint)]
    pub fn get_point(&self, index: usize) -> Result<Vec<f64>, JsError> {
        let p = self.inner.get_point(index).map_err(js_err)?;
        Ok(vec![p.x, p.y])
    }

    /// Fit the rectangle around four world points given as 8 flat values
    /// [x0, y0, x1, y1, x2, y2, x3, y3].
    #[wasm_bindgen(js_name = setPointsWorld)]
    pub fn set_points_world(&mut self, points: &[f64]) -> Result<(), JsError> {
        if points.len() % 2 != 0 {
            return Err(JsError::new(&format!(
                "expected an even number of coordinates, got {}",
                points.len()
            )));
        }
        let points: Vec<Point2> = points
            .chunks_exact(2)
            .map(|c| Point2::new(c[0], c[1]))
            .collect();
        self.inner.set_points_world(&points).map_err(js_err)
    }

    /// World-space corner as [x, y].
    #[wasm_bindgen(js_name = getPointWorld)]
    pub fn get_point_world(&self, index: usize) -> Result<Vec<f64>, JsError> {
        let p = self.inner.get_point_world(index).map_err(js_err)?;
        Ok(vec![p.x, p.y])
    }

    /// All four normalized corners as `[[x, y]; 4]`.
    pub fn corners(&self) -> Result<JsValue, JsError> {
        let corners: [[f64; 2]; 4] = (*self.inner.corners()).into();
        serde_wasm_bindgen::to_value(&corners).map_err(|e| JsError::new(&e.to_string()))
    }

    /// All four world-space corners as `[[x, y]; 4]`.
    #[wasm_bindgen(js_name = pointsWorld)]
    pub fn points_world(&self) -> Result<JsValue, JsError> {
        let points: [[f64; 2]; 4] = self.inner.points_world().map(Into::into);
        serde_wasm_bindgen::to_value(&points).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Homography as 9 row-major values (last one is 1).
    pub fn homography(&self) -> Vec<f64> {
        self.inner.homography().to_array().to_vec()
    }

    /// Inverse homography in `_InvHomography` uniform order.
    #[wasm_bindgen(js_name = invHomography)]
    pub fn inv_homography(&self) -> Result<Vec<f32>, JsError> {
        let inv = self.inner.inverse_homography().map_err(js_err)?;
        Ok(inv.to_uniform().to_vec())
    }

    /// Current rectangle placement.
    pub fn rect(&self) -> WasmRect {
        WasmRect::from_core(self.inner.rect())
    }

    /// Replace the rectangle placement, keeping the normalized corners.
    #[wasm_bindgen(js_name = setRect)]
    pub fn set_rect(&mut self, rect: WasmRect) {
        self.inner.set_rect(rect.to_core());
    }
}
