//! Browser sink backed by the Meta Pixel `fbq` global.
//!
//! The loader script installs `window.fbq` asynchronously, so the function is looked up on every
//! call instead of once at construction. Outside a browser (or without the `wasm-web` feature)
//! the global never exists and every event is dropped.

use serde_json::{Map, Value};

use crate::pixel::error::PixelResult;
use crate::pixel::sink::TrackingSink;

#[derive(Clone, Copy, Debug, Default)]
pub struct FbqSink;

impl FbqSink {
    pub fn new() -> Self {
        Self
    }

    /// Whether a callable `fbq` is installed right now.
    pub fn is_available(&self) -> bool {
        browser::resolve_fbq().is_some()
    }
}

impl TrackingSink for FbqSink {
    fn track(&self, event_name: &str, payload: &Map<String, Value>) -> PixelResult<()> {
        browser::forward(event_name, payload)
    }

    fn name(&self) -> &'static str {
        "fbq"
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
mod browser {
    use serde_json::{Map, Value};
    use wasm_bindgen::{JsCast, JsValue};

    use crate::pixel::constants::{FBQ_GLOBAL, TRACK_ACTION};
    use crate::pixel::error::{internal_error, sink_error, PixelResult};

    pub(super) fn resolve_fbq() -> Option<js_sys::Function> {
        let window = web_sys::window()?;
        let value =
            js_sys::Reflect::get(&JsValue::from(window), &JsValue::from_str(FBQ_GLOBAL)).ok()?;
        value.dyn_into::<js_sys::Function>().ok()
    }

    pub(super) fn forward(event_name: &str, payload: &Map<String, Value>) -> PixelResult<()> {
        let Some(fbq) = resolve_fbq() else {
            return Ok(());
        };
        let payload = payload_to_js(payload)?;
        fbq.call3(
            &JsValue::NULL,
            &JsValue::from_str(TRACK_ACTION),
            &JsValue::from_str(event_name),
            &payload,
        )
        .map(|_| ())
        .map_err(|err| sink_error(format!("fbq call failed: {err:?}")))
    }

    fn payload_to_js(payload: &Map<String, Value>) -> PixelResult<JsValue> {
        let serialized = serde_json::to_string(payload)
            .map_err(|err| internal_error(format!("failed to serialize pixel payload: {err}")))?;
        js_sys::JSON::parse(&serialized)
            .map_err(|err| internal_error(format!("failed to convert pixel payload: {err:?}")))
    }
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
mod browser {
    use serde_json::{Map, Value};

    use crate::pixel::error::PixelResult;

    pub(super) fn resolve_fbq() -> Option<()> {
        None
    }

    pub(super) fn forward(_event_name: &str, _payload: &Map<String, Value>) -> PixelResult<()> {
        Ok(())
    }
}
