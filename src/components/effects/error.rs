//! Errors raised while wiring the engine into the page.
//!
//! None of these reach the user: the browser host logs them and the engine
//! degrades to "no effect rendered".

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failure of a DOM or canvas call.
#[derive(Debug, Error)]
pub enum FxError {
	/// No global `window` (not running in a browser).
	#[error("no global window")]
	NoWindow,
	/// The window has no document.
	#[error("window has no document")]
	NoDocument,
	/// The document has no `<body>` to attach the overlay layer to.
	#[error("document has no body")]
	NoBody,
	/// The canvas refused to hand out a 2d rendering context.
	#[error("2d canvas context unavailable")]
	NoContext,
	/// A DOM call threw.
	#[error("dom call failed: {0}")]
	Dom(String),
}

impl From<JsValue> for FxError {
	fn from(value: JsValue) -> Self {
		FxError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}
