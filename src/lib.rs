//! portfolio-fx: decorative canvas effects for a static portfolio site.
//!
//! This crate provides a WASM effects layer that draws a faint code-rain and
//! drifting sakura petals behind the page content, honouring reduced-motion
//! and save-data preferences.

use leptos::prelude::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::effects::{
	DensityProfile, EffectsLayer, EffectsState, EngineConfig, FxError, FxHandle, Viewport,
};

/// Body class requesting the code-rain layer.
const RAIN_CLASS: &str = "fx-on";
/// Body class requesting the petal layer.
const ANIME_CLASS: &str = "anime-on";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("portfolio-fx: logging initialized");
}

/// Load engine configuration from a script element with id="fx-config".
/// Expected format: JSON object with any subset of [`EngineConfig`] fields.
fn load_config() -> EngineConfig {
	let Some(text) = config_text() else {
		return EngineConfig::default();
	};

	match EngineConfig::from_json(&text) {
		Ok(config) => {
			info!("portfolio-fx: loaded config overrides");
			config
		}
		Err(e) => {
			warn!("portfolio-fx: failed to parse fx-config, using defaults: {}", e);
			EngineConfig::default()
		}
	}
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("fx-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Layers requested by the page markup through `<body class="fx-on anime-on">`.
fn initial_state() -> EffectsState {
	let Some(body) = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.body())
	else {
		return EffectsState::OFF;
	};
	let classes = body.class_list();
	EffectsState::new(classes.contains(RAIN_CLASS), classes.contains(ANIME_CLASS))
}

/// Main application component.
/// Installs the effects engine, publishes it as `window.EBFX`, and renders the
/// overlay layer with the state requested by the body classes.
///
/// The state signal is provided as context so other components can toggle
/// the layers; calls through `window.EBFX` are written back into it.
#[component]
pub fn App() -> impl IntoView {
	let state = RwSignal::new(initial_state());
	let handle = FxHandle::install(load_config(), state);

	provide_context(state);
	if let Some(handle) = &handle {
		handle.expose();
	}

	handle.map(|handle| view! { <EffectsLayer handle=handle /> })
}
