//! Public control surface: the Leptos component and the JS handle.
//!
//! [`FxHandle`] is the one way other code drives the engine. Rust glue passes
//! it around or writes the state signal found in Leptos context; page scripts
//! reach the same instance as `window.EBFX`.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;

use super::config::EngineConfig;
use super::host::{self, BrowserEngine};
use super::types::EffectsState;

/// Shared handle to the page's effects engine.
///
/// Holds the page's `RwSignal<EffectsState>` next to the engine. Every state
/// change, from Rust or from `window.EBFX`, is written back into the signal,
/// so the signal always reads the state the engine actually runs.
#[wasm_bindgen]
#[derive(Clone)]
pub struct FxHandle {
	engine: Rc<RefCell<BrowserEngine>>,
	state: RwSignal<EffectsState>,
}

impl FxHandle {
	/// Create the engine and wire it into the page. `None` outside a browser.
	pub fn install(config: EngineConfig, state: RwSignal<EffectsState>) -> Option<Self> {
		match host::install(config) {
			Ok(engine) => Some(Self { engine, state }),
			Err(e) => {
				warn!("portfolio-fx: effects unavailable: {}", e);
				None
			}
		}
	}

	/// Publish this handle as `window.EBFX` for page scripts.
	pub fn expose(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if js_sys::Reflect::set(&window, &"EBFX".into(), &JsValue::from(self.clone())).is_err() {
			warn!("portfolio-fx: could not publish window.EBFX");
		}
	}

	/// Apply a new requested state and mirror the normalized result into the
	/// state signal.
	pub fn apply(&self, next: EffectsState) {
		let applied = {
			let mut engine = self.engine.borrow_mut();
			engine.configure(next);
			engine.state()
		};
		mirror(self.state, applied);
	}

	/// The signal that drives (and reflects) the engine state.
	pub fn state_signal(&self) -> RwSignal<EffectsState> {
		self.state
	}

	fn applied(&self) -> EffectsState {
		self.engine.borrow().state()
	}
}

/// Write `applied` into `signal`, notifying subscribers only on a change.
fn mirror(signal: RwSignal<EffectsState>, applied: EffectsState) {
	if signal.get_untracked() != applied {
		signal.set(applied);
	}
}

/// Whether a signal value still has to reach the engine.
fn needs_apply(applied: EffectsState, requested: EffectsState) -> bool {
	applied != requested.normalized()
}

#[wasm_bindgen]
impl FxHandle {
	/// Turn the code-rain (`enabled`) and petal (`anime`) layers on or off.
	pub fn configure(&self, enabled: bool, anime: bool) {
		self.apply(EffectsState::new(enabled, anime));
	}

	/// `set({ enabled, anime })`, for scripts written against the object form.
	/// Missing or falsy fields count as off.
	pub fn set(&self, next: JsValue) {
		let flag = |name: &str| {
			js_sys::Reflect::get(&next, &name.into())
				.map(|v| v.is_truthy())
				.unwrap_or(false)
		};
		self.apply(EffectsState::new(flag("enabled"), flag("anime")));
	}

	/// Start the render loop. Returns whether a loop was started.
	pub fn start(&self) -> bool {
		self.engine.borrow_mut().start()
	}

	/// Stop the render loop, clearing the canvas when `clear` is true.
	pub fn stop(&self, clear: Option<bool>) {
		self.engine.borrow_mut().stop(clear.unwrap_or(false));
	}

	/// Whether reduced motion, save-data, or the mobile policy holds the
	/// effects off.
	#[wasm_bindgen(getter, js_name = lowPower)]
	pub fn low_power(&self) -> bool {
		self.engine.borrow().low_power()
	}
}

/// Renders the overlay layer and keeps the engine in sync with the handle's
/// state signal.
///
/// The engine finds this markup when it first needs a canvas; without the
/// component it creates the same elements itself.
#[component]
pub fn EffectsLayer(handle: FxHandle) -> impl IntoView {
	let layer_ref = NodeRef::<leptos::html::Div>::new();
	let state = handle.state_signal();

	Effect::new(move |_| {
		let next = state.get();
		if layer_ref.get().is_none() || !needs_apply(handle.applied(), next) {
			return;
		}
		debug!("portfolio-fx: layer state {:?}", next);
		handle.apply(next);
	});

	view! {
		<div node_ref=layer_ref class="fx-layer" aria-hidden="true">
			<canvas id="fx-canvas"></canvas>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn script_request_is_mirrored_normalized() {
		let state = RwSignal::new(EffectsState::OFF);
		mirror(state, EffectsState::new(false, true).normalized());
		assert_eq!(state.get_untracked(), EffectsState::new(true, true));

		mirror(state, EffectsState::OFF);
		assert_eq!(state.get_untracked(), EffectsState::OFF);
	}

	#[test]
	fn mirrored_value_is_not_applied_twice() {
		let applied = EffectsState::new(true, true);
		assert!(!needs_apply(applied, applied));
		assert!(!needs_apply(applied, EffectsState::new(false, true)));
		assert!(needs_apply(applied, EffectsState::new(true, false)));
		assert!(needs_apply(EffectsState::OFF, applied));
	}
}
