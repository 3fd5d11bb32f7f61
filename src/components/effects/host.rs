//! Browser side of the engine: overlay layer, 2d context, frame requests,
//! computed style, and the page events that drive the control surface.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Document, Element, Event, EventTarget, HtmlCanvasElement,
	HtmlElement, PointerEvent, Window,
};

use super::config::EngineConfig;
use super::engine::{Engine, Host};
use super::error::FxError;
use super::gate::PowerSignals;
use super::pointer::{INTERACTIVE_SELECTOR, PointerPress};
use super::render::CanvasSurface;
use super::scheduler::{FrameScheduler, FrameToken};
use super::theme::StyleSnapshot;
use super::types::Viewport;

const LAYER_SELECTOR: &str = ".fx-layer";
const CANVAS_ID: &str = "fx-canvas";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
const FINE_POINTER_QUERY: &str = "(pointer: fine)";

/// The engine as it runs in the page.
pub type BrowserEngine = Engine<BrowserHost>;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// [`Host`] backed by the real DOM.
pub struct BrowserHost {
	window: Window,
	document: Document,
	layer: Option<HtmlElement>,
	frame_callback: FrameCallback,
}

impl BrowserHost {
	fn new(window: Window, document: Document) -> Self {
		Self {
			window,
			document,
			layer: None,
			frame_callback: Rc::new(RefCell::new(None)),
		}
	}
}

impl FrameScheduler for BrowserHost {
	fn request_frame(&mut self) -> Option<FrameToken> {
		let slot = self.frame_callback.borrow();
		let cb = slot.as_ref()?;
		self.window
			.request_animation_frame(cb.as_ref().unchecked_ref())
			.ok()
			.map(FrameToken)
	}

	fn cancel_frame(&mut self, token: FrameToken) {
		let _ = self.window.cancel_animation_frame(token.0);
	}
}

impl Host for BrowserHost {
	type Surface = CanvasSurface;

	fn acquire_surface(&mut self) -> Option<CanvasSurface> {
		match ensure_layer(&self.document) {
			Ok((layer, surface)) => {
				self.layer = Some(layer);
				Some(surface)
			}
			Err(e) => {
				warn!("portfolio-fx: cannot set up effects layer: {}", e);
				None
			}
		}
	}

	fn style_snapshot(&self) -> StyleSnapshot {
		read_style(&self.window, &self.document).unwrap_or_else(|e| {
			warn!("portfolio-fx: style sampling failed: {}", e);
			StyleSnapshot::default()
		})
	}

	fn show_layer(&mut self, visible: bool) {
		if let Some(layer) = &self.layer {
			let _ = layer.class_list().toggle_with_force("is-on", visible);
		}
	}
}

/// Find `.fx-layer` / `#fx-canvas`, creating whichever is missing, and grab a
/// 2d context from the canvas.
fn ensure_layer(document: &Document) -> Result<(HtmlElement, CanvasSurface), FxError> {
	let body = document.body().ok_or(FxError::NoBody)?;

	let layer: HtmlElement = match document.query_selector(LAYER_SELECTOR)? {
		Some(el) => el
			.dyn_into()
			.map_err(|_| FxError::Dom("fx layer is not an html element".into()))?,
		None => {
			let el: HtmlElement = document
				.create_element("div")?
				.dyn_into()
				.map_err(|_| FxError::Dom("div is not an html element".into()))?;
			el.set_class_name("fx-layer");
			el.set_attribute("aria-hidden", "true")?;
			body.prepend_with_node_1(&el)?;
			el
		}
	};

	let canvas: HtmlCanvasElement = match document.get_element_by_id(CANVAS_ID) {
		Some(el) => el
			.dyn_into()
			.map_err(|_| FxError::Dom("#fx-canvas is not a canvas".into()))?,
		None => {
			let canvas: HtmlCanvasElement = document
				.create_element("canvas")?
				.dyn_into()
				.map_err(|_| FxError::Dom("canvas element expected".into()))?;
			canvas.set_id(CANVAS_ID);
			layer.append_child(&canvas)?;
			canvas
		}
	};

	let options = js_sys::Object::new();
	js_sys::Reflect::set(&options, &"alpha".into(), &JsValue::from_bool(true))?;
	js_sys::Reflect::set(&options, &"desynchronized".into(), &JsValue::from_bool(true))?;
	let ctx: CanvasRenderingContext2d = canvas
		.get_context_with_context_options("2d", &options)?
		.ok_or(FxError::NoContext)?
		.dyn_into()
		.map_err(|_| FxError::NoContext)?;

	Ok((layer, CanvasSurface::new(canvas, ctx)))
}

fn read_style(window: &Window, document: &Document) -> Result<StyleSnapshot, FxError> {
	let root = document.document_element().ok_or(FxError::NoDocument)?;
	let Some(style) = window.get_computed_style(&root)? else {
		return Ok(StyleSnapshot::default());
	};
	let prop = |name: &str| {
		style
			.get_property_value(name)
			.ok()
			.map(|v| v.trim().to_string())
			.filter(|v| !v.is_empty())
	};
	Ok(StyleSnapshot {
		primary: prop("--primary"),
		accent: prop("--accent"),
		clear: prop("--fx-clear"),
	})
}

fn media_matches(window: &Window, query: &str) -> Option<bool> {
	window
		.match_media(query)
		.ok()
		.flatten()
		.map(|mql| mql.matches())
}

/// `navigator.connection.saveData`, which web-sys does not bind.
fn save_data(window: &Window) -> Option<bool> {
	let navigator = window.navigator();
	let connection = js_sys::Reflect::get(&navigator, &"connection".into()).ok()?;
	if !connection.is_object() {
		return None;
	}
	js_sys::Reflect::get(&connection, &"saveData".into())
		.ok()?
		.as_bool()
}

/// Read the preference signals, defaulting anything unreadable.
pub fn read_signals(window: &Window) -> PowerSignals {
	let defaults = PowerSignals::default();
	PowerSignals {
		reduced_motion: media_matches(window, REDUCED_MOTION_QUERY)
			.unwrap_or(defaults.reduced_motion),
		save_data: save_data(window).unwrap_or(defaults.save_data),
		fine_pointer: media_matches(window, FINE_POINTER_QUERY).unwrap_or(defaults.fine_pointer),
	}
}

/// Current logical viewport and device pixel ratio.
pub fn read_viewport(window: &Window, document: &Document, max_pixel_ratio: f64) -> Viewport {
	let client = |f: fn(&Element) -> i32| {
		document
			.document_element()
			.map(|el| f(&el) as f64)
			.unwrap_or(1.0)
	};
	let width = window
		.inner_width()
		.ok()
		.and_then(|v| v.as_f64())
		.filter(|w| *w > 0.0)
		.unwrap_or_else(|| client(Element::client_width));
	let height = window
		.inner_height()
		.ok()
		.and_then(|v| v.as_f64())
		.filter(|h| *h > 0.0)
		.unwrap_or_else(|| client(Element::client_height));
	Viewport::clamped(width, height, window.device_pixel_ratio(), max_pixel_ratio)
}

fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), FxError>
where
	F: FnMut(Event) + 'static,
{
	let closure = Closure::<dyn FnMut(Event)>::new(handler);
	target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
	// Listeners live as long as the page.
	closure.forget();
	Ok(())
}

fn with_engine(engine: &Weak<RefCell<BrowserEngine>>, f: impl FnOnce(&mut BrowserEngine)) {
	if let Some(engine) = engine.upgrade() {
		f(&mut engine.borrow_mut());
	}
}

fn random_seed() -> u64 {
	let a = (js_sys::Math::random() * u32::MAX as f64) as u64;
	let b = (js_sys::Math::random() * u32::MAX as f64) as u64;
	(a << 32) | b
}

/// Create the page's engine and wire it to the browser: frame callback,
/// debounced resize, visibility, reduced-motion changes, scroll, and click
/// sparkles.
pub fn install(config: EngineConfig) -> Result<Rc<RefCell<BrowserEngine>>, FxError> {
	let window = web_sys::window().ok_or(FxError::NoWindow)?;
	let document = window.document().ok_or(FxError::NoDocument)?;

	let signals = read_signals(&window);
	let viewport = read_viewport(&window, &document, config.max_pixel_ratio);
	let max_pixel_ratio = config.max_pixel_ratio;
	let debounce_ms = config.resize_debounce_ms;

	let host = BrowserHost::new(window.clone(), document.clone());
	let frame_slot = host.frame_callback.clone();
	let engine = Rc::new(RefCell::new(Engine::new(
		config,
		signals,
		viewport,
		host,
		random_seed(),
	)));

	let weak = Rc::downgrade(&engine);
	*frame_slot.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
		with_engine(&weak, |e| {
			e.frame(timestamp);
		});
	}));

	engine.borrow_mut().set_page_visible(!document.hidden());

	// Resize: trailing debounce, then resize + re-seed.
	{
		let timer: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
		let (weak, win, doc, pending) = (
			Rc::downgrade(&engine),
			window.clone(),
			document.clone(),
			timer.clone(),
		);
		let apply = Closure::<dyn FnMut()>::new(move || {
			pending.set(None);
			let vp = read_viewport(&win, &doc, max_pixel_ratio);
			with_engine(&weak, |e| e.resize(vp));
		});
		let win = window.clone();
		listen(&window, "resize", move |_| {
			if let Some(id) = timer.take() {
				win.clear_timeout_with_handle(id);
			}
			match win.set_timeout_with_callback_and_timeout_and_arguments_0(
				apply.as_ref().unchecked_ref(),
				debounce_ms,
			) {
				Ok(id) => timer.set(Some(id)),
				Err(_) => warn!("portfolio-fx: could not schedule resize"),
			}
		})?;
	}

	{
		let (weak, doc) = (Rc::downgrade(&engine), document.clone());
		listen(&document, "visibilitychange", move |_| {
			let visible = !doc.hidden();
			with_engine(&weak, |e| e.set_page_visible(visible));
		})?;
	}

	if let Ok(Some(mql)) = window.match_media(REDUCED_MOTION_QUERY) {
		let (weak, query) = (Rc::downgrade(&engine), mql.clone());
		listen(&mql, "change", move |_| {
			let reduced = query.matches();
			with_engine(&weak, |e| e.set_reduced_motion(reduced));
		})?;
	}

	{
		let weak = Rc::downgrade(&engine);
		listen(&window, "scroll", move |ev| {
			let time = ev.time_stamp();
			with_engine(&weak, |e| e.note_scroll(time));
		})?;
	}

	if signals.fine_pointer {
		let weak = Rc::downgrade(&engine);
		listen(&document, "pointerdown", move |ev| {
			let Ok(pointer) = ev.dyn_into::<PointerEvent>() else {
				return;
			};
			let over_control = pointer
				.target()
				.and_then(|t| t.dyn_into::<Element>().ok())
				.and_then(|el| el.closest(INTERACTIVE_SELECTOR).ok().flatten())
				.is_some();
			let press = PointerPress {
				x: pointer.client_x() as f64,
				y: pointer.client_y() as f64,
				button: pointer.button(),
				over_control,
				time: pointer.time_stamp(),
			};
			with_engine(&weak, |e| {
				e.pointer_down(press);
			});
		})?;
	}

	info!(
		"portfolio-fx: engine installed ({}x{}, low power: {})",
		viewport.width,
		viewport.height,
		engine.borrow().low_power()
	);
	Ok(engine)
}
