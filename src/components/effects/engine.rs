//! The effects engine: one instance per page.
//!
//! Owns the requested [`EffectsState`], the preference gate, the palette, both
//! particle populations, and the frame loop. Everything runs on the UI thread:
//! page glue calls the control methods, and the host's frame callback calls
//! [`Engine::frame`]. A `configure` takes effect from the next frame on.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::config::EngineConfig;
use super::gate::{MotionChange, PowerSignals, PreferenceGate};
use super::particles::{CodeRain, PetalField};
use super::pointer::{PointerPress, ScrollTracker, SpawnContext, spawn_policy};
use super::render::{self, Surface};
use super::scheduler::{FrameLoop, FrameScheduler, Tick};
use super::theme::{Palette, StyleSnapshot, sample_theme};
use super::types::{EffectsState, Viewport};

/// Platform services the engine needs besides frame scheduling.
pub trait Host: FrameScheduler {
	/// Drawing surface handed out by [`Host::acquire_surface`].
	type Surface: Surface;

	/// Find or create the overlay layer and hand out its drawing surface.
	/// `None` when no 2d context can be acquired.
	fn acquire_surface(&mut self) -> Option<Self::Surface>;

	/// Current values of the theme's custom properties.
	fn style_snapshot(&self) -> StyleSnapshot;

	/// Show or hide the overlay layer.
	fn show_layer(&mut self, visible: bool);
}

/// What a frame callback did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
	/// The loop was not running; nothing rescheduled.
	Idle,
	/// Too soon after the previous frame; rescheduled without drawing.
	Skipped,
	/// Drew a frame and rescheduled.
	Drawn,
	/// No layer is active any more; the loop stopped itself.
	Halted,
}

/// Effects engine driving one overlay layer through a [`Host`].
pub struct Engine<H: Host> {
	config: EngineConfig,
	glyphs: Vec<char>,
	state: EffectsState,
	gate: PreferenceGate,
	palette: Palette,
	viewport: Viewport,
	rain: CodeRain,
	petals: PetalField,
	frames: FrameLoop,
	scroll: ScrollTracker,
	page_visible: bool,
	surface: Option<H::Surface>,
	host: H,
	rng: SmallRng,
}

impl<H: Host> Engine<H> {
	/// Build an idle engine seeded for `viewport`. Nothing is drawn or
	/// scheduled until [`Engine::configure`] requests a layer.
	pub fn new(
		config: EngineConfig,
		signals: PowerSignals,
		viewport: Viewport,
		host: H,
		seed: u64,
	) -> Self {
		let viewport = Viewport::clamped(
			viewport.width,
			viewport.height,
			viewport.pixel_ratio,
			config.max_pixel_ratio,
		);
		let mut rng = SmallRng::seed_from_u64(seed);
		let rain = CodeRain::seed(&config, viewport.width, viewport.height, &mut rng);
		let petals = PetalField::seed(&config, viewport.width, viewport.height, &mut rng);
		let gate = PreferenceGate::new(signals, &config, viewport.width);
		let palette = sample_theme(&host.style_snapshot(), &Palette::default());

		Self {
			glyphs: config.glyph_set(),
			config,
			state: EffectsState::OFF,
			gate,
			palette,
			viewport,
			rain,
			petals,
			frames: FrameLoop::default(),
			scroll: ScrollTracker::default(),
			page_visible: true,
			surface: None,
			host,
			rng,
		}
	}

	/// Whether the preference gate currently suppresses all animation.
	pub fn low_power(&self) -> bool {
		self.gate.low_power()
	}

	pub fn state(&self) -> EffectsState {
		self.state
	}

	pub fn palette(&self) -> &Palette {
		&self.palette
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	#[cfg(test)]
	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn is_running(&self) -> bool {
		self.frames.is_running()
	}

	pub fn rain(&self) -> &CodeRain {
		&self.rain
	}

	pub fn petals(&self) -> &PetalField {
		&self.petals
	}

	#[cfg(test)]
	pub fn surface(&self) -> Option<&H::Surface> {
		self.surface.as_ref()
	}

	#[cfg(test)]
	pub fn host(&self) -> &H {
		&self.host
	}

	#[cfg(test)]
	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	/// Set the requested layers and start or stop the loop accordingly.
	///
	/// `anime` without `enabled` is normalized to both on. Both off is a full
	/// stop with a clear. Under low power nothing is scheduled and the canvas
	/// is cleared.
	pub fn configure(&mut self, next: EffectsState) {
		let normalized = next.normalized();
		if normalized != next {
			debug!("portfolio-fx: anime mode implies code-rain, enabling it");
		}
		self.state = normalized;
		debug!(
			"portfolio-fx: configure enabled={} anime={}",
			normalized.enabled, normalized.anime
		);

		self.resample_palette();
		if self.state.any() {
			self.ensure_surface();
		}
		self.sync_layer();

		if self.low_power() {
			self.stop(true);
			return;
		}
		if self.state.any() {
			self.start();
		} else {
			self.stop(true);
		}
	}

	/// Start the frame loop. No-op when already running, under low power,
	/// while the page is hidden, or when no drawing surface is available.
	pub fn start(&mut self) -> bool {
		if self.frames.is_running() || self.low_power() || !self.page_visible {
			return false;
		}
		if !self.ensure_surface() {
			return false;
		}
		let started = self.frames.start(&mut self.host);
		if started {
			info!("portfolio-fx: render loop started");
		} else {
			warn!("portfolio-fx: frame request refused");
		}
		started
	}

	/// Stop the frame loop, cancelling the pending frame. Optionally clears.
	pub fn stop(&mut self, clear: bool) {
		if self.frames.is_running() {
			info!("portfolio-fx: render loop stopped");
		}
		self.frames.stop(&mut self.host);
		if clear {
			if let Some(surface) = self.surface.as_mut() {
				surface.clear();
			}
		}
	}

	/// Frame callback. `timestamp` is the rAF time in milliseconds.
	pub fn frame(&mut self, timestamp: f64) -> FrameOutcome {
		let tick = self.frames.begin(
			timestamp,
			self.config.min_frame_interval_ms,
			self.config.max_step_secs,
		);
		let (dt, gap_ms) = match tick {
			None => return FrameOutcome::Idle,
			Some(Tick::Skip) => {
				self.frames.schedule(&mut self.host);
				return FrameOutcome::Skipped;
			}
			Some(Tick::Run { dt, gap_ms }) => (dt, gap_ms),
		};

		if !self.state.any() {
			self.stop(false);
			return FrameOutcome::Halted;
		}
		let Some(surface) = self.surface.as_mut() else {
			self.stop(false);
			return FrameOutcome::Halted;
		};

		// Coming back from a long pause: drop the stale frozen frame.
		if gap_ms > self.config.hard_clear_gap_ms {
			surface.clear();
		}
		if self.state.enabled {
			self.rain.update(dt, &mut self.rng);
			render::draw_rain(
				surface,
				&self.rain,
				&self.palette,
				&self.glyphs,
				self.state.anime,
				&mut self.rng,
			);
		}
		if self.state.anime {
			self.petals.update(dt, &mut self.rng);
			render::draw_petals(surface, &self.petals);
		}

		self.frames.schedule(&mut self.host);
		FrameOutcome::Drawn
	}

	/// Apply a (debounced) viewport change: resize the buffer, re-sample the
	/// palette, and re-seed both populations.
	pub fn resize(&mut self, viewport: Viewport) {
		self.viewport = Viewport::clamped(
			viewport.width,
			viewport.height,
			viewport.pixel_ratio,
			self.config.max_pixel_ratio,
		);
		debug!(
			"portfolio-fx: resize {}x{} @{}",
			self.viewport.width, self.viewport.height, self.viewport.pixel_ratio
		);
		self.gate.set_viewport_width(&self.config, self.viewport.width);
		if let Some(surface) = self.surface.as_mut() {
			surface.resize(&self.viewport);
		}
		self.resample_palette();
		self.reseed();

		self.sync_layer();
		if self.low_power() {
			self.stop(true);
		} else {
			self.resume();
		}
	}

	/// Page visibility changed.
	pub fn set_page_visible(&mut self, visible: bool) {
		self.page_visible = visible;
		if visible {
			self.resume();
		} else {
			self.stop(false);
		}
	}

	/// The reduced-motion preference changed.
	pub fn set_reduced_motion(&mut self, reduced: bool) {
		match self.gate.set_reduced_motion(reduced) {
			MotionChange::Entered => {
				debug!("portfolio-fx: reduced motion on, stopping");
				self.stop(true);
				self.sync_layer();
			}
			MotionChange::Left => {
				debug!("portfolio-fx: reduced motion off");
				self.sync_layer();
				self.resume();
			}
			MotionChange::Unchanged => {}
		}
	}

	/// Record a scroll event (ms timestamp).
	pub fn note_scroll(&mut self, time: f64) {
		self.scroll.note(time);
	}

	/// Pointer pressed somewhere on the page. Returns the number of sparkles
	/// spawned.
	pub fn pointer_down(&mut self, press: PointerPress) -> usize {
		let ctx = SpawnContext {
			anime: self.state.anime,
			low_power: self.low_power(),
			fine_pointer: self.gate.signals().fine_pointer,
			scrolling: self
				.scroll
				.is_scrolling(press.time, self.config.scroll_settle_ms),
		};
		if let Err(block) = spawn_policy(&press, &ctx) {
			debug!("portfolio-fx: no sparkles ({block:?})");
			return 0;
		}
		let count = self.config.sparkle_burst;
		self.petals.burst(
			press.x,
			press.y,
			count,
			self.config.sparkle_jitter,
			&mut self.rng,
		);
		count
	}

	/// Resume after a gate or visibility change if a layer is requested.
	fn resume(&mut self) {
		if !self.low_power() && self.page_visible && self.state.any() {
			self.start();
		}
	}

	fn ensure_surface(&mut self) -> bool {
		if self.surface.is_some() {
			return true;
		}
		match self.host.acquire_surface() {
			Some(mut surface) => {
				surface.resize(&self.viewport);
				self.surface = Some(surface);
				self.resample_palette();
				self.reseed();
				true
			}
			None => {
				warn!("portfolio-fx: no 2d canvas context, effects disabled");
				false
			}
		}
	}

	fn sync_layer(&mut self) {
		if self.surface.is_some() {
			let visible = self.state.any() && !self.low_power();
			self.host.show_layer(visible);
		}
	}

	fn resample_palette(&mut self) {
		self.palette = sample_theme(&self.host.style_snapshot(), &self.palette);
	}

	fn reseed(&mut self) {
		let (w, h) = (self.viewport.width, self.viewport.height);
		self.rain = CodeRain::seed(&self.config, w, h, &mut self.rng);
		self.petals = PetalField::seed(&self.config, w, h, &mut self.rng);
	}
}
