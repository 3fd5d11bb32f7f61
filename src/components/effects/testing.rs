//! Headless stand-ins for the browser host, used by unit tests.

use super::engine::Host;
use super::particles::Petal;
use super::render::{GlyphStyle, Surface};
use super::scheduler::{FrameScheduler, FrameToken};
use super::theme::{Color, StyleSnapshot};
use super::types::Viewport;

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
	Resize(Viewport),
	Clear,
	Fade(Color),
	Glyph {
		glyph: char,
		x: f64,
		y: f64,
		style: GlyphStyle,
	},
	Petal,
	Sparkle {
		x: f64,
		y: f64,
		radius: f64,
		alpha: f64,
	},
}

/// Surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
	pub ops: Vec<Op>,
}

impl RecordingSurface {
	/// `(x, y, style)` of every glyph drawn.
	pub fn glyphs(&self) -> impl Iterator<Item = (f64, f64, GlyphStyle)> + '_ {
		self.ops.iter().filter_map(|op| match op {
			Op::Glyph { x, y, style, .. } => Some((*x, *y, *style)),
			_ => None,
		})
	}
}

impl Surface for RecordingSurface {
	fn resize(&mut self, viewport: &Viewport) {
		self.ops.push(Op::Resize(*viewport));
	}

	fn clear(&mut self) {
		self.ops.push(Op::Clear);
	}

	fn fade(&mut self, color: Color) {
		self.ops.push(Op::Fade(color));
	}

	fn glyph(&mut self, glyph: char, x: f64, y: f64, style: &GlyphStyle) {
		self.ops.push(Op::Glyph {
			glyph,
			x,
			y,
			style: *style,
		});
	}

	fn petal(&mut self, _petal: &Petal) {
		self.ops.push(Op::Petal);
	}

	fn sparkle(&mut self, x: f64, y: f64, radius: f64, alpha: f64) {
		self.ops.push(Op::Sparkle {
			x,
			y,
			radius,
			alpha,
		});
	}
}

/// Host that counts frame requests and hands out recording surfaces.
#[derive(Debug)]
pub struct FakeHost {
	next_token: i32,
	/// Total frames ever requested.
	pub requested: usize,
	/// Requested and neither fired nor cancelled.
	pub outstanding: Vec<FrameToken>,
	pub cancelled: Vec<FrameToken>,
	pub style: StyleSnapshot,
	pub layer_visible: Option<bool>,
	pub context_available: bool,
}

impl Default for FakeHost {
	fn default() -> Self {
		Self {
			next_token: 0,
			requested: 0,
			outstanding: Vec::new(),
			cancelled: Vec::new(),
			style: StyleSnapshot::default(),
			layer_visible: None,
			context_available: true,
		}
	}
}

impl FakeHost {
	/// A host whose canvas never yields a 2d context.
	pub fn without_context() -> Self {
		Self {
			context_available: false,
			..Self::default()
		}
	}

	/// Simulate the browser running the oldest pending frame callback.
	pub fn fire(&mut self) -> Option<FrameToken> {
		if self.outstanding.is_empty() {
			None
		} else {
			Some(self.outstanding.remove(0))
		}
	}
}

impl FrameScheduler for FakeHost {
	fn request_frame(&mut self) -> Option<FrameToken> {
		self.next_token += 1;
		self.requested += 1;
		let token = FrameToken(self.next_token);
		self.outstanding.push(token);
		Some(token)
	}

	fn cancel_frame(&mut self, token: FrameToken) {
		self.outstanding.retain(|t| *t != token);
		self.cancelled.push(token);
	}
}

impl Host for FakeHost {
	type Surface = RecordingSurface;

	fn acquire_surface(&mut self) -> Option<RecordingSurface> {
		self.context_available.then(RecordingSurface::default)
	}

	fn style_snapshot(&self) -> StyleSnapshot {
		self.style.clone()
	}

	fn show_layer(&mut self, visible: bool) {
		self.layer_visible = Some(visible);
	}
}
