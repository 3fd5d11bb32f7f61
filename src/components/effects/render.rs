//! Drawing for the effects layer.
//!
//! The engine talks to a [`Surface`], which the browser host backs with a
//! `CanvasRenderingContext2d` ([`CanvasSurface`]). Each frame is composited in
//! passes, later passes on top:
//! 1. Trail fade (translucent fill with the palette's clear color)
//! 2. Code-rain glyphs
//! 3. Petals, then sparkles

use std::f64::consts::TAU;

use rand::Rng;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::particles::{CodeRain, Petal, PetalField};
use super::theme::{Color, Palette};
use super::types::Viewport;

/// Trail-fade opacity when only the rain is on.
const RAIN_FADE: f64 = 0.10;
/// Trail-fade opacity while petals are also drawn; trails shorten so petals
/// don't smear.
const RAIN_FADE_WITH_PETALS: f64 = 0.14;

/// Glyphs drawn below y = -24 or beyond the bottom by as much are skipped.
const GLYPH_CULL_MARGIN: f64 = 24.0;

const GLYPH_FONT: &str = "12px ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, \"Liberation Mono\", \"Courier New\", monospace";

/// Fill and glow of one code-rain glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphStyle {
	pub fill: Color,
	pub glow: Color,
	pub blur: f64,
}

/// 2d drawing target in logical (CSS pixel) coordinates.
pub trait Surface {
	/// Resize the backing store for a new viewport.
	fn resize(&mut self, viewport: &Viewport);
	/// Hard clear to fully transparent.
	fn clear(&mut self);
	/// Paint `color` (with its alpha) over the whole surface.
	fn fade(&mut self, color: Color);
	fn glyph(&mut self, glyph: char, x: f64, y: f64, style: &GlyphStyle);
	fn petal(&mut self, petal: &Petal);
	fn sparkle(&mut self, x: f64, y: f64, radius: f64, alpha: f64);
}

/// Trail fade followed by the code-rain glyphs.
///
/// Every column draws a short streak: the head glyph plus one or two more at
/// `step` intervals above it, dimmer than the head. The left half of the
/// columns glows in the accent color, the right half in the primary color.
pub fn draw_rain<S: Surface, R: Rng>(
	surface: &mut S,
	rain: &CodeRain,
	palette: &Palette,
	glyphs: &[char],
	with_petals: bool,
	rng: &mut R,
) {
	let fade = if with_petals {
		RAIN_FADE_WITH_PETALS
	} else {
		RAIN_FADE
	};
	surface.fade(palette.clear.with_alpha(fade));

	if glyphs.is_empty() {
		return;
	}

	let steps = if with_petals { 2 } else { 3 };
	let (head_alpha, tail_alpha) = if with_petals { (0.10, 0.05) } else { (0.16, 0.08) };
	let blur = if with_petals { 10.0 } else { 14.0 };
	let height = rain.height();
	let total = rain.columns.len().max(1) as f64;

	for (i, col) in rain.columns.iter().enumerate() {
		let glow = if (i as f64 / total) < 0.5 {
			palette.accent
		} else {
			palette.primary
		};
		for s in 0..steps {
			let y = col.y - s as f64 * col.step;
			if y < -GLYPH_CULL_MARGIN || y > height + GLYPH_CULL_MARGIN {
				continue;
			}
			let alpha = if s == 0 { head_alpha } else { tail_alpha };
			let glyph = glyphs[rng.gen_range(0..glyphs.len())];
			surface.glyph(
				glyph,
				col.x,
				y,
				&GlyphStyle {
					fill: Color::WHITE.with_alpha(alpha),
					glow,
					blur,
				},
			);
		}
	}
}

/// Petals, then sparkles on top.
pub fn draw_petals<S: Surface>(surface: &mut S, field: &PetalField) {
	for p in &field.petals {
		surface.petal(p);
	}
	for s in &field.sparkles {
		let alpha = s.current_alpha();
		if alpha <= 0.0 {
			continue;
		}
		surface.sparkle(s.x, s.y, s.current_radius(), alpha);
	}
}

/// [`Surface`] backed by a browser canvas.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
}

impl CanvasSurface {
	pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
		Self {
			canvas,
			ctx,
			width: 1.0,
			height: 1.0,
		}
	}
}

impl Surface for CanvasSurface {
	fn resize(&mut self, viewport: &Viewport) {
		let (bw, bh) = viewport.buffer_size();
		self.canvas.set_width(bw);
		self.canvas.set_height(bh);
		let style = self.canvas.style();
		let _ = style.set_property("width", &format!("{}px", viewport.width));
		let _ = style.set_property("height", &format!("{}px", viewport.height));

		let dpr = viewport.pixel_ratio;
		let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
		self.width = viewport.width;
		self.height = viewport.height;
	}

	fn clear(&mut self) {
		self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
	}

	fn fade(&mut self, color: Color) {
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
	}

	fn glyph(&mut self, glyph: char, x: f64, y: f64, style: &GlyphStyle) {
		let mut buf = [0u8; 4];
		self.ctx.save();
		self.ctx.set_font(GLYPH_FONT);
		self.ctx.set_fill_style_str(&style.fill.to_css());
		self.ctx.set_shadow_blur(style.blur);
		self.ctx.set_shadow_color(&style.glow.to_css());
		let _ = self.ctx.fill_text(glyph.encode_utf8(&mut buf), x, y);
		self.ctx.restore();
	}

	fn petal(&mut self, p: &Petal) {
		let ctx = &self.ctx;
		let s = p.size;

		ctx.save();
		let _ = ctx.translate(p.x, p.y);
		let _ = ctx.rotate(p.rotation);

		ctx.set_global_alpha(p.alpha);
		ctx.set_fill_style_str(&format!("hsla({}, 90%, 70%, {})", p.hue, p.alpha));
		ctx.set_shadow_blur(18.0);
		ctx.set_shadow_color(&format!("hsla({}, 90%, 65%, 0.35)", p.hue));

		ctx.begin_path();
		ctx.move_to(0.0, -s * 0.6);
		ctx.bezier_curve_to(s * 0.55, -s * 0.75, s * 0.75, -s * 0.1, 0.0, s);
		ctx.bezier_curve_to(-s * 0.75, -s * 0.1, -s * 0.55, -s * 0.75, 0.0, -s * 0.6);
		ctx.close_path();
		ctx.fill();

		// Highlight
		ctx.set_global_alpha(p.alpha * 0.55);
		ctx.set_shadow_blur(0.0);
		ctx.set_fill_style_str(&format!("hsla({}, 85%, 86%, 0.55)", p.hue));
		ctx.begin_path();
		let _ = ctx.ellipse(-s * 0.14, -s * 0.1, s * 0.18, s * 0.32, -0.6, 0.0, TAU);
		ctx.fill();

		ctx.restore();
	}

	fn sparkle(&mut self, x: f64, y: f64, radius: f64, alpha: f64) {
		let ctx = &self.ctx;
		ctx.save();
		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str("rgba(255, 255, 255, 1)");
		ctx.set_shadow_blur(14.0);
		ctx.set_shadow_color("rgba(255, 110, 180, 0.55)");
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, TAU);
		ctx.fill();
		ctx.restore();
	}
}
