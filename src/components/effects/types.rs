//! Plain values passed between the page glue and the engine.

/// Which decor layers the page asked for.
///
/// `anime` implies `enabled`; [`EffectsState::normalized`] enforces it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectsState {
	/// Code-rain layer.
	pub enabled: bool,
	/// Petal and sparkle layer.
	pub anime: bool,
}

impl EffectsState {
	pub const OFF: EffectsState = EffectsState {
		enabled: false,
		anime: false,
	};

	pub fn new(enabled: bool, anime: bool) -> Self {
		Self { enabled, anime }
	}

	/// Petals are drawn over the rain's trail fade, so anime mode turns the
	/// rain on as well.
	pub fn normalized(self) -> Self {
		Self {
			enabled: self.enabled || self.anime,
			anime: self.anime,
		}
	}

	pub fn any(self) -> bool {
		self.enabled || self.anime
	}
}

/// Logical viewport size and device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
	pub pixel_ratio: f64,
}

impl Viewport {
	/// Build a viewport, clamping sizes to at least one pixel and the pixel
	/// ratio to `[1, max_pixel_ratio]`. Non-finite inputs fall back to 1.
	pub fn clamped(width: f64, height: f64, pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
		let finite_or_one = |v: f64| if v.is_finite() { v } else { 1.0 };
		Self {
			width: finite_or_one(width).max(1.0),
			height: finite_or_one(height).max(1.0),
			pixel_ratio: finite_or_one(pixel_ratio).clamp(1.0, max_pixel_ratio.max(1.0)),
		}
	}

	/// Backing-store size of the canvas in device pixels.
	pub fn buffer_size(&self) -> (u32, u32) {
		(
			(self.width * self.pixel_ratio).floor() as u32,
			(self.height * self.pixel_ratio).floor() as u32,
		)
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			width: 1.0,
			height: 1.0,
			pixel_ratio: 1.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn anime_implies_enabled() {
		assert_eq!(
			EffectsState::new(false, true).normalized(),
			EffectsState::new(true, true)
		);
		assert_eq!(
			EffectsState::new(true, false).normalized(),
			EffectsState::new(true, false)
		);
		assert!(!EffectsState::OFF.normalized().any());
	}

	#[test]
	fn viewport_clamps() {
		let vp = Viewport::clamped(0.0, f64::NAN, 3.0, 2.0);
		assert_eq!(vp.width, 1.0);
		assert_eq!(vp.height, 1.0);
		assert_eq!(vp.pixel_ratio, 2.0);
		assert_eq!(Viewport::clamped(100.0, 50.0, 0.5, 2.0).pixel_ratio, 1.0);
	}

	#[test]
	fn buffer_scales_by_pixel_ratio() {
		let vp = Viewport::clamped(1280.5, 800.0, 1.5, 2.0);
		assert_eq!(vp.buffer_size(), (1920, 1200));
	}
}
