//! Tunables for the effects engine.
//!
//! Every knob has a default matching the shipped look; a page can override any
//! subset of them with a JSON blob (see [`EngineConfig::from_json`]).
//!
//! # Profiles
//!
//! Population sizing depends on the viewport. Widths up to
//! [`EngineConfig::mobile_breakpoint`] use the [`Profile::Mobile`] densities,
//! which seed wider columns, slower rain, and fewer petals.

use serde::Deserialize;

/// Viewport class selecting a [`DensityProfile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
	Mobile,
	Desktop,
}

/// Per-profile population and speed settings.
///
/// A JSON override replaces a whole profile, so every field is required there.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityProfile {
	/// Horizontal slot width of one code-rain column, in logical pixels.
	pub column_width: f64,
	/// Minimum seed speed of a column (pixels per 60 fps frame).
	pub column_speed_base: f64,
	/// Random spread added on top of `column_speed_base`.
	pub column_speed_span: f64,
	/// Viewport area (px²) per petal.
	pub petal_density: f64,
	/// Upper bound on the petal population.
	pub petal_max: usize,
}

impl DensityProfile {
	/// Desktop densities.
	pub fn desktop() -> Self {
		Self {
			column_width: 16.0,
			column_speed_base: 0.85,
			column_speed_span: 1.05,
			petal_density: 36_000.0,
			petal_max: 52,
		}
	}

	/// Narrow-viewport densities.
	pub fn mobile() -> Self {
		Self {
			column_width: 18.0,
			column_speed_base: 0.55,
			column_speed_span: 0.65,
			petal_density: 52_000.0,
			petal_max: 34,
		}
	}
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
	/// Widths at or below this value use the mobile profile.
	pub mobile_breakpoint: f64,
	/// Treat a mobile viewport as low-power (no animation at all).
	pub low_power_on_mobile: bool,
	/// Frames arriving sooner than this after the last drawn frame are skipped.
	pub min_frame_interval_ms: f64,
	/// Upper bound on the physics step, in seconds.
	pub max_step_secs: f64,
	/// A gap longer than this between frames triggers a hard clear.
	pub hard_clear_gap_ms: f64,
	/// Trailing debounce applied to window resize events.
	pub resize_debounce_ms: i32,
	/// Time after the last scroll event during which the page counts as scrolling.
	pub scroll_settle_ms: f64,
	/// Device pixel ratio is clamped to `[1, max_pixel_ratio]`.
	pub max_pixel_ratio: f64,
	pub desktop: DensityProfile,
	pub mobile: DensityProfile,
	/// Lower bound on the petal population, for both profiles.
	pub petal_min: usize,
	/// Sparkles spawned per pointer press.
	pub sparkle_burst: usize,
	/// Hard cap on live sparkles.
	pub sparkle_cap: usize,
	/// Max positional jitter (px) of a spawned sparkle around the press point.
	pub sparkle_jitter: f64,
	/// Characters the code-rain draws from.
	pub glyphs: String,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			mobile_breakpoint: 820.0,
			low_power_on_mobile: false,
			min_frame_interval_ms: 22.0,
			max_step_secs: 0.05,
			hard_clear_gap_ms: 180.0,
			resize_debounce_ms: 120,
			scroll_settle_ms: 140.0,
			max_pixel_ratio: 2.0,
			desktop: DensityProfile::desktop(),
			mobile: DensityProfile::mobile(),
			petal_min: 16,
			sparkle_burst: 6,
			sparkle_cap: 80,
			sparkle_jitter: 6.0,
			glyphs: "01{}[]()<>/\\|+-=_*#@~$%&;:".to_string(),
		}
	}
}

impl EngineConfig {
	/// Parse a (possibly partial) JSON override. Missing fields keep defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Classify a viewport width.
	pub fn profile(&self, width: f64) -> Profile {
		if width <= self.mobile_breakpoint {
			Profile::Mobile
		} else {
			Profile::Desktop
		}
	}

	/// Densities for the given viewport width.
	pub fn density(&self, width: f64) -> &DensityProfile {
		match self.profile(width) {
			Profile::Mobile => &self.mobile,
			Profile::Desktop => &self.desktop,
		}
	}

	/// Glyph set as characters, falling back to `0`/`1` when configured empty.
	pub fn glyph_set(&self) -> Vec<char> {
		let glyphs: Vec<char> = self.glyphs.chars().collect();
		if glyphs.is_empty() { vec!['0', '1'] } else { glyphs }
	}
}
