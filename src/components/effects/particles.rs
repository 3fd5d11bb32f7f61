//! Decorative particle simulations.
//!
//! Two independent systems share the canvas:
//! - [`CodeRain`]: a fixed population of glyph columns falling down the page,
//!   recycled to the top once they pass the bottom edge.
//! - [`PetalField`]: drifting petals that are respawned above the viewport when
//!   they leave it, plus short-lived click [`Sparkle`]s.
//!
//! All motion is expressed in pixels per 60 fps frame and scaled by `dt * 60`,
//! so visual speed does not depend on the actual frame rate.

use std::f64::consts::TAU;

use rand::Rng;

use super::config::EngineConfig;

/// Frames per second the speeds are tuned against.
const BASELINE_FPS: f64 = 60.0;

/// A column is recycled once its head is this far below the bottom edge.
const COLUMN_RECYCLE_MARGIN: f64 = 40.0;
/// Where a recycled column restarts.
const COLUMN_RESPAWN_Y: f64 = -20.0;

/// Petals further than this outside the left/right edges are replaced.
const PETAL_SIDE_MARGIN: f64 = 60.0;
/// Petals further than this below the bottom edge are replaced.
const PETAL_BOTTOM_MARGIN: f64 = 40.0;
/// Sway phase advance, radians per second.
const PETAL_PHASE_RATE: f64 = 1.4;
/// Scale of the sinusoidal sway term.
const PETAL_SWAY_SCALE: f64 = 0.35;

fn unit<R: Rng>(rng: &mut R) -> f64 {
	rng.gen_range(0.0..1.0)
}

/// One vertical lane of code-rain. Only the head is stored; the trailing
/// glyphs are drawn at fixed offsets above it.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
	pub x: f64,
	pub y: f64,
	pub speed: f64,
	/// Vertical distance between consecutive glyphs of the streak.
	pub step: f64,
}

/// The code-rain population.
#[derive(Clone, Debug, Default)]
pub struct CodeRain {
	pub columns: Vec<Column>,
	pub column_width: f64,
	height: f64,
}

impl CodeRain {
	/// Number of columns seeded for a viewport width.
	pub fn column_count(config: &EngineConfig, width: f64) -> usize {
		let column_width = config.density(width).column_width;
		if column_width <= 0.0 || width <= 0.0 {
			return 0;
		}
		(width / column_width).floor() as usize
	}

	/// Seed one column per horizontal slot, at random heights.
	pub fn seed<R: Rng>(config: &EngineConfig, width: f64, height: f64, rng: &mut R) -> Self {
		let density = config.density(width);
		let count = Self::column_count(config, width);
		let columns = (0..count)
			.map(|i| Column {
				x: i as f64 * density.column_width,
				y: unit(rng) * height,
				speed: density.column_speed_base + unit(rng) * density.column_speed_span,
				step: 12.0 + (unit(rng) * 12.0).floor(),
			})
			.collect();

		Self {
			columns,
			column_width: density.column_width,
			height,
		}
	}

	/// Advance every column and recycle those past the bottom edge.
	pub fn update<R: Rng>(&mut self, dt: f64, rng: &mut R) {
		let limit = self.height + COLUMN_RECYCLE_MARGIN;
		for col in &mut self.columns {
			col.y += col.speed * dt * BASELINE_FPS;
			if col.y > limit {
				col.y = COLUMN_RESPAWN_Y;
				col.speed = 0.65 + unit(rng) * 1.25;
			}
		}
	}

	pub fn height(&self) -> f64 {
		self.height
	}
}

/// A falling, swaying, spinning petal.
#[derive(Clone, Debug, PartialEq)]
pub struct Petal {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub rotation: f64,
	pub spin: f64,
	pub size: f64,
	/// Sway amplitude multiplier.
	pub sway: f64,
	pub phase: f64,
	pub hue: f64,
	pub alpha: f64,
}

impl Petal {
	/// Spawn a petal. Seeded petals start anywhere on screen; replacements
	/// start just above the top edge so the field keeps "falling".
	pub fn spawn<R: Rng>(width: f64, height: f64, anywhere: bool, rng: &mut R) -> Self {
		let size = 6.0 + unit(rng) * 12.0;
		let x = unit(rng) * width;
		let y = if anywhere {
			unit(rng) * height
		} else {
			-20.0 - unit(rng) * 80.0
		};
		Self {
			x,
			y,
			vx: -0.25 + unit(rng) * 0.5,
			vy: 0.55 + unit(rng) * 1.25,
			rotation: unit(rng) * TAU,
			spin: -0.02 + unit(rng) * 0.04,
			size,
			sway: 0.6 + unit(rng) * 1.4,
			phase: unit(rng) * 6.2,
			hue: 330.0 + unit(rng) * 22.0,
			alpha: 0.26 + unit(rng) * 0.18,
		}
	}

	fn is_out(&self, width: f64, height: f64) -> bool {
		self.y > height + PETAL_BOTTOM_MARGIN
			|| self.x < -PETAL_SIDE_MARGIN
			|| self.x > width + PETAL_SIDE_MARGIN
	}
}

/// A short-lived glint spawned by a click.
#[derive(Clone, Debug, PartialEq)]
pub struct Sparkle {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub alpha: f64,
	/// Seconds since spawn.
	pub age: f64,
	/// Lifetime in seconds.
	pub ttl: f64,
	pub vx: f64,
	pub vy: f64,
}

impl Sparkle {
	pub fn spawn<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
		Self {
			x,
			y,
			radius: 0.5 + unit(rng) * 1.8,
			alpha: 0.35 + unit(rng) * 0.35,
			age: 0.0,
			ttl: 1.2 + unit(rng) * 0.8,
			vx: -0.15 + unit(rng) * 0.3,
			vy: -0.35 - unit(rng) * 0.7,
		}
	}

	/// Fraction of the lifetime used, `0.0..=1.0`.
	pub fn progress(&self) -> f64 {
		(self.age / self.ttl).clamp(0.0, 1.0)
	}

	/// Current opacity, fading linearly to zero over the lifetime.
	pub fn current_alpha(&self) -> f64 {
		self.alpha * (1.0 - self.progress())
	}

	/// Current radius; sparkles swell slightly as they fade.
	pub fn current_radius(&self) -> f64 {
		self.radius * (1.0 + self.progress() * 0.8)
	}

	pub fn is_expired(&self) -> bool {
		self.age >= self.ttl
	}
}

/// Petals plus click sparkles.
#[derive(Clone, Debug, Default)]
pub struct PetalField {
	pub petals: Vec<Petal>,
	pub sparkles: Vec<Sparkle>,
	width: f64,
	height: f64,
	sparkle_cap: usize,
}

impl PetalField {
	/// Petal population for a viewport, clamped to the profile's bounds.
	pub fn petal_count(config: &EngineConfig, width: f64, height: f64) -> usize {
		let density = config.density(width);
		let raw = if density.petal_density > 0.0 {
			((width * height) / density.petal_density).floor().max(0.0) as usize
		} else {
			density.petal_max
		};
		let max = density.petal_max.max(config.petal_min);
		raw.clamp(config.petal_min, max)
	}

	/// Seed a fresh field. Sparkles never survive a re-seed.
	pub fn seed<R: Rng>(config: &EngineConfig, width: f64, height: f64, rng: &mut R) -> Self {
		let count = Self::petal_count(config, width, height);
		Self {
			petals: (0..count)
				.map(|_| Petal::spawn(width, height, true, rng))
				.collect(),
			sparkles: Vec::new(),
			width,
			height,
			sparkle_cap: config.sparkle_cap,
		}
	}

	/// Advance petals and sparkles by `dt` seconds.
	pub fn update<R: Rng>(&mut self, dt: f64, rng: &mut R) {
		let frames = dt * BASELINE_FPS;
		for p in &mut self.petals {
			p.phase += dt * PETAL_PHASE_RATE;
			p.x += (p.vx + p.phase.sin() * PETAL_SWAY_SCALE * p.sway) * frames;
			p.y += p.vy * frames;
			p.rotation += p.spin * frames;

			if p.is_out(self.width, self.height) {
				*p = Petal::spawn(self.width, self.height, false, rng);
			}
		}

		for s in &mut self.sparkles {
			s.age += dt;
			s.x += s.vx * frames;
			s.y += s.vy * frames;
		}
		self.sparkles.retain(|s| !s.is_expired());
		self.enforce_cap();
	}

	/// Spawn `count` sparkles around `(x, y)`, jittered by up to `jitter` px.
	pub fn burst<R: Rng>(&mut self, x: f64, y: f64, count: usize, jitter: f64, rng: &mut R) {
		for _ in 0..count {
			let jx = -jitter + unit(rng) * jitter * 2.0;
			let jy = -jitter + unit(rng) * jitter * 2.0;
			self.sparkles.push(Sparkle::spawn(x + jx, y + jy, rng));
		}
		self.enforce_cap();
	}

	/// Drop the oldest sparkles beyond the cap.
	fn enforce_cap(&mut self) {
		if self.sparkles.len() > self.sparkle_cap {
			let excess = self.sparkles.len() - self.sparkle_cap;
			self.sparkles.drain(..excess);
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	fn rng() -> SmallRng {
		SmallRng::seed_from_u64(7)
	}

	#[test]
	fn desktop_rain_seeds_one_column_per_slot() {
		let config = EngineConfig::default();
		let rain = CodeRain::seed(&config, 1280.0, 800.0, &mut rng());
		assert_eq!(rain.columns.len(), 80);
		assert_eq!(rain.columns[1].x, 16.0);
		assert!(rain.columns.iter().all(|c| (0.0..800.0).contains(&c.y)));
		assert!(rain.columns.iter().all(|c| (0.85..1.9).contains(&c.speed)));
		assert!(rain.columns.iter().all(|c| (12.0..24.0).contains(&c.step)));
	}

	#[test]
	fn mobile_rain_uses_wider_columns() {
		let config = EngineConfig::default();
		let rain = CodeRain::seed(&config, 375.0, 700.0, &mut rng());
		assert_eq!(rain.column_width, 18.0);
		assert_eq!(rain.columns.len(), 20);
	}

	#[test]
	fn column_recycles_to_top() {
		let config = EngineConfig::default();
		let mut rng = rng();
		let mut rain = CodeRain::seed(&config, 160.0, 100.0, &mut rng);
		rain.columns[0].y = 139.9;
		rain.columns[0].speed = 1.0;
		rain.update(1.0 / 60.0, &mut rng);
		let col = &rain.columns[0];
		assert_eq!(col.y, -20.0);
		assert!((0.65..1.9).contains(&col.speed));
		assert_eq!(rain.columns.len(), 8);
	}

	#[test]
	fn petal_count_respects_profile_bounds() {
		let config = EngineConfig::default();
		assert_eq!(PetalField::petal_count(&config, 1280.0, 800.0), 28);
		assert_eq!(PetalField::petal_count(&config, 3840.0, 2160.0), 52);
		assert_eq!(PetalField::petal_count(&config, 900.0, 300.0), 16);
		assert_eq!(PetalField::petal_count(&config, 800.0, 4000.0), 34);
	}

	#[test]
	fn petal_leaving_bottom_respawns_above_top() {
		let config = EngineConfig::default();
		let mut rng = rng();
		let mut field = PetalField::seed(&config, 1280.0, 800.0, &mut rng);
		let before = field.petals.len();
		field.petals[3].y = 845.0;
		field.petals[3].x = 600.0;
		field.update(0.016, &mut rng);
		assert!(field.petals[3].y < 0.0);
		assert_eq!(field.petals.len(), before);
	}

	#[test]
	fn petal_drifting_sideways_is_replaced() {
		let config = EngineConfig::default();
		let mut rng = rng();
		let mut field = PetalField::seed(&config, 1280.0, 800.0, &mut rng);
		field.petals[0].x = -200.0;
		field.petals[0].y = 400.0;
		field.update(0.016, &mut rng);
		assert!(field.petals[0].y < 0.0);
		assert!((0.0..1280.0).contains(&field.petals[0].x));
	}

	#[test]
	fn burst_spawns_near_press_point() {
		let config = EngineConfig::default();
		let mut rng = rng();
		let mut field = PetalField::seed(&config, 1280.0, 800.0, &mut rng);
		field.burst(500.0, 300.0, 6, 6.0, &mut rng);
		assert_eq!(field.sparkles.len(), 6);
		for s in &field.sparkles {
			assert!((s.x - 500.0).abs() <= 6.0);
			assert!((s.y - 300.0).abs() <= 6.0);
			assert_eq!(s.age, 0.0);
		}
	}

	#[test]
	fn sparkles_fade_and_expire() {
		let config = EngineConfig::default();
		let mut rng = rng();
		let mut field = PetalField::seed(&config, 1280.0, 800.0, &mut rng);
		field.burst(100.0, 100.0, 3, 0.0, &mut rng);
		let start_alpha = field.sparkles[0].current_alpha();
		field.update(0.05, &mut rng);
		assert!(field.sparkles[0].current_alpha() < start_alpha);
		for _ in 0..41 {
			field.update(0.05, &mut rng);
		}
		assert!(field.sparkles.is_empty());
	}

	#[test]
	fn cap_drops_oldest_first() {
		let config = EngineConfig {
			sparkle_cap: 10,
			..EngineConfig::default()
		};
		let mut rng = rng();
		let mut field = PetalField::seed(&config, 1280.0, 800.0, &mut rng);
		field.burst(0.0, 0.0, 6, 0.0, &mut rng);
		field.burst(1000.0, 0.0, 6, 0.0, &mut rng);
		assert_eq!(field.sparkles.len(), 10);
		assert_eq!(field.sparkles.iter().filter(|s| s.x == 0.0).count(), 4);
		assert_eq!(field.sparkles.last().map(|s| s.x), Some(1000.0));
	}

	#[cfg(not(target_arch = "wasm32"))]
	mod props {
		use proptest::prelude::*;

		use super::*;

		proptest! {
			#[test]
			fn seeded_populations_follow_viewport(w in 1.0f64..5000.0, h in 1.0f64..5000.0, seed in any::<u64>()) {
				let config = EngineConfig::default();
				let mut rng = SmallRng::seed_from_u64(seed);
				let density = config.density(w).clone();

				let rain = CodeRain::seed(&config, w, h, &mut rng);
				prop_assert_eq!(rain.columns.len(), (w / density.column_width).floor() as usize);

				let field = PetalField::seed(&config, w, h, &mut rng);
				prop_assert!(field.petals.len() >= config.petal_min);
				prop_assert!(field.petals.len() <= density.petal_max);
			}

			#[test]
			fn sparkles_never_exceed_cap(bursts in prop::collection::vec((0.0f64..1280.0, 0.0f64..800.0, 0usize..20), 0..40), seed in any::<u64>()) {
				let config = EngineConfig::default();
				let mut rng = SmallRng::seed_from_u64(seed);
				let mut field = PetalField::seed(&config, 1280.0, 800.0, &mut rng);
				for (x, y, n) in bursts {
					field.burst(x, y, n, config.sparkle_jitter, &mut rng);
					prop_assert!(field.sparkles.len() <= config.sparkle_cap);
					field.update(0.016, &mut rng);
					prop_assert!(field.sparkles.len() <= config.sparkle_cap);
				}
			}
		}
	}
}
