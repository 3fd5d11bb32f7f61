//! When a click may spawn sparkles.

/// Controls a press must not land on for sparkles to spawn.
pub const INTERACTIVE_SELECTOR: &str =
	"a, button, input, textarea, select, label, summary, [role=button]";

/// A pointer press, already resolved against the DOM by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPress {
	pub x: f64,
	pub y: f64,
	/// `PointerEvent.button`; 0 is the primary button.
	pub button: i16,
	/// The event target is (inside) an element matching [`INTERACTIVE_SELECTOR`].
	pub over_control: bool,
	/// Event timestamp, milliseconds.
	pub time: f64,
}

impl PointerPress {
	pub fn primary(x: f64, y: f64, time: f64) -> Self {
		Self {
			x,
			y,
			button: 0,
			over_control: false,
			time,
		}
	}
}

/// Remembers the last scroll event so clicks during a scroll are ignored.
#[derive(Clone, Debug, Default)]
pub struct ScrollTracker {
	last_scroll: Option<f64>,
}

impl ScrollTracker {
	pub fn note(&mut self, time: f64) {
		self.last_scroll = Some(time);
	}

	/// Whether a scroll event happened within `settle_ms` before `now`.
	pub fn is_scrolling(&self, now: f64, settle_ms: f64) -> bool {
		self.last_scroll
			.is_some_and(|t| now >= t && now - t < settle_ms)
	}
}

/// Why a press did not spawn sparkles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnBlock {
	AnimeOff,
	LowPower,
	CoarsePointer,
	NotPrimary,
	Scrolling,
	OverControl,
}

/// Inputs to the sparkle trigger decision.
#[derive(Clone, Copy, Debug)]
pub struct SpawnContext {
	pub anime: bool,
	pub low_power: bool,
	pub fine_pointer: bool,
	pub scrolling: bool,
}

/// Decide whether `press` may spawn a sparkle burst.
pub fn spawn_policy(press: &PointerPress, ctx: &SpawnContext) -> Result<(), SpawnBlock> {
	if !ctx.anime {
		return Err(SpawnBlock::AnimeOff);
	}
	if ctx.low_power {
		return Err(SpawnBlock::LowPower);
	}
	if !ctx.fine_pointer {
		return Err(SpawnBlock::CoarsePointer);
	}
	if press.button != 0 {
		return Err(SpawnBlock::NotPrimary);
	}
	if ctx.scrolling {
		return Err(SpawnBlock::Scrolling);
	}
	if press.over_control {
		return Err(SpawnBlock::OverControl);
	}
	Ok(())
}
