//! Explicit frame loop on top of the platform's frame callback.
//!
//! The browser's `requestAnimationFrame` is modelled by [`FrameScheduler`];
//! [`FrameLoop`] keeps at most one pending [`FrameToken`], so "exactly one
//! active loop" holds by construction: starting a running loop does nothing,
//! and stopping cancels the pending request synchronously.

/// Handle of a requested frame (the `requestAnimationFrame` id).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken(pub i32);

/// Platform primitive that runs a callback before the next repaint.
pub trait FrameScheduler {
	/// Request one frame callback. `None` when the platform refused.
	fn request_frame(&mut self) -> Option<FrameToken>;
	/// Cancel a previously requested frame.
	fn cancel_frame(&mut self, token: FrameToken);
}

/// Outcome of the timing check at the start of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
	/// Too soon after the last drawn frame; reschedule without drawing.
	Skip,
	/// Draw this frame.
	Run {
		/// Physics step in seconds, clamped.
		dt: f64,
		/// Milliseconds since the last drawn frame.
		gap_ms: f64,
	},
}

/// Loop state: running flag, pending request, and last drawn timestamp.
#[derive(Clone, Debug, Default)]
pub struct FrameLoop {
	running: bool,
	pending: Option<FrameToken>,
	last: Option<f64>,
}

impl FrameLoop {
	pub fn is_running(&self) -> bool {
		self.running
	}

	#[cfg(test)]
	pub fn pending(&self) -> Option<FrameToken> {
		self.pending
	}

	/// Start the loop. Returns `false` if it was already running or the
	/// platform refused the first frame.
	pub fn start<S: FrameScheduler>(&mut self, scheduler: &mut S) -> bool {
		if self.running {
			return false;
		}
		self.running = true;
		self.schedule(scheduler);
		if self.pending.is_none() {
			self.running = false;
		}
		self.running
	}

	/// Stop the loop and cancel the pending frame, if any.
	///
	/// The last drawn timestamp survives, so the first frame after a restart
	/// reports the whole pause as its gap.
	pub fn stop<S: FrameScheduler>(&mut self, scheduler: &mut S) {
		self.running = false;
		if let Some(token) = self.pending.take() {
			scheduler.cancel_frame(token);
		}
	}

	/// Request the next frame, replacing any request still pending.
	pub fn schedule<S: FrameScheduler>(&mut self, scheduler: &mut S) {
		if let Some(token) = self.pending.take() {
			scheduler.cancel_frame(token);
		}
		self.pending = scheduler.request_frame();
	}

	/// Timing check for a frame callback fired at `timestamp` (ms).
	///
	/// Consumes the pending token. Returns `None` when the loop is not running
	/// (a stale callback), in which case nothing must be rescheduled.
	pub fn begin(&mut self, timestamp: f64, min_interval_ms: f64, max_step_secs: f64) -> Option<Tick> {
		self.pending = None;
		if !self.running {
			return None;
		}
		let last = *self.last.get_or_insert(timestamp);
		let gap_ms = timestamp - last;
		if gap_ms < min_interval_ms {
			return Some(Tick::Skip);
		}
		self.last = Some(timestamp);
		Some(Tick::Run {
			dt: (gap_ms / 1000.0).clamp(0.0, max_step_secs),
			gap_ms,
		})
	}
}
