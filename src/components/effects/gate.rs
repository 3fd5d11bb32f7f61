//! Decides whether any animation may run at all.

use super::config::{EngineConfig, Profile};

/// Platform preferences feeding the gate.
///
/// [`Default`] is the least aggressive reading, used when the platform cannot
/// report a signal: motion allowed, no data saving, fine pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerSignals {
	/// `prefers-reduced-motion: reduce`. Can change while the page is open.
	pub reduced_motion: bool,
	/// `navigator.connection.saveData`. Read once.
	pub save_data: bool,
	/// `pointer: fine`. Coarse-pointer devices get no click sparkles.
	pub fine_pointer: bool,
}

impl Default for PowerSignals {
	fn default() -> Self {
		Self {
			reduced_motion: false,
			save_data: false,
			fine_pointer: true,
		}
	}
}

/// Direction of a reduced-motion preference change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionChange {
	/// Reduced motion was switched on.
	Entered,
	/// Reduced motion was switched off.
	Left,
	Unchanged,
}

/// Combines preference signals and the viewport class into `low_power`.
#[derive(Clone, Debug)]
pub struct PreferenceGate {
	signals: PowerSignals,
	mobile: bool,
	low_power_on_mobile: bool,
}

impl PreferenceGate {
	pub fn new(signals: PowerSignals, config: &EngineConfig, width: f64) -> Self {
		Self {
			signals,
			mobile: config.profile(width) == Profile::Mobile,
			low_power_on_mobile: config.low_power_on_mobile,
		}
	}

	/// When true, no render loop may run.
	pub fn low_power(&self) -> bool {
		self.signals.reduced_motion
			|| self.signals.save_data
			|| (self.mobile && self.low_power_on_mobile)
	}

	pub fn signals(&self) -> PowerSignals {
		self.signals
	}

	/// Record a live reduced-motion change.
	pub fn set_reduced_motion(&mut self, reduced: bool) -> MotionChange {
		if self.signals.reduced_motion == reduced {
			return MotionChange::Unchanged;
		}
		self.signals.reduced_motion = reduced;
		if reduced {
			MotionChange::Entered
		} else {
			MotionChange::Left
		}
	}

	/// Re-classify the viewport after a resize.
	pub fn set_viewport_width(&mut self, config: &EngineConfig, width: f64) {
		self.mobile = config.profile(width) == Profile::Mobile;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn gate(signals: PowerSignals, width: f64) -> PreferenceGate {
		PreferenceGate::new(signals, &EngineConfig::default(), width)
	}

	#[test]
	fn defaults_allow_motion() {
		assert!(!gate(PowerSignals::default(), 1280.0).low_power());
		assert!(!gate(PowerSignals::default(), 375.0).low_power());
	}

	#[test]
	fn reduced_motion_or_save_data_gate_everything() {
		let reduced = PowerSignals {
			reduced_motion: true,
			..PowerSignals::default()
		};
		let save = PowerSignals {
			save_data: true,
			..PowerSignals::default()
		};
		assert!(gate(reduced, 1280.0).low_power());
		assert!(gate(save, 1280.0).low_power());
	}

	#[test]
	fn mobile_gates_only_when_configured() {
		let config = EngineConfig {
			low_power_on_mobile: true,
			..EngineConfig::default()
		};
		let mut gate = PreferenceGate::new(PowerSignals::default(), &config, 375.0);
		assert!(gate.low_power());
		gate.set_viewport_width(&config, 1280.0);
		assert!(!gate.low_power());
	}

	#[test]
	fn reduced_motion_transitions() {
		let mut gate = gate(PowerSignals::default(), 1280.0);
		assert_eq!(gate.set_reduced_motion(false), MotionChange::Unchanged);
		assert_eq!(gate.set_reduced_motion(true), MotionChange::Entered);
		assert!(gate.low_power());
		assert_eq!(gate.set_reduced_motion(true), MotionChange::Unchanged);
		assert_eq!(gate.set_reduced_motion(false), MotionChange::Left);
		assert!(!gate.low_power());
	}

	#[test]
	fn leaving_reduced_motion_keeps_save_data_gate() {
		let mut gate = gate(
			PowerSignals {
				reduced_motion: true,
				save_data: true,
				fine_pointer: true,
			},
			1280.0,
		);
		assert_eq!(gate.set_reduced_motion(false), MotionChange::Left);
		assert!(gate.low_power());
	}
}
