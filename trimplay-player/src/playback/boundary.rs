use crate::playback::state::PlaybackState;
use std::time::Duration;

/// What to do about a reported position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enforcement {
	None,
	/// Pause and go back to the start.
	HardStop,
	/// Seek back to the start without changing whether we play.
	DriftCorrection,
}

/// The trim window as far as it is known right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
	pub start: Duration,
	pub end: Option<Duration>,
}

/// Keeps playback inside the trim window.
///
/// The tolerance absorbs the granularity of status samples: playback is stopped once it
/// gets within one tolerance of the end, and a paused position is only considered drifted
/// when it is more than one tolerance outside of the window. For stopping, the tolerance
/// never exceeds half of the window, so playback doesn't stop right where it starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryPolicy {
	tolerance: Duration,
}

impl BoundaryPolicy {
	pub fn new(tolerance: Duration) -> Self {
		Self { tolerance }
	}

	pub fn tolerance(&self) -> Duration {
		self.tolerance
	}

	pub fn evaluate(&self, state: PlaybackState, position: Duration, bounds: Bounds) -> Enforcement {
		match state {
			PlaybackState::Playing if self.has_reached_end(position, bounds) => Enforcement::HardStop,
			PlaybackState::Ready if self.has_drifted(position, bounds) => Enforcement::DriftCorrection,
			_ => Enforcement::None,
		}
	}

	/// Clamps a seek target into `[start, end]`.
	pub fn clamp(&self, target: Duration, bounds: Bounds) -> Duration {
		let target = target.max(bounds.start);
		match bounds.end {
			Some(end) => target.min(end),
			None => target,
		}
	}

	fn has_reached_end(&self, position: Duration, bounds: Bounds) -> bool {
		bounds.end.is_some_and(|end| {
			let tolerance = self.tolerance.min(end.saturating_sub(bounds.start) / 2);
			position >= end.saturating_sub(tolerance)
		})
	}

	fn has_drifted(&self, position: Duration, bounds: Bounds) -> bool {
		let before_start = position + self.tolerance < bounds.start;
		let after_end = bounds.end.is_some_and(|end| position > end + self.tolerance);
		before_start || after_end
	}
}
