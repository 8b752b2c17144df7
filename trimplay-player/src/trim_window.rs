use std::time::Duration;
use thiserror::Error;

/// Where a trim window ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimEnd {
	At(Duration),
	/// Extends to the end of the resource once its duration is known.
	Unbounded,
}

/// The `[start, end)` part of a resource that is eligible for playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrimWindow {
	start: Duration,
	end: TrimEnd,
}

/// A trim window whose end is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedTrimWindow {
	pub start: Duration,
	pub end: Duration,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimWindowError {
	#[error("Trim window ends at {end:?}, which is not after its start at {start:?}.")]
	EmptyWindow { start: Duration, end: Duration },
	#[error("Trim window starts at {start:?}, which is not before the end of the resource at {duration:?}.")]
	StartBeyondResource { start: Duration, duration: Duration },
}

impl TrimWindow {
	pub fn new(start: Duration, end: Option<Duration>) -> Result<Self, TrimWindowError> {
		match end {
			Some(end) if end <= start => Err(TrimWindowError::EmptyWindow { start, end }),
			Some(end) => Ok(Self {
				start,
				end: TrimEnd::At(end),
			}),
			None => Ok(Self::unbounded_from(start)),
		}
	}

	pub fn unbounded_from(start: Duration) -> Self {
		Self {
			start,
			end: TrimEnd::Unbounded,
		}
	}

	pub fn start(&self) -> Duration {
		self.start
	}

	pub fn end(&self) -> TrimEnd {
		self.end
	}

	/// Resolves the end against the duration of the resource.
	/// A bounded end past the end of the resource is cut to the duration.
	pub fn resolve(&self, duration: Duration) -> Result<ResolvedTrimWindow, TrimWindowError> {
		if self.start >= duration {
			return Err(TrimWindowError::StartBeyondResource {
				start: self.start,
				duration,
			});
		}

		let end = match self.end {
			TrimEnd::At(end) => end.min(duration),
			TrimEnd::Unbounded => duration,
		};
		Ok(ResolvedTrimWindow { start: self.start, end })
	}

	/// The end as far as it is known, given the (maybe not yet known) duration of the resource.
	pub fn effective_end(&self, resolved_duration: Option<Duration>) -> Option<Duration> {
		match (self.end, resolved_duration) {
			(TrimEnd::At(end), Some(duration)) => Some(end.min(duration)),
			(TrimEnd::At(end), None) => Some(end),
			(TrimEnd::Unbounded, duration) => duration,
		}
	}
}
