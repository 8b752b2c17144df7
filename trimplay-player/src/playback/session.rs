use crate::engine::ResourceReference;
use crate::playback::operation::{OperationPurpose, OperationToken};
use crate::playback::state::PlaybackState;
use crate::trim_window::TrimWindow;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingOperation {
	pub token: OperationToken,
	pub purpose: OperationPurpose,
}

/// Everything the controller knows about one showing of the playback surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackSession {
	pub(super) resource: Option<ResourceReference>,
	pub(super) trim_window: TrimWindow,
	pub(super) state: PlaybackState,
	pub(super) last_known_position: Duration,
	pub(super) resolved_duration: Option<Duration>,
	pub(super) pending_operation: Option<PendingOperation>,
	pub(super) has_load_been_requested: bool,
	pub(super) has_performed_initial_seek: bool,
}

impl PlaybackSession {
	pub fn new(resource: ResourceReference, trim_window: TrimWindow) -> Self {
		Self {
			resource: Some(resource),
			trim_window,
			state: PlaybackState::AwaitingFirstGesture,
			last_known_position: trim_window.start(),
			resolved_duration: None,
			pending_operation: None,
			has_load_been_requested: false,
			has_performed_initial_seek: false,
		}
	}

	/// `None` once the session has been closed.
	#[cfg(test)]
	pub fn resource(&self) -> Option<&ResourceReference> {
		self.resource.as_ref()
	}

	pub fn state(&self) -> PlaybackState {
		self.state
	}

	pub fn last_known_position(&self) -> Duration {
		self.last_known_position
	}

	#[cfg(test)]
	pub fn pending_operation(&self) -> Option<PendingOperation> {
		self.pending_operation
	}

	#[cfg(test)]
	pub fn has_load_been_requested(&self) -> bool {
		self.has_load_been_requested
	}

	#[cfg(test)]
	pub fn has_performed_initial_seek(&self) -> bool {
		self.has_performed_initial_seek
	}

	pub fn start(&self) -> Duration {
		self.trim_window.start()
	}

	/// End of the trim window, if it is bounded or the duration of the resource is known.
	pub fn end(&self) -> Option<Duration> {
		self.trim_window.effective_end(self.resolved_duration)
	}

	/// Whether `position` lies within `[start, end)`. Without a known end only the start counts.
	pub fn is_within_window(&self, position: Duration) -> bool {
		position >= self.start() && self.end().is_none_or(|end| position < end)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn session_with_end(end: Option<Duration>) -> PlaybackSession {
		let trim_window = TrimWindow::new(Duration::from_secs(5), end).expect("Invalid window");
		PlaybackSession::new("clip".into(), trim_window)
	}

	#[test]
	fn new_session_should_await_the_first_gesture_at_the_start() {
		let session = session_with_end(Some(Duration::from_secs(12)));

		assert_eq!(PlaybackState::AwaitingFirstGesture, session.state());
		assert_eq!(Duration::from_secs(5), session.last_known_position());
		assert_eq!(None, session.pending_operation());
		assert!(!session.has_load_been_requested());
		assert!(!session.has_performed_initial_seek());
	}

	#[test]
	fn window_should_include_start_and_exclude_end() {
		let session = session_with_end(Some(Duration::from_secs(12)));

		assert!(session.is_within_window(Duration::from_secs(5)));
		assert!(session.is_within_window(Duration::from_millis(11_999)));
		assert!(!session.is_within_window(Duration::from_secs(12)));
		assert!(!session.is_within_window(Duration::from_millis(4_999)));
	}

	#[test]
	fn window_without_known_end_should_only_check_the_start() {
		let session = session_with_end(None);

		assert!(session.is_within_window(Duration::from_secs(3600)));
		assert!(!session.is_within_window(Duration::from_secs(1)));
	}
}
