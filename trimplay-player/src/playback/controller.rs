use crate::engine::{EngineCommandKind, Loaded, ResourceReference, StatusSample};
use crate::playback::boundary::{BoundaryPolicy, Bounds, Enforcement};
use crate::playback::error::PlaybackError;
use crate::playback::operation::{
	Completion, EngineCommand, Operation, OperationPurpose, OperationTokenSequence,
};
use crate::playback::session::{PendingOperation, PlaybackSession};
use crate::playback::state::PlaybackState;
use crate::presentation::PresentationFacts;
use crate::trim_window::TrimWindow;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// State machine for playing a trimmed segment.
///
/// The controller never talks to the engine itself. Every entry point returns the
/// [`Operation`] that should be executed next, if any, and the executor reports back
/// through [`PlaybackController::on_operation_completed`]. At most one operation is pending
/// at a time; issuing a new one supersedes the previous, whose completion is then discarded.
pub struct PlaybackController {
	session: PlaybackSession,
	tokens: OperationTokenSequence,
	policy: BoundaryPolicy,
}

impl PlaybackController {
	pub fn new(resource: ResourceReference, trim_window: TrimWindow, policy: BoundaryPolicy) -> Self {
		Self {
			session: PlaybackSession::new(resource, trim_window),
			tokens: Default::default(),
			policy,
		}
	}

	pub fn session(&self) -> &PlaybackSession {
		&self.session
	}

	pub fn state(&self) -> PlaybackState {
		self.session.state
	}

	pub fn facts(&self) -> PresentationFacts {
		use PlaybackState::*;
		let state = self.session.state;
		PresentationFacts {
			is_playing: matches!(state, Playing | SeekingInternal { resume_playback: true }),
			is_poster_visible: state == Closed || !self.session.has_performed_initial_seek,
		}
	}

	/// The user tapped play/pause.
	pub fn on_user_play_pause(&mut self) -> Option<Operation> {
		use PlaybackState::*;
		match self.session.state {
			AwaitingFirstGesture => self.request_load(),
			Loading | SeekingToStart => {
				debug!("Play requested while initializing, playback starts once ready.");
				None
			}
			Ready => Some(self.resume()),
			Playing => Some(self.pause()),
			SeekingInternal { resume_playback } => {
				self.session.state = SeekingInternal {
					resume_playback: !resume_playback,
				};
				None
			}
			Closed => {
				debug!("Ignoring play/pause on a closed session.");
				None
			}
		}
	}

	/// The user moved the scrubber. The target is clamped into the trim window.
	pub fn seek_to(&mut self, target: Duration) -> Option<Operation> {
		use PlaybackState::*;
		let clamped_target = self.policy.clamp(target, self.bounds());
		let resume_playback = match self.session.state {
			Ready => false,
			Playing => true,
			SeekingInternal { resume_playback } => resume_playback,
			state => {
				debug!(?state, ?target, "Ignoring seek, the session can't seek yet.");
				return None;
			}
		};

		let was_playing = self.facts().is_playing;
		debug!(?target, ?clamped_target, "Seeking.");
		self.session.state = SeekingInternal { resume_playback };
		Some(self.issue(
			OperationPurpose::Seek {
				target: clamped_target,
				was_playing,
			},
			vec![EngineCommand::Pause, EngineCommand::Seek(clamped_target)],
		))
	}

	/// The engine reported its status.
	pub fn on_status_sample(&mut self, sample: StatusSample) -> Option<Operation> {
		use PlaybackState::*;
		if self.session.state == Closed {
			return None;
		}

		if let Some(duration) = sample.duration {
			if let Err(error) = self.resolve_duration(duration) {
				self.fail_unplayable(&error);
				return None;
			}
		}

		match self.session.state {
			Closed | AwaitingFirstGesture => None,
			Loading if sample.is_loaded => {
				debug!("Engine reports the resource as loaded.");
				Some(self.begin_initial_seek())
			}
			Loading => None,
			_ if self.session.pending_operation.is_some() => {
				trace!(position = ?sample.position, "Operation pending, not enforcing boundaries.");
				None
			}
			state @ (SeekingToStart | SeekingInternal { .. }) => {
				error!(?state, "Seeking without a pending operation.");
				None
			}
			Playing => {
				self.session.last_known_position = sample.position;
				match self.policy.evaluate(Playing, sample.position, self.bounds()) {
					Enforcement::HardStop => Some(self.stop_at_boundary(false)),
					Enforcement::None | Enforcement::DriftCorrection => None,
				}
			}
			Ready => {
				self.session.last_known_position = sample.position;
				match self.policy.evaluate(Ready, sample.position, self.bounds()) {
					Enforcement::DriftCorrection => Some(self.correct_drift()),
					Enforcement::None | Enforcement::HardStop => None,
				}
			}
		}
	}

	/// An issued operation finished. Completions of superseded or cancelled operations are
	/// rejected with [`PlaybackError::StaleOperationDiscarded`] and change nothing.
	pub fn on_operation_completed(&mut self, completion: Completion) -> Result<Option<Operation>, PlaybackError> {
		let pending = match self.session.pending_operation {
			Some(pending) if pending.token == completion.token => pending,
			_ => return Err(PlaybackError::StaleOperationDiscarded(completion.token)),
		};
		self.session.pending_operation = None;

		match completion.result {
			Ok(loaded) => self.complete(pending.purpose, loaded),
			Err(error) => Ok(self.recover(pending.purpose, &error)),
		}
	}

	/// Ends the session. Safe to call in any state, including while an operation is in flight.
	///
	/// Once playback may have been started, returns a pause so the engine doesn't keep
	/// playing without anyone enforcing the trim window. Its completion is stale.
	pub fn close(&mut self) -> Option<Operation> {
		if self.session.state == PlaybackState::Closed {
			return None;
		}

		if let Some(pending) = self.session.pending_operation.take() {
			debug!(token = %pending.token, "Cancelling pending operation.");
		}
		self.session.state = PlaybackState::Closed;
		if let Some(resource) = self.session.resource.take() {
			info!(%resource, "Closed playback session.");
		}

		self.session.has_performed_initial_seek.then(|| Operation {
			token: self.tokens.next(),
			purpose: OperationPurpose::Pause,
			commands: vec![EngineCommand::Pause],
		})
	}

	fn complete(&mut self, purpose: OperationPurpose, loaded: Option<Loaded>) -> Result<Option<Operation>, PlaybackError> {
		use OperationPurpose::*;
		use PlaybackState::*;
		match (purpose, self.session.state) {
			(Load, Loading) => {
				if let Some(duration) = loaded.and_then(|loaded| loaded.duration) {
					if let Err(error) = self.resolve_duration(duration) {
						self.fail_unplayable(&error);
						return Ok(None);
					}
				}
				Ok(Some(self.begin_initial_seek()))
			}
			(InitialSeek, SeekingToStart) => {
				info!(start = ?self.session.start(), "Starting playback.");
				self.session.has_performed_initial_seek = true;
				self.session.last_known_position = self.session.start();
				self.session.state = Playing;
				Ok(Some(self.issue(InitialPlay, vec![EngineCommand::Play])))
			}
			(Seek { target, .. }, SeekingInternal { resume_playback }) => {
				self.session.last_known_position = target;
				if resume_playback {
					self.session.state = Playing;
					Ok(Some(self.issue(Resume, vec![EngineCommand::Play])))
				} else {
					self.session.state = Ready;
					Ok(None)
				}
			}
			(DriftCorrection { target }, Ready) => {
				self.session.last_known_position = target;
				Ok(None)
			}
			(InitialPlay | Resume, Playing) | (Pause | BoundaryStop { .. }, Ready) => Ok(None),
			(purpose, state) => Err(PlaybackError::InvariantViolation(format!(
				"Operation {purpose:?} completed in state {state:?}."
			))),
		}
	}

	fn recover(&mut self, purpose: OperationPurpose, error: &PlaybackError) -> Option<Operation> {
		use OperationPurpose::*;
		warn!(%error, ?purpose, "Engine operation failed.");
		match purpose {
			Load | InitialSeek | InitialPlay => {
				self.revert_to_awaiting_first_gesture();
				None
			}
			BoundaryStop { is_retry: false } => Some(self.stop_at_boundary(true)),
			BoundaryStop { is_retry: true } | Pause => {
				self.session.state = PlaybackState::Playing;
				None
			}
			Resume => {
				self.session.state = PlaybackState::Ready;
				None
			}
			Seek { was_playing, .. } => {
				let pause_failed = matches!(
					error,
					PlaybackError::EngineCommandFailed {
						command: EngineCommandKind::Pause,
						..
					}
				);
				self.session.state = if pause_failed && was_playing {
					PlaybackState::Playing
				} else {
					PlaybackState::Ready
				};
				None
			}
			DriftCorrection { .. } => None,
		}
	}

	fn request_load(&mut self) -> Option<Operation> {
		if self.session.has_load_been_requested {
			return None;
		}
		let resource = self.session.resource.clone()?;

		info!(%resource, "Loading resource.");
		self.session.has_load_been_requested = true;
		self.session.state = PlaybackState::Loading;
		Some(self.issue(OperationPurpose::Load, vec![EngineCommand::Load(resource)]))
	}

	fn begin_initial_seek(&mut self) -> Operation {
		let start = self.session.start();
		self.session.state = PlaybackState::SeekingToStart;
		self.issue(OperationPurpose::InitialSeek, vec![EngineCommand::Seek(start)])
	}

	fn resume(&mut self) -> Operation {
		let position = self.session.last_known_position;
		if self.session.is_within_window(position) {
			self.session.state = PlaybackState::Playing;
			return self.issue(OperationPurpose::Resume, vec![EngineCommand::Play]);
		}

		let start = self.session.start();
		debug!(?position, ?start, "Resuming outside of the trim window, seeking to its start first.");
		self.session.state = PlaybackState::SeekingInternal { resume_playback: true };
		self.issue(
			OperationPurpose::Seek {
				target: start,
				was_playing: false,
			},
			vec![EngineCommand::Seek(start)],
		)
	}

	fn pause(&mut self) -> Operation {
		self.session.state = PlaybackState::Ready;
		self.issue(OperationPurpose::Pause, vec![EngineCommand::Pause])
	}

	fn stop_at_boundary(&mut self, is_retry: bool) -> Operation {
		let start = self.session.start();
		if is_retry {
			info!(?start, "Retrying to stop at the end of the trim window.");
		} else {
			info!(position = ?self.session.last_known_position, ?start, "Reached the end of the trim window, stopping.");
		}

		self.session.state = PlaybackState::Ready;
		self.session.last_known_position = start;
		self.issue(
			OperationPurpose::BoundaryStop { is_retry },
			vec![EngineCommand::Pause, EngineCommand::Seek(start)],
		)
	}

	fn correct_drift(&mut self) -> Operation {
		let start = self.session.start();
		info!(position = ?self.session.last_known_position, ?start, "Paused position drifted out of the trim window.");
		self.issue(
			OperationPurpose::DriftCorrection { target: start },
			vec![EngineCommand::Seek(start)],
		)
	}

	fn resolve_duration(&mut self, duration: Duration) -> Result<(), PlaybackError> {
		if self.session.resolved_duration.is_some() {
			return Ok(());
		}

		let resolved = self.session.trim_window.resolve(duration)?;
		debug!(?duration, end = ?resolved.end, "Resolved trim window.");
		self.session.resolved_duration = Some(duration);
		Ok(())
	}

	fn fail_unplayable(&mut self, error: &PlaybackError) {
		if self.session.has_performed_initial_seek {
			error!(%error, "Resource doesn't fit the trim window.");
		} else {
			warn!(%error, "Resource doesn't fit the trim window.");
			self.revert_to_awaiting_first_gesture();
		}
	}

	fn revert_to_awaiting_first_gesture(&mut self) {
		info!("Initialization failed, waiting for the user to try again.");
		self.session.state = PlaybackState::AwaitingFirstGesture;
		self.session.pending_operation = None;
		self.session.has_load_been_requested = false;
		self.session.has_performed_initial_seek = false;
		self.session.last_known_position = self.session.start();
	}

	fn issue(&mut self, purpose: OperationPurpose, commands: Vec<EngineCommand>) -> Operation {
		let token = self.tokens.next();
		if let Some(superseded) = self
			.session
			.pending_operation
			.replace(PendingOperation { token, purpose })
		{
			debug!(superseded = %superseded.token, %token, "Superseding pending operation.");
		}

		trace!(%token, ?purpose, ?commands, "Issuing operation.");
		Operation {
			token,
			purpose,
			commands,
		}
	}

	fn bounds(&self) -> Bounds {
		Bounds {
			start: self.session.start(),
			end: self.session.end(),
		}
	}
}
