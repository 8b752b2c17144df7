use crate::playback::PlaybackController;
use crate::playback::boundary::BoundaryPolicy;
use crate::playback::operation::Operation;
use crate::presentation::{PlayerParameters, PlayerStatus};
use crate::visibility::session_id::{SessionId, SessionIdSequence};
use tracing::debug;

pub mod session_id;

/// Binds the lifetime of a playback session to the playback surface being shown.
pub struct VisibilityGate {
	parameters: PlayerParameters,
	policy: BoundaryPolicy,
	session_ids: SessionIdSequence,
	session: Option<(SessionId, PlaybackController)>,
}

impl VisibilityGate {
	pub fn new(parameters: PlayerParameters, policy: BoundaryPolicy) -> Self {
		Self {
			parameters,
			policy,
			session_ids: Default::default(),
			session: None,
		}
	}

	#[cfg(test)]
	pub fn is_visible(&self) -> bool {
		self.session.is_some()
	}

	/// Shows the surface, creating a fresh session unless it is already shown.
	pub fn show(&mut self) -> SessionId {
		if let Some((session_id, _)) = &self.session {
			return *session_id;
		}

		let session_id = self.session_ids.next();
		debug!(%session_id, resource = %self.parameters.resource, "Showing playback surface.");
		let controller = PlaybackController::new(
			self.parameters.resource.clone(),
			self.parameters.trim_window,
			self.policy,
		);
		self.session = Some((session_id, controller));
		session_id
	}

	/// Hides the surface, closing and dropping its session. Returns the session together
	/// with the pause that stops the engine, if playback may have been started.
	pub fn hide(&mut self) -> Option<(SessionId, Option<Operation>)> {
		let (session_id, mut controller) = self.session.take()?;
		let pause = controller.close();
		debug!(%session_id, is_pausing = pause.is_some(), "Hid playback surface.");
		Some((session_id, pause))
	}

	#[cfg(test)]
	pub fn current_session_id(&self) -> Option<SessionId> {
		self.session.as_ref().map(|(session_id, _)| *session_id)
	}

	pub fn controller(&self) -> Option<&PlaybackController> {
		self.session.as_ref().map(|(_, controller)| controller)
	}

	pub fn controller_mut(&mut self) -> Option<(SessionId, &mut PlaybackController)> {
		self.session
			.as_mut()
			.map(|(session_id, controller)| (*session_id, controller))
	}

	/// The controller of the given session, if it is still the current one.
	pub fn controller_of(&mut self, session_id: SessionId) -> Option<&mut PlaybackController> {
		self.session
			.as_mut()
			.filter(|(current_session_id, _)| *current_session_id == session_id)
			.map(|(_, controller)| controller)
	}

	pub fn status(&self) -> PlayerStatus {
		let Some(controller) = self.controller() else {
			return PlayerStatus::default();
		};

		let facts = controller.facts();
		PlayerStatus {
			is_visible: true,
			state: Some(controller.state()),
			last_known_position: Some(controller.session().last_known_position()),
			facts,
			poster: self.parameters.poster.clone().filter(|_| facts.is_poster_visible),
		}
	}
}
