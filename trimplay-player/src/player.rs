use crate::engine::{MediaEngine, StatusSample};
use crate::playback::boundary::BoundaryPolicy;
use crate::playback::error::PlaybackError;
use crate::player::executor::{OperationExecutor, TaggedCompletion};
use crate::presentation::{PlayerParameters, PlayerStatus};
use crate::visibility::VisibilityGate;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

pub mod executor;
pub mod resource_loader;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gesture {
	Show,
	Hide,
	PlayPause,
	Close,
	Seek(Duration),
}

enum Event {
	Gesture(Gesture),
	Sample(StatusSample),
	Completion(TaggedCompletion),
}

/// Handle to a player running on its own task.
///
/// Gestures are handled in the order they are made. Dropping the handle stops the player
/// once the gestures made so far have been handled.
pub struct Player {
	gesture_sender: mpsc::UnboundedSender<Gesture>,
	status: watch::Receiver<PlayerStatus>,
	task: JoinHandle<()>,
}

impl Player {
	pub fn spawn(engine: MediaEngine, parameters: PlayerParameters, policy: BoundaryPolicy) -> Self {
		let (gesture_sender, gesture_receiver) = mpsc::unbounded_channel();
		let (status_sender, status) = watch::channel(PlayerStatus::default());
		let gate = VisibilityGate::new(parameters, policy);
		let task = tokio::spawn(run_player(engine, gate, gesture_receiver, status_sender));

		Self {
			gesture_sender,
			status,
			task,
		}
	}

	pub fn show(&self) {
		self.send(Gesture::Show);
	}

	pub fn hide(&self) {
		self.send(Gesture::Hide);
	}

	/// Toggles playback. Shows the surface first if it is hidden.
	pub fn on_user_play_pause(&self) {
		self.send(Gesture::PlayPause);
	}

	/// Closes the session and hides the surface.
	pub fn on_close(&self) {
		self.send(Gesture::Close);
	}

	/// Seeks within the trim window. Targets outside of it are clamped.
	pub fn seek(&self, target: Duration) {
		self.send(Gesture::Seek(target));
	}

	pub fn status(&self) -> watch::Receiver<PlayerStatus> {
		self.status.clone()
	}

	/// Stops the player after the gestures made so far have been handled.
	pub async fn shutdown(self) -> Result<(), JoinError> {
		let Self {
			gesture_sender, task, ..
		} = self;
		drop(gesture_sender);
		task.await
	}

	fn send(&self, gesture: Gesture) {
		if self.gesture_sender.send(gesture).is_err() {
			warn!(?gesture, "Player has stopped, dropping gesture.");
		}
	}
}

async fn run_player(
	engine: MediaEngine,
	mut gate: VisibilityGate,
	mut gestures: mpsc::UnboundedReceiver<Gesture>,
	status_sender: watch::Sender<PlayerStatus>,
) {
	let mut samples = engine.subscribe();
	let mut executor = OperationExecutor::new(engine);

	loop {
		let event = tokio::select! {
			gesture = gestures.recv() => match gesture {
				Some(gesture) => Event::Gesture(gesture),
				None => break,
			},
			Some(sample) = samples.next() => Event::Sample(sample),
			Some(completion) = executor.next_completion() => Event::Completion(completion),
		};

		match event {
			Event::Gesture(gesture) => handle_gesture(&mut gate, &mut executor, gesture),
			Event::Sample(sample) => handle_sample(&mut gate, &mut executor, sample),
			Event::Completion(completion) => handle_completion(&mut gate, &mut executor, completion),
		}

		status_sender.send_if_modified(|status| {
			let current = gate.status();
			if *status == current {
				return false;
			}
			*status = current;
			true
		});
	}

	if let Some((session_id, pause)) = gate.hide() {
		debug!(%session_id, "Player stopped with a visible session.");
		if let Some(pause) = pause {
			executor.discard_queued();
			executor.submit(session_id, pause);
			while executor.next_completion().await.is_some() {}
		}
	}
	status_sender.send_replace(gate.status());
	info!("Player stopped.");
}

fn handle_gesture(gate: &mut VisibilityGate, executor: &mut OperationExecutor, gesture: Gesture) {
	match gesture {
		Gesture::Show => {
			gate.show();
		}
		Gesture::Hide | Gesture::Close => {
			if let Some((session_id, pause)) = gate.hide() {
				debug!(%session_id, ?gesture, "Session ended.");
				executor.discard_queued();
				if let Some(pause) = pause {
					executor.submit(session_id, pause);
				}
			}
		}
		Gesture::PlayPause => {
			gate.show();
			if let Some((session_id, controller)) = gate.controller_mut() {
				if let Some(operation) = controller.on_user_play_pause() {
					executor.submit(session_id, operation);
				}
			}
		}
		Gesture::Seek(target) => match gate.controller_mut() {
			Some((session_id, controller)) => {
				if let Some(operation) = controller.seek_to(target) {
					executor.submit(session_id, operation);
				}
			}
			None => debug!(?target, "Ignoring seek while hidden."),
		},
	}
}

fn handle_sample(gate: &mut VisibilityGate, executor: &mut OperationExecutor, sample: StatusSample) {
	if let Some((session_id, controller)) = gate.controller_mut() {
		if let Some(operation) = controller.on_status_sample(sample) {
			executor.submit(session_id, operation);
		}
	}
}

fn handle_completion(
	gate: &mut VisibilityGate,
	executor: &mut OperationExecutor,
	TaggedCompletion {
		session_id,
		completion,
	}: TaggedCompletion,
) {
	let Some(controller) = gate.controller_of(session_id) else {
		debug!(%session_id, token = %completion.token, "Discarding completion of an ended session.");
		return;
	};

	match controller.on_operation_completed(completion) {
		Ok(Some(operation)) => executor.submit(session_id, operation),
		Ok(None) => {}
		Err(error @ PlaybackError::StaleOperationDiscarded(_)) => debug!(%session_id, %error),
		Err(error) => error!(%session_id, %error, "Failed to apply operation completion."),
	}
}
