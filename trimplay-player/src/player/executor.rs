use crate::engine::{MediaEngine, MediaEngineAdapter};
use crate::playback::error::PlaybackError;
use crate::playback::operation::{Completion, EngineCommand, Operation};
use crate::player::resource_loader::ResourceLoader;
use crate::visibility::session_id::SessionId;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::{debug, trace};

/// A completion together with the session whose operation produced it.
#[derive(Debug)]
pub struct TaggedCompletion {
	pub session_id: SessionId,
	pub completion: Completion,
}

struct TaggedOperation {
	session_id: SessionId,
	operation: Operation,
}

/// Runs operations against the engine one at a time.
///
/// While an operation is in flight, only the most recently submitted one waits behind it.
/// Anything submitted earlier has been superseded by the time it could run and never
/// reaches the engine.
pub struct OperationExecutor {
	engine: MediaEngine,
	loader: ResourceLoader,
	in_flight: Option<BoxFuture<'static, TaggedCompletion>>,
	queued: Option<TaggedOperation>,
}

impl OperationExecutor {
	pub fn new(engine: MediaEngine) -> Self {
		let loader = ResourceLoader::new(engine.clone());
		Self {
			engine,
			loader,
			in_flight: None,
			queued: None,
		}
	}

	pub fn submit(&mut self, session_id: SessionId, operation: Operation) {
		let operation = TaggedOperation { session_id, operation };
		if self.in_flight.is_none() {
			self.start(operation);
			return;
		}

		if let Some(superseded) = self.queued.replace(operation) {
			debug!(
				session_id = %superseded.session_id,
				token = %superseded.operation.token,
				"Dropping superseded operation before it reached the engine."
			);
		}
	}

	/// Drops the waiting operation. The one in flight runs to completion.
	pub fn discard_queued(&mut self) {
		if let Some(discarded) = self.queued.take() {
			debug!(token = %discarded.operation.token, "Discarded queued operation.");
		}
	}

	#[cfg(test)]
	pub fn is_idle(&self) -> bool {
		self.in_flight.is_none() && self.queued.is_none()
	}

	/// Waits for the operation in flight and starts the queued one. Returns `None` right
	/// away if nothing is in flight.
	///
	/// Cancel safe: the in-flight operation is kept if this future is dropped.
	pub async fn next_completion(&mut self) -> Option<TaggedCompletion> {
		let in_flight = self.in_flight.as_mut()?;
		let completion = in_flight.await;
		self.in_flight = None;
		if let Some(queued) = self.queued.take() {
			self.start(queued);
		}
		Some(completion)
	}

	fn start(&mut self, TaggedOperation { session_id, operation }: TaggedOperation) {
		trace!(%session_id, token = %operation.token, purpose = ?operation.purpose, "Starting operation.");
		let engine = self.engine.clone();
		let loader = self.loader.clone();
		self.in_flight = Some(
			async move {
				let completion = execute(engine.as_ref(), &loader, operation).await;
				TaggedCompletion {
					session_id,
					completion,
				}
			}
			.boxed(),
		);
	}
}

async fn execute(engine: &dyn MediaEngineAdapter, loader: &ResourceLoader, operation: Operation) -> Completion {
	let mut loaded = None;
	for command in &operation.commands {
		let result = match command {
			EngineCommand::Load(resource) => match loader.load(resource).await {
				Ok(result) => {
					loaded = Some(result);
					Ok(())
				}
				Err(error) => Err(error),
			},
			EngineCommand::Play => engine.play().await,
			EngineCommand::Pause => engine.pause().await,
			EngineCommand::Seek(position) => engine.seek(*position).await,
		};

		if let Err(source) = result {
			return Completion::failed(
				operation.token,
				PlaybackError::EngineCommandFailed {
					command: command.kind(),
					source,
				},
			);
		}
	}

	match loaded {
		Some(loaded) => Completion::loaded(operation.token, loaded),
		None => Completion::succeeded(operation.token),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::engine::{EngineCommandKind, EngineError, Loaded};
	use crate::playback::operation::{OperationPurpose, OperationToken};
	use crate::utils::fake_engine::FakeEngine;
	use crate::visibility::session_id::SessionIdSequence;
	use std::time::Duration;

	fn operation(token: u64, commands: Vec<EngineCommand>) -> Operation {
		Operation {
			token: OperationToken::from(token),
			purpose: OperationPurpose::Pause,
			commands,
		}
	}

	#[tokio::test]
	async fn should_return_none_when_idle() {
		let engine = FakeEngine::new(None);
		let mut executor = OperationExecutor::new(engine.as_media_engine());

		assert!(executor.is_idle());
		assert!(executor.next_completion().await.is_none());
	}

	#[tokio::test]
	async fn should_execute_commands_in_order() {
		let engine = FakeEngine::new(None);
		let mut executor = OperationExecutor::new(engine.as_media_engine());
		let session_id = SessionIdSequence::default().next();

		executor.submit(
			session_id,
			operation(0, vec![EngineCommand::Pause, EngineCommand::Seek(Duration::from_secs(5))]),
		);
		let TaggedCompletion {
			session_id: completed_session_id,
			completion,
		} = executor.next_completion().await.expect("Nothing in flight");

		assert_eq!(session_id, completed_session_id);
		assert_eq!(Completion::succeeded(OperationToken::from(0)), completion);
		assert_eq!(
			vec![EngineCommand::Pause, EngineCommand::Seek(Duration::from_secs(5))],
			engine.commands()
		);
		assert!(executor.is_idle());
	}

	#[tokio::test]
	async fn should_stop_at_the_first_failing_command() {
		let engine = FakeEngine::new(None);
		engine.fail_next(EngineCommandKind::Pause);
		let mut executor = OperationExecutor::new(engine.as_media_engine());

		executor.submit(
			SessionIdSequence::default().next(),
			operation(0, vec![EngineCommand::Pause, EngineCommand::Seek(Duration::from_secs(5))]),
		);
		let completion = executor.next_completion().await.expect("Nothing in flight").completion;

		assert!(matches!(
			completion.result,
			Err(PlaybackError::EngineCommandFailed {
				command: EngineCommandKind::Pause,
				source: EngineError::Rejected(_),
			})
		));
		assert_eq!(vec![EngineCommand::Pause], engine.commands());
	}

	#[tokio::test]
	async fn should_report_what_was_loaded() {
		let engine = FakeEngine::new(Some(Duration::from_secs(60)));
		let mut executor = OperationExecutor::new(engine.as_media_engine());

		executor.submit(
			SessionIdSequence::default().next(),
			operation(0, vec![EngineCommand::Load("clip".into())]),
		);
		let completion = executor.next_completion().await.expect("Nothing in flight").completion;

		assert_eq!(
			Completion::loaded(
				OperationToken::from(0),
				Loaded {
					duration: Some(Duration::from_secs(60))
				}
			),
			completion
		);
	}

	#[tokio::test]
	async fn should_only_keep_the_latest_queued_operation() {
		let engine = FakeEngine::new(None);
		let mut executor = OperationExecutor::new(engine.as_media_engine());
		let session_id = SessionIdSequence::default().next();

		executor.submit(session_id, operation(0, vec![EngineCommand::Play]));
		executor.submit(session_id, operation(1, vec![EngineCommand::Pause]));
		executor.submit(session_id, operation(2, vec![EngineCommand::Seek(Duration::from_secs(1))]));

		let first = executor.next_completion().await.expect("Nothing in flight");
		let second = executor.next_completion().await.expect("Nothing in flight");

		assert_eq!(OperationToken::from(0), first.completion.token);
		assert_eq!(OperationToken::from(2), second.completion.token);
		assert!(executor.next_completion().await.is_none());
		assert_eq!(
			vec![EngineCommand::Play, EngineCommand::Seek(Duration::from_secs(1))],
			engine.commands()
		);
	}

	#[tokio::test]
	async fn discarding_should_keep_the_operation_in_flight() {
		let engine = FakeEngine::new(None);
		let mut executor = OperationExecutor::new(engine.as_media_engine());
		let session_id = SessionIdSequence::default().next();

		executor.submit(session_id, operation(0, vec![EngineCommand::Play]));
		executor.submit(session_id, operation(1, vec![EngineCommand::Pause]));
		executor.discard_queued();

		let completion = executor.next_completion().await.expect("Nothing in flight");

		assert_eq!(OperationToken::from(0), completion.completion.token);
		assert!(executor.is_idle());
		assert_eq!(vec![EngineCommand::Play], engine.commands());
	}
}
