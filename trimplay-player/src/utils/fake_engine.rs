use crate::engine::{
	EngineCommandKind, EngineError, Loaded, MediaEngine, MediaEngineAdapter, ResourceReference, StatusSample,
	StatusSubscription,
};
use crate::playback::operation::EngineCommand;
use async_trait::async_trait;
use futures_util::{StreamExt, future};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, broadcast, watch};
use tokio_stream::wrappers::BroadcastStream;

/// Records every command and lets tests decide when loads finish, which commands fail
/// and which status samples get reported.
pub struct FakeEngine {
	duration: Option<Duration>,
	commands: Mutex<Vec<EngineCommand>>,
	command_count: watch::Sender<usize>,
	load_gate: Semaphore,
	failures: Mutex<VecDeque<EngineCommandKind>>,
	samples: broadcast::Sender<StatusSample>,
}

impl FakeEngine {
	pub fn new(duration: Option<Duration>) -> Arc<Self> {
		Self::with_load_permits(duration, Semaphore::MAX_PERMITS)
	}

	/// Loads don't finish until [`FakeEngine::release_load`] is called.
	pub fn with_gated_load(duration: Option<Duration>) -> Arc<Self> {
		Self::with_load_permits(duration, 0)
	}

	fn with_load_permits(duration: Option<Duration>, permits: usize) -> Arc<Self> {
		let (samples, _) = broadcast::channel(64);
		Arc::new(Self {
			duration,
			commands: Default::default(),
			command_count: watch::Sender::new(0),
			load_gate: Semaphore::new(permits),
			failures: Default::default(),
			samples,
		})
	}

	pub fn as_media_engine(self: &Arc<Self>) -> MediaEngine {
		self.clone()
	}

	pub fn release_load(&self) {
		self.load_gate.add_permits(1);
	}

	/// The next command of this kind fails.
	pub fn fail_next(&self, kind: EngineCommandKind) {
		self.failures.lock().push_back(kind);
	}

	pub fn emit(&self, sample: StatusSample) {
		let _ = self.samples.send(sample);
	}

	pub fn commands(&self) -> Vec<EngineCommand> {
		self.commands.lock().clone()
	}

	pub fn load_count(&self) -> usize {
		self.commands
			.lock()
			.iter()
			.filter(|command| matches!(command, EngineCommand::Load(_)))
			.count()
	}

	pub async fn wait_for_commands(&self, count: usize) {
		self.command_count
			.subscribe()
			.wait_for(|recorded| *recorded >= count)
			.await
			.expect("Engine went away");
	}

	fn record(&self, command: EngineCommand) -> Result<(), EngineError> {
		let kind = command.kind();
		let count = {
			let mut commands = self.commands.lock();
			commands.push(command);
			commands.len()
		};
		self.command_count.send_replace(count);

		let mut failures = self.failures.lock();
		if failures.front() == Some(&kind) {
			failures.pop_front();
			return Err(EngineError::Rejected(format!("Injected {kind} failure")));
		}
		Ok(())
	}
}

#[async_trait]
impl MediaEngineAdapter for FakeEngine {
	async fn load(&self, resource: &ResourceReference) -> Result<Loaded, EngineError> {
		let result = self.record(EngineCommand::Load(resource.clone()));
		let _permit = self
			.load_gate
			.acquire()
			.await
			.map_err(|_| EngineError::Rejected(format!("Load of '{resource}' was abandoned")))?;
		result.map(|()| Loaded {
			duration: self.duration,
		})
	}

	async fn play(&self) -> Result<(), EngineError> {
		self.record(EngineCommand::Play)
	}

	async fn pause(&self) -> Result<(), EngineError> {
		self.record(EngineCommand::Pause)
	}

	async fn seek(&self, position: Duration) -> Result<(), EngineError> {
		self.record(EngineCommand::Seek(position))
	}

	fn subscribe(&self) -> StatusSubscription {
		BroadcastStream::new(self.samples.subscribe())
			.filter_map(|sample| future::ready(sample.ok()))
			.boxed()
	}
}
