use crate::engine::{EngineCommandKind, Loaded, ResourceReference};
use crate::playback::error::PlaybackError;
use std::time::Duration;

/// Identifies one issued operation. Tokens only ever grow, so a completion carrying an
/// older token than the pending one belongs to an operation that has been superseded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("#{_0}")]
pub struct OperationToken(u64);

#[cfg(test)]
impl From<u64> for OperationToken {
	fn from(token: u64) -> Self {
		Self(token)
	}
}

#[derive(Default)]
pub struct OperationTokenSequence {
	next_token: u64,
}

impl OperationTokenSequence {
	pub fn next(&mut self) -> OperationToken {
		let token = OperationToken(self.next_token);
		self.next_token = self
			.next_token
			.checked_add(1)
			.expect("Ran out of operation tokens.");
		token
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCommand {
	Load(ResourceReference),
	Play,
	Pause,
	Seek(Duration),
}

impl EngineCommand {
	pub fn kind(&self) -> EngineCommandKind {
		match self {
			EngineCommand::Load(_) => EngineCommandKind::Load,
			EngineCommand::Play => EngineCommandKind::Play,
			EngineCommand::Pause => EngineCommandKind::Pause,
			EngineCommand::Seek(_) => EngineCommandKind::Seek,
		}
	}
}

/// Why an operation was issued. Decides what its completion does to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationPurpose {
	Load,
	InitialSeek,
	InitialPlay,
	Resume,
	Pause,
	/// Seek while in `SeekingInternal`, either to resume from the start or requested by the user.
	/// `was_playing` is whether the engine was playing when the seek was issued.
	Seek { target: Duration, was_playing: bool },
	BoundaryStop { is_retry: bool },
	DriftCorrection { target: Duration },
}

/// Engine commands to be executed in order, stopping at the first failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
	pub token: OperationToken,
	pub purpose: OperationPurpose,
	pub commands: Vec<EngineCommand>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
	pub token: OperationToken,
	pub result: Result<Option<Loaded>, PlaybackError>,
}

impl Completion {
	pub fn succeeded(token: OperationToken) -> Self {
		Self { token, result: Ok(None) }
	}

	pub fn loaded(token: OperationToken, loaded: Loaded) -> Self {
		Self {
			token,
			result: Ok(Some(loaded)),
		}
	}

	pub fn failed(token: OperationToken, error: PlaybackError) -> Self {
		Self {
			token,
			result: Err(error),
		}
	}
}
