use crate::engine::{EngineCommandKind, EngineError};
use crate::playback::operation::OperationToken;
use crate::trim_window::TrimWindowError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
	#[error("Engine failed to {command}: {source}")]
	EngineCommandFailed {
		command: EngineCommandKind,
		#[source]
		source: EngineError,
	},
	#[error("Discarded completion of superseded operation {0}.")]
	StaleOperationDiscarded(OperationToken),
	#[error("Resource can't be played within the trim window: {0}")]
	InvalidTrimWindow(#[from] TrimWindowError),
	#[error("Playback invariant violated: {0}")]
	InvariantViolation(String),
}
