use async_trait::async_trait;
use futures_util::stream::BoxStream;
use static_assertions::assert_obj_safe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod simulated;

/// Opaque handle to a media resource. The engine owns the resource itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{_0}")]
pub struct ResourceReference(Arc<str>);

impl From<&str> for ResourceReference {
	fn from(name: &str) -> Self {
		Self(name.into())
	}
}

impl From<String> for ResourceReference {
	fn from(name: String) -> Self {
		Self(name.into())
	}
}

/// What the engine knows about a resource after loading it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Loaded {
	pub duration: Option<Duration>,
}

/// Periodic report of the engine's playback status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSample {
	pub position: Duration,
	pub is_playing: bool,
	pub is_loaded: bool,
	pub duration: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum EngineCommandKind {
	#[display("load")]
	Load,
	#[display("play")]
	Play,
	#[display("pause")]
	Pause,
	#[display("seek")]
	Seek,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
	#[error("Engine rejected the command: {0}")]
	Rejected(String),
	#[error("No resource is loaded.")]
	NotLoaded,
}

/// Stream of status samples. Dropping it ends the subscription.
pub type StatusSubscription = BoxStream<'static, StatusSample>;

pub type MediaEngine = Arc<dyn MediaEngineAdapter>;

/// The playback engine. Every command may take arbitrarily long and there is no ordering
/// guarantee between a command completing and the next status sample being delivered.
#[async_trait]
pub trait MediaEngineAdapter: Send + Sync {
	async fn load(&self, resource: &ResourceReference) -> Result<Loaded, EngineError>;
	async fn play(&self) -> Result<(), EngineError>;
	async fn pause(&self) -> Result<(), EngineError>;
	async fn seek(&self, position: Duration) -> Result<(), EngineError>;
	fn subscribe(&self) -> StatusSubscription;
}

assert_obj_safe!(MediaEngineAdapter);
