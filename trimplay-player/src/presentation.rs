use crate::engine::ResourceReference;
use crate::playback::PlaybackState;
use crate::trim_window::TrimWindow;
use std::sync::Arc;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// What the presentation layer needs to render the play/pause icon and to choose
/// between poster and player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PresentationFacts {
	pub is_playing: bool,
	pub is_poster_visible: bool,
}

/// Opaque handle to the image shown before playback starts.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display)]
#[display("{_0}")]
pub struct PosterReference(Arc<str>);

impl From<&str> for PosterReference {
	fn from(name: &str) -> Self {
		Self(name.into())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder)]
pub struct PlayerParameters {
	#[builder(setter(into))]
	pub resource: ResourceReference,
	#[builder(default, setter(strip_option, into))]
	pub poster: Option<PosterReference>,
	pub trim_window: TrimWindow,
}

/// Snapshot of a player as published to the presentation layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerStatus {
	pub is_visible: bool,
	/// `None` while the surface is hidden and no session exists.
	pub state: Option<PlaybackState>,
	pub last_known_position: Option<Duration>,
	pub facts: PresentationFacts,
	pub poster: Option<PosterReference>,
}

impl PlayerStatus {
	pub fn is_playing(&self) -> bool {
		self.facts.is_playing
	}

	pub fn is_poster_visible(&self) -> bool {
		self.facts.is_poster_visible
	}
}
