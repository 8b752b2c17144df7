/// Where a playback session is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
	/// The poster is shown and nothing has been loaded yet.
	#[default]
	AwaitingFirstGesture,
	Loading,
	/// The one seek to the start of the trim window after loading.
	SeekingToStart,
	/// Paused.
	Ready,
	Playing,
	/// Any later seek. The engine is paused while it is in flight.
	SeekingInternal { resume_playback: bool },
	Closed,
}
