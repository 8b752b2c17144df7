use crate::engine::{EngineError, Loaded, MediaEngineAdapter, ResourceReference, StatusSample, StatusSubscription};
use async_trait::async_trait;
use futures_util::{StreamExt, future};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, sleep};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, trace};

/// Status samples a slow subscriber may fall behind before it starts missing some.
const SAMPLE_BUFFER: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationTiming {
	pub status_interval: Duration,
	pub command_latency: Duration,
	pub load_latency: Duration,
}

#[derive(Debug)]
struct SimulatedMedia {
	duration: Duration,
	position: Duration,
	is_loaded: bool,
	is_playing: bool,
}

impl SimulatedMedia {
	fn advance(&mut self, elapsed: Duration) {
		if !self.is_playing {
			return;
		}

		self.position = (self.position + elapsed).min(self.duration);
		if self.position == self.duration {
			self.is_playing = false;
		}
	}

	fn sample(&self) -> Option<StatusSample> {
		self.is_loaded.then_some(StatusSample {
			position: self.position,
			is_playing: self.is_playing,
			is_loaded: true,
			duration: Some(self.duration),
		})
	}
}

/// An engine that plays a resource of fixed length by advancing a clock.
///
/// Must be started inside a tokio runtime. Stops reporting status when dropped.
pub struct SimulatedEngine {
	media: Arc<Mutex<SimulatedMedia>>,
	samples: broadcast::Sender<StatusSample>,
	timing: SimulationTiming,
	reporter: JoinHandle<()>,
}

impl SimulatedEngine {
	pub fn start(duration: Duration, timing: SimulationTiming) -> Self {
		let media = Arc::new(Mutex::new(SimulatedMedia {
			duration,
			position: Duration::ZERO,
			is_loaded: false,
			is_playing: false,
		}));
		let (samples, _) = broadcast::channel(SAMPLE_BUFFER);
		let reporter = tokio::spawn(report_status(media.clone(), samples.clone(), timing.status_interval));

		Self {
			media,
			samples,
			timing,
			reporter,
		}
	}

	fn with_loaded_media(&self, update: impl FnOnce(&mut SimulatedMedia)) -> Result<(), EngineError> {
		let mut media = self.media.lock();
		if !media.is_loaded {
			return Err(EngineError::NotLoaded);
		}

		update(&mut media);
		Ok(())
	}
}

impl Drop for SimulatedEngine {
	fn drop(&mut self) {
		self.reporter.abort();
	}
}

async fn report_status(
	media: Arc<Mutex<SimulatedMedia>>,
	samples: broadcast::Sender<StatusSample>,
	status_interval: Duration,
) {
	let mut interval = tokio::time::interval(status_interval);
	interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
	// The first tick completes immediately.
	interval.tick().await;

	loop {
		interval.tick().await;
		let sample = {
			let mut media = media.lock();
			media.advance(status_interval);
			media.sample()
		};

		if let Some(sample) = sample {
			trace!(position = ?sample.position, is_playing = sample.is_playing, "Reporting status.");
			// Nobody listening is fine.
			let _ = samples.send(sample);
		}
	}
}

#[async_trait]
impl MediaEngineAdapter for SimulatedEngine {
	async fn load(&self, resource: &ResourceReference) -> Result<Loaded, EngineError> {
		debug!(%resource, latency = ?self.timing.load_latency, "Loading simulated resource.");
		sleep(self.timing.load_latency).await;

		let mut media = self.media.lock();
		media.is_loaded = true;
		Ok(Loaded {
			duration: Some(media.duration),
		})
	}

	async fn play(&self) -> Result<(), EngineError> {
		sleep(self.timing.command_latency).await;
		self.with_loaded_media(|media| media.is_playing = media.position < media.duration)
	}

	async fn pause(&self) -> Result<(), EngineError> {
		sleep(self.timing.command_latency).await;
		self.with_loaded_media(|media| media.is_playing = false)
	}

	async fn seek(&self, position: Duration) -> Result<(), EngineError> {
		sleep(self.timing.command_latency).await;
		self.with_loaded_media(|media| media.position = position.min(media.duration))
	}

	fn subscribe(&self) -> StatusSubscription {
		BroadcastStream::new(self.samples.subscribe())
			.filter_map(|sample| future::ready(sample.ok()))
			.boxed()
	}
}
