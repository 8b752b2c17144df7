use crate::engine::{EngineError, Loaded, MediaEngine, ResourceReference};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

pub type SharedLoad = Shared<BoxFuture<'static, Result<Loaded, EngineError>>>;

struct LatestLoad {
	resource: ResourceReference,
	load: SharedLoad,
}

/// Makes sure a resource is only loaded once, even if the session that asked for it is
/// destroyed and a new one asks again while the load is still in flight.
///
/// A failed load is forgotten so the next request tries again.
#[derive(Clone)]
pub struct ResourceLoader {
	engine: MediaEngine,
	latest_load: Arc<Mutex<Option<LatestLoad>>>,
}

impl ResourceLoader {
	pub fn new(engine: MediaEngine) -> Self {
		Self {
			engine,
			latest_load: Default::default(),
		}
	}

	pub fn load(&self, resource: &ResourceReference) -> SharedLoad {
		let mut latest_load = self.latest_load.lock();
		if let Some(LatestLoad {
			resource: latest_resource,
			load,
		}) = latest_load.as_ref()
		{
			let has_failed = load.peek().is_some_and(Result::is_err);
			if latest_resource == resource && !has_failed {
				debug!(%resource, "Joining earlier load.");
				return load.clone();
			}
		}

		let engine = self.engine.clone();
		let owned_resource = resource.clone();
		let load = async move { engine.load(&owned_resource).await }.boxed().shared();
		*latest_load = Some(LatestLoad {
			resource: resource.clone(),
			load: load.clone(),
		});
		load
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::engine::EngineCommandKind;
	use crate::utils::fake_engine::FakeEngine;
	use std::time::Duration;

	const DURATION: Option<Duration> = Some(Duration::from_secs(60));

	#[tokio::test]
	async fn should_load_only_once_for_concurrent_requests() {
		let engine = FakeEngine::with_gated_load(DURATION);
		let loader = ResourceLoader::new(engine.as_media_engine());

		let first = loader.load(&"clip".into());
		let second = loader.load(&"clip".into());
		engine.release_load();
		let (first, second) = futures_util::join!(first, second);

		assert_eq!(1, engine.load_count());
		assert_eq!(Ok(Loaded { duration: DURATION }), first);
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn should_reuse_a_finished_load() {
		let engine = FakeEngine::new(DURATION);
		let loader = ResourceLoader::new(engine.as_media_engine());

		loader.load(&"clip".into()).await.expect("Failed to load");
		loader.load(&"clip".into()).await.expect("Failed to load");

		assert_eq!(1, engine.load_count());
	}

	#[tokio::test]
	async fn should_retry_after_a_failed_load() {
		let engine = FakeEngine::new(DURATION);
		engine.fail_next(EngineCommandKind::Load);
		let loader = ResourceLoader::new(engine.as_media_engine());

		assert!(loader.load(&"clip".into()).await.is_err());
		assert!(loader.load(&"clip".into()).await.is_ok());

		assert_eq!(2, engine.load_count());
	}

	#[tokio::test]
	async fn should_load_a_different_resource() {
		let engine = FakeEngine::new(DURATION);
		let loader = ResourceLoader::new(engine.as_media_engine());

		loader.load(&"clip".into()).await.expect("Failed to load");
		loader.load(&"other clip".into()).await.expect("Failed to load");

		assert_eq!(2, engine.load_count());
	}
}
