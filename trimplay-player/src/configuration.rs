use crate::engine::simulated::SimulationTiming;
use crate::playback::boundary::BoundaryPolicy;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Configuration {
	pub log_filters: String,
	/// How close to the end of the trim window playback is stopped and how far a paused
	/// position may drift out of it.
	#[serde(with = "humantime_serde")]
	pub boundary_tolerance: Duration,
	#[serde(with = "humantime_serde")]
	pub status_interval: Duration,
	#[serde(with = "humantime_serde")]
	pub command_latency: Duration,
	#[serde(with = "humantime_serde")]
	pub load_latency: Duration,
}

impl Configuration {
	pub fn from_file(path: impl AsRef<Path>) -> Result<Configuration, ConfigurationError> {
		let text = read_to_string(path)?;

		Ok(Configuration::try_from(text.as_str())?)
	}

	pub fn boundary_policy(&self) -> BoundaryPolicy {
		BoundaryPolicy::new(self.boundary_tolerance)
	}

	pub fn simulation_timing(&self) -> SimulationTiming {
		SimulationTiming {
			status_interval: self.status_interval,
			command_latency: self.command_latency,
			load_latency: self.load_latency,
		}
	}
}

impl TryFrom<&str> for Configuration {
	type Error = toml::de::Error;

	fn try_from(text: &str) -> Result<Self, Self::Error> {
		toml::from_str(text)
	}
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
	#[error("Failed to deserialize with error: {0}")]
	DeserializationError(#[from] toml::de::Error),
	#[error("IO operation failed: {0}")]
	IoError(#[from] std::io::Error),
}
