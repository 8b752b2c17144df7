use crate::configuration::ConfigurationError;
use crate::trim_window::TrimWindowError;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum TrimplayError {
	#[error("Failed to load configuration: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Invalid log filters: {0}")]
	LogFilters(#[from] tracing_subscriber::filter::ParseError),
	#[error("Invalid trim window: {0}")]
	TrimWindow(#[from] TrimWindowError),
	#[error("Player stopped unexpectedly.")]
	PlayerStopped(#[from] watch::error::RecvError),
	#[error("Player task failed: {0}")]
	PlayerTask(#[from] JoinError),
}
