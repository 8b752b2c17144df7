use crate::configuration::Configuration;
use crate::engine::MediaEngine;
use crate::engine::simulated::SimulatedEngine;
use crate::error::TrimplayError;
use crate::playback::PlaybackState;
use crate::player::Player;
use crate::presentation::PlayerParameters;
use crate::trim_window::TrimWindow;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[command(version, about)]
pub struct Commandline {
	#[arg(short = 'c', long = "config-file", default_value = "configuration.toml")]
	pub configuration_file_path: String,
	#[command(subcommand)]
	pub command: BaseCommand,
}

#[derive(clap::Subcommand)]
pub enum BaseCommand {
	/// Play a trimmed segment on a simulated engine
	Play(PlayArguments),
	/// Print the configuration
	Configuration,
}

#[derive(clap::Args)]
pub struct PlayArguments {
	#[arg(long, default_value = "demo")]
	pub resource: String,
	/// Start of the trim window in seconds
	#[arg(long, default_value = "5", value_parser = parse_seconds)]
	pub start: Duration,
	/// End of the trim window in seconds, the end of the media if omitted
	#[arg(long, value_parser = parse_seconds)]
	pub end: Option<Duration>,
	/// Length of the simulated media in seconds
	#[arg(long, default_value = "60", value_parser = parse_seconds)]
	pub media_duration: Duration,
	/// How often to play the segment
	#[arg(long, default_value_t = 1)]
	pub loops: u32,
}

fn parse_seconds(text: &str) -> Result<Duration, String> {
	let seconds = text.parse::<f64>().map_err(|error| error.to_string())?;
	Duration::try_from_secs_f64(seconds).map_err(|error| error.to_string())
}

impl Commandline {
	pub async fn run(self) -> Result<(), TrimplayError> {
		let configuration = Configuration::from_file(&self.configuration_file_path)?;

		tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::builder().parse(&configuration.log_filters)?)
			.init();

		match self.command {
			BaseCommand::Play(arguments) => play(&configuration, arguments).await?,
			BaseCommand::Configuration => println!("{configuration:?}"),
		}
		Ok(())
	}
}

/// Presses play, waits for playback to stop at the end of the segment and repeats.
async fn play(configuration: &Configuration, arguments: PlayArguments) -> Result<(), TrimplayError> {
	let trim_window = TrimWindow::new(arguments.start, arguments.end)?;
	let engine: MediaEngine = Arc::new(SimulatedEngine::start(
		arguments.media_duration,
		configuration.simulation_timing(),
	));
	let parameters = PlayerParameters::builder()
		.resource(arguments.resource)
		.trim_window(trim_window)
		.build();
	let player = Player::spawn(engine, parameters, configuration.boundary_policy());
	let mut status = player.status();

	player.show();
	for round in 1..=arguments.loops {
		info!(round, "Pressing play.");
		player.on_user_play_pause();
		status.wait_for(|status| status.is_playing()).await?;
		let stopped = status
			.wait_for(|status| status.state == Some(PlaybackState::Ready))
			.await?
			.clone();
		info!(round, position = ?stopped.last_known_position, "Segment finished.");
	}

	player.on_close();
	player.shutdown().await?;
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use clap::Parser;

	#[test]
	fn should_parse_play_arguments() {
		let commandline = Commandline::try_parse_from([
			"trimplay",
			"-c",
			"other.toml",
			"play",
			"--start",
			"2.5",
			"--end",
			"10",
			"--loops",
			"3",
		])
		.unwrap();

		assert_eq!("other.toml", commandline.configuration_file_path);
		let BaseCommand::Play(arguments) = commandline.command else {
			panic!("Expected play command");
		};
		assert_eq!("demo", arguments.resource);
		assert_eq!(Duration::from_millis(2_500), arguments.start);
		assert_eq!(Some(Duration::from_secs(10)), arguments.end);
		assert_eq!(Duration::from_secs(60), arguments.media_duration);
		assert_eq!(3, arguments.loops);
	}

	#[test]
	fn should_reject_negative_seconds() {
		let result = Commandline::try_parse_from(["trimplay", "play", "--start", "-1"]);

		assert!(result.is_err());
	}

	#[test]
	fn should_default_to_the_configuration_file_in_the_working_directory() {
		let commandline = Commandline::try_parse_from(["trimplay", "configuration"]).unwrap();

		assert_eq!("configuration.toml", commandline.configuration_file_path);
		assert!(matches!(commandline.command, BaseCommand::Configuration));
	}

	#[tokio::test(start_paused = true)]
	async fn should_play_the_segment_repeatedly() {
		let configuration = Configuration::from_file("test/files/test-configuration.toml").unwrap();
		let arguments = PlayArguments {
			resource: "demo".to_string(),
			start: Duration::from_secs(2),
			end: Some(Duration::from_secs(4)),
			media_duration: Duration::from_secs(10),
			loops: 2,
		};

		play(&configuration, arguments).await.unwrap();
	}
}
