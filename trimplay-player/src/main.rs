use clap::Parser;
use trimplay_player::commandline::Commandline;
use trimplay_player::error::TrimplayError;

#[tokio::main]
async fn main() -> Result<(), TrimplayError> {
	let commandline = Commandline::parse();
	commandline.run().await
}
