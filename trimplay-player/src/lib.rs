pub mod commandline;
pub mod configuration;
pub mod engine;
pub mod error;
pub mod playback;
pub mod player;
pub mod presentation;
pub mod trim_window;
#[cfg(test)]
mod utils;
pub mod visibility;
