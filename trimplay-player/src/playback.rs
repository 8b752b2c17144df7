pub mod boundary;
pub mod controller;
pub mod error;
pub mod operation;
pub mod session;
pub mod state;

pub use controller::PlaybackController;
pub use state::PlaybackState;
