pub mod ai;
pub mod controller;
pub mod error;
pub mod network;

pub use ai::RandomAI;
pub use controller::PlayerController;
pub use error::{PlayerError, PlayerEvent};
pub use network::{RemotePlayer, Seat};
