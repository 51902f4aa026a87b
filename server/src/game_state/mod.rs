mod client;
mod game_state;
mod game_state_config;
mod messages;

pub use game_state::{CloneStats, ServerGameState};
pub use game_state_config::ServerGameStateConfig;
pub use messages::GameStateMessage;
