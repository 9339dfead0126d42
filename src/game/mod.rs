//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The driver in `modes` feeds it steering requests and calls `tick` once per frame.

pub mod config;
pub mod direction;
pub mod session;
pub mod state;
pub mod world;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use direction::Direction;
pub use session::GameSession;
pub use state::{Apple, AppleKind, Position, Snake};
pub use world::{GridWorld, TickOutcome};
