//! Grid Snake - a terminal Snake game on a wrapping board
//!
//! This library provides:
//! - Core game logic: board, snake, normal and bad apples, session speed and record (game module)
//! - TUI rendering (render module)
//! - Keyboard mapping (input module)
//! - HUD counters (metrics module)
//! - The interactive driver loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
