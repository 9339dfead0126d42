use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::state::Position;

/// Start-up configuration problems. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cell size must be greater than zero")]
    ZeroCellSize,

    #[error("screen {width}x{height} px is not evenly divisible by cell size {cell_size} px")]
    NotDivisible {
        width: u32,
        height: u32,
        cell_size: u32,
    },

    #[error("grid of {width}x{height} cells is too small, need at least 2x2")]
    GridTooSmall { width: u32, height: u32 },

    #[error("speed {speed} is outside the allowed range {min}..={max}")]
    InvalidSpeed { speed: u32, min: u32, max: u32 },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Screen width in pixels
    pub screen_width: u32,
    /// Screen height in pixels
    pub screen_height: u32,
    /// Side of one square cell in pixels
    pub cell_size: u32,

    /// Ticks per second at start
    pub speed: u32,
    pub min_speed: u32,
    pub max_speed: u32,

    /// Whether a bad apple shares the board with the normal one
    pub bad_apple: bool,
    /// Random samples tried before falling back to a free-cell scan
    pub placement_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 640,
            screen_height: 480,
            cell_size: 20,
            speed: 10,
            min_speed: 1,
            max_speed: 60,
            bad_apple: true,
            placement_attempts: 1024,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom screen and cell size
    pub fn new(screen_width: u32, screen_height: u32, cell_size: u32) -> Self {
        Self {
            screen_width,
            screen_height,
            cell_size,
            ..Default::default()
        }
    }

    /// Configuration sized in cells rather than pixels
    pub fn with_grid(width: u32, height: u32) -> Self {
        let cell_size = Self::default().cell_size;
        Self::new(width * cell_size, height * cell_size, cell_size)
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::with_grid(10, 10)
    }

    /// Load a JSON config. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.screen_width % self.cell_size != 0 || self.screen_height % self.cell_size != 0 {
            return Err(ConfigError::NotDivisible {
                width: self.screen_width,
                height: self.screen_height,
                cell_size: self.cell_size,
            });
        }
        if self.grid_width() < 2 || self.grid_height() < 2 {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width(),
                height: self.grid_height(),
            });
        }
        if self.min_speed == 0
            || self.min_speed > self.max_speed
            || !(self.min_speed..=self.max_speed).contains(&self.speed)
        {
            return Err(ConfigError::InvalidSpeed {
                speed: self.speed,
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        Ok(())
    }

    pub fn grid_width(&self) -> u32 {
        self.screen_width / self.cell_size.max(1)
    }

    pub fn grid_height(&self) -> u32 {
        self.screen_height / self.cell_size.max(1)
    }

    /// Starting cell of the snake
    pub fn center(&self) -> Position {
        Position::new((self.grid_width() / 2) as i32, (self.grid_height() / 2) as i32)
    }

    /// Top-left pixel of a cell, for renderers that work in screen space
    pub fn cell_origin_px(&self, pos: Position) -> (u32, u32) {
        (pos.x as u32 * self.cell_size, pos.y as u32 * self.cell_size)
    }
}
