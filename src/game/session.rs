use std::time::Duration;

use tracing::info;

use super::{
    config::GameConfig,
    direction::Direction,
    world::{GridWorld, TickOutcome},
};

/// One process run of the game: the board plus the speed the player picked.
pub struct GameSession {
    world: GridWorld,
    speed: u32,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let speed = config.speed;
        Self {
            world: GridWorld::new(config),
            speed,
        }
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let speed = config.speed;
        Self {
            world: GridWorld::with_seed(config, seed),
            speed,
        }
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn set_pending_direction(&mut self, direction: Direction) {
        self.world.set_pending_direction(direction);
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.world.tick()
    }

    /// Ticks per second
    pub fn current_speed(&self) -> u32 {
        self.speed
    }

    pub fn record(&self) -> usize {
        self.world.record()
    }

    /// Change speed by `delta`, clamped to the configured bounds. Returns the new speed.
    pub fn adjust_speed(&mut self, delta: i32) -> u32 {
        let config = self.world.config();
        let target = (self.speed as i64 + delta as i64)
            .clamp(config.min_speed as i64, config.max_speed as i64) as u32;

        if target != self.speed {
            info!(from = self.speed, to = target, "speed changed");
            self.speed = target;
        }
        self.speed
    }

    pub fn speed_up(&mut self) -> u32 {
        self.adjust_speed(1)
    }

    pub fn slow_down(&mut self) -> u32 {
        self.adjust_speed(-1)
    }

    /// Time between two ticks at the current speed
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.speed.max(1)))
    }
}
