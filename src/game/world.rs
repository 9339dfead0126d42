use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::{
    config::GameConfig,
    direction::Direction,
    state::{Apple, AppleKind, Position, Snake},
};

/// What a single tick did to the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Advanced one cell, length unchanged
    Moved,
    /// Ate a normal apple and kept its tail
    Grew,
    /// Ate a bad apple and lost two tail cells
    ShrankBy2,
    /// Ran into itself, or ate a bad apple while too short; the board was reset
    Died,
}

/// Owns the whole board: snake, apples, steering and the length record.
pub struct GridWorld {
    config: GameConfig,
    snake: Snake,
    apples: Vec<Apple>,
    pending_direction: Option<Direction>,
    /// Cells the last tick freed up
    vacated: Vec<Position>,
    record: usize,
    rng: StdRng,
}

impl GridWorld {
    /// Fresh board with an entropy-seeded RNG
    pub fn new(config: GameConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Fresh board whose apple placement and respawn directions are reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Board with a hand-placed snake and apples, for setting up test situations.
    /// The layout is taken as given, overlaps included.
    #[cfg(test)]
    pub fn with_layout(config: GameConfig, snake: Snake, apples: Vec<Apple>, seed: u64) -> Self {
        Self {
            config,
            record: snake.len(),
            snake,
            apples,
            pending_direction: None,
            vacated: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn from_rng(config: GameConfig, rng: StdRng) -> Self {
        let snake = Snake::new(config.center(), Direction::Right);
        let mut world = Self {
            config,
            record: snake.len(),
            snake,
            apples: Vec::new(),
            pending_direction: None,
            vacated: Vec::new(),
            rng,
        };
        world.respawn_apples();
        world
    }

    /// Queue a turn for the next tick. Reversing onto the body is ignored.
    pub fn set_pending_direction(&mut self, direction: Direction) {
        if self.snake.direction.is_opposite(direction) {
            return;
        }
        self.pending_direction = Some(direction);
    }

    /// Advance the snake by one cell and resolve what it ran into.
    pub fn tick(&mut self) -> TickOutcome {
        self.vacated.clear();

        if let Some(direction) = self.pending_direction.take() {
            self.snake.direction = direction;
        }

        let pre_len = self.snake.len();
        let new_head = self.snake.head().stepped(
            self.snake.direction,
            self.config.grid_width(),
            self.config.grid_height(),
        );
        self.snake.push_head(new_head);

        // Order matters: the body is checked before any apple on the same cell.
        let outcome = if self.snake.collides_with_body(new_head) {
            TickOutcome::Died
        } else if let Some(index) = self.apple_index_at(new_head, AppleKind::Bad) {
            if pre_len >= 3 {
                self.vacated = self.snake.trim_tail(2);
                self.relocate_apple(index);
                TickOutcome::ShrankBy2
            } else {
                TickOutcome::Died
            }
        } else if let Some(index) = self.apple_index_at(new_head, AppleKind::Normal) {
            self.relocate_apple(index);
            TickOutcome::Grew
        } else {
            self.vacated = self.snake.trim_tail(1);
            TickOutcome::Moved
        };

        match outcome {
            TickOutcome::Died => self.reset_after_death(pre_len),
            TickOutcome::Moved => {}
            other => {
                debug!(?other, length = self.snake.len(), "snake ate an apple");
                self.raise_record(self.snake.len());
            }
        }

        outcome
    }

    fn reset_after_death(&mut self, final_length: usize) {
        debug!(final_length, head = ?self.snake.head(), "snake died");
        self.raise_record(final_length);

        let direction = Direction::random(&mut self.rng);
        let old = std::mem::replace(&mut self.snake, Snake::new(self.config.center(), direction));
        self.vacated = old.body;
        self.pending_direction = None;
        self.respawn_apples();
    }

    fn raise_record(&mut self, length: usize) {
        if length > self.record {
            info!(record = length, "new length record");
            self.record = length;
        }
    }

    fn apple_index_at(&self, pos: Position, kind: AppleKind) -> Option<usize> {
        self.apples
            .iter()
            .position(|apple| apple.kind == kind && apple.position == pos)
    }

    fn respawn_apples(&mut self) {
        self.apples.clear();

        let mut kinds = vec![AppleKind::Normal];
        if self.config.bad_apple {
            kinds.push(AppleKind::Bad);
        }

        for kind in kinds {
            match self.free_cell() {
                Some(position) => self.apples.push(Apple::new(position, kind)),
                None => warn!(?kind, "no free cell left for apple"),
            }
        }
    }

    fn relocate_apple(&mut self, index: usize) {
        let apple = self.apples.remove(index);
        match self.free_cell() {
            Some(position) => self.apples.insert(index, Apple::new(position, apple.kind)),
            None => warn!(kind = ?apple.kind, "board is full, apple removed until next reset"),
        }
    }

    fn is_free(&self, pos: Position) -> bool {
        !self.snake.occupies(pos) && !self.apples.iter().any(|apple| apple.position == pos)
    }

    /// Random cell clear of the snake and every apple on the board.
    ///
    /// Samples uniformly for `placement_attempts` rounds, then scans the whole
    /// grid so a nearly full board cannot stall the game.
    fn free_cell(&mut self) -> Option<Position> {
        let width = self.config.grid_width() as i32;
        let height = self.config.grid_height() as i32;

        for _ in 0..self.config.placement_attempts {
            let candidate = Position::new(
                self.rng.gen_range(0..width),
                self.rng.gen_range(0..height),
            );
            if self.is_free(candidate) {
                return Some(candidate);
            }
        }

        let free: Vec<Position> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .filter(|pos| self.is_free(*pos))
            .collect();
        free.choose(&mut self.rng).copied()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake_cells(&self) -> &[Position] {
        &self.snake.body
    }

    pub fn current_length(&self) -> usize {
        self.snake.len()
    }

    pub fn direction(&self) -> Direction {
        self.snake.direction
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    pub fn apples(&self) -> &[Apple] {
        &self.apples
    }

    pub fn apple_positions(&self) -> Vec<Position> {
        self.apples.iter().map(|apple| apple.position).collect()
    }

    /// Longest the snake has been since the process started
    pub fn record(&self) -> usize {
        self.record
    }

    /// Cells freed by the last tick, for renderers that erase instead of redrawing
    pub fn vacated_cells(&self) -> &[Position] {
        &self.vacated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn assert_apples_clear(world: &GridWorld) {
        let apples = world.apples();
        for (i, apple) in apples.iter().enumerate() {
            assert!(
                !world.snake_cells().contains(&apple.position),
                "apple {:?} on snake",
                apple
            );
            for other in &apples[i + 1..] {
                assert_ne!(apple.position, other.position, "apples overlap");
            }
        }
    }

    #[test]
    fn test_new_world() {
        let world = GridWorld::with_seed(GameConfig::default(), 1);

        assert_eq!(world.snake_cells(), &[p(16, 12)]);
        assert_eq!(world.direction(), Direction::Right);
        assert_eq!(world.record(), 1);
        assert_eq!(world.apples().len(), 2);
        assert_eq!(world.apples()[0].kind, AppleKind::Normal);
        assert_eq!(world.apples()[1].kind, AppleKind::Bad);
        assert_apples_clear(&world);
    }

    #[test]
    fn test_single_apple_without_bad_apple() {
        let config = GameConfig {
            bad_apple: false,
            ..GameConfig::small()
        };
        let world = GridWorld::with_seed(config, 2);
        assert_eq!(world.apples().len(), 1);
        assert_eq!(world.apples()[0].kind, AppleKind::Normal);
    }

    #[test]
    fn test_eating_normal_apple_grows() {
        let mut world = GridWorld::with_layout(
            GameConfig::with_grid(4, 4),
            Snake::new(p(2, 2), Direction::Right),
            vec![Apple::new(p(3, 2), AppleKind::Normal)],
            3,
        );

        assert_eq!(world.tick(), TickOutcome::Grew);
        assert_eq!(world.snake_cells(), &[p(3, 2), p(2, 2)]);
        assert_eq!(world.apples().len(), 1);
        let apple = world.apples()[0].position;
        assert_ne!(apple, p(3, 2));
        assert_ne!(apple, p(2, 2));
        assert_eq!(world.record(), 2);
        assert!(world.vacated_cells().is_empty());
    }

    #[test]
    fn test_eating_bad_apple_shrinks() {
        let mut world = GridWorld::with_layout(
            GameConfig::with_grid(4, 4),
            Snake::from_cells(vec![p(1, 1), p(0, 1), p(0, 0)], Direction::Right),
            vec![
                Apple::new(p(3, 3), AppleKind::Normal),
                Apple::new(p(2, 1), AppleKind::Bad),
            ],
            4,
        );

        assert_eq!(world.tick(), TickOutcome::ShrankBy2);
        assert_eq!(world.snake_cells(), &[p(2, 1), p(1, 1)]);
        assert_eq!(world.vacated_cells(), &[p(0, 1), p(0, 0)]);

        assert_eq!(world.apples()[0], Apple::new(p(3, 3), AppleKind::Normal));
        let bad = world.apples()[1];
        assert_eq!(bad.kind, AppleKind::Bad);
        assert_ne!(bad.position, p(2, 1));
        assert_apples_clear(&world);
        assert_eq!(world.record(), 3);
    }

    #[test]
    fn test_bad_apple_kills_short_snake() {
        let mut world = GridWorld::with_layout(
            GameConfig::with_grid(4, 4),
            Snake::from_cells(vec![p(1, 1), p(0, 1)], Direction::Right),
            vec![
                Apple::new(p(3, 3), AppleKind::Normal),
                Apple::new(p(2, 1), AppleKind::Bad),
            ],
            5,
        );

        assert_eq!(world.tick(), TickOutcome::Died);
        assert_eq!(world.snake_cells(), &[p(2, 2)]);
        assert_eq!(world.record(), 2);
        assert_eq!(world.apples().len(), 2);
        assert_apples_clear(&world);
    }

    #[test]
    fn test_plain_move_keeps_length() {
        let mut world = GridWorld::with_layout(
            GameConfig::with_grid(6, 6),
            Snake::from_cells(vec![p(2, 2), p(1, 2)], Direction::Right),
            vec![Apple::new(p(5, 5), AppleKind::Normal)],
            6,
        );

        assert_eq!(world.tick(), TickOutcome::Moved);
        assert_eq!(world.snake_cells(), &[p(3, 2), p(2, 2)]);
        assert_eq!(world.vacated_cells(), &[p(1, 2)]);
        assert_eq!(world.apple_positions(), vec![p(5, 5)]);
    }

    #[test]
    fn test_head_wraps_across_edges() {
        let mut world = GridWorld::with_layout(
            GameConfig::with_grid(4, 4),
            Snake::new(p(3, 1), Direction::Right),
            vec![Apple::new(p(2, 3), AppleKind::Normal)],
            7,
        );
        assert_eq!(world.tick(), TickOutcome::Moved);
        assert_eq!(world.snake_cells(), &[p(0, 1)]);

        world.set_pending_direction(Direction::Up);
        world.tick();
        assert_eq!(world.snake_cells(), &[p(0, 0)]);
        world.tick();
        assert_eq!(world.snake_cells(), &[p(0, 3)]);

        world.set_pending_direction(Direction::Left);
        world.tick();
        assert_eq!(world.snake_cells(), &[p(3, 3)]);
    }

    #[test]
    fn test_self_collision_beats_apple_on_same_cell() {
        // Body loops so that turning down from the head lands on (1,2),
        // where a normal apple has been placed as well.
        let mut world = GridWorld::with_layout(
            GameConfig::with_grid(5, 5),
            Snake::from_cells(
                vec![p(1, 1), p(2, 1), p(2, 2), p(1, 2), p(0, 2)],
                Direction::Left,
            ),
            vec![Apple::new(p(1, 2), AppleKind::Normal)],
            8,
        );

        world.set_pending_direction(Direction::Down);
        assert_eq!(world.tick(), TickOutcome::Died);
        assert_eq!(world.current_length(), 1);
        assert_eq!(world.record(), 5);
        assert_apples_clear(&world);
    }

    #[test]
    fn test_running_into_old_tail_is_fatal() {
        let mut world = GridWorld::with_layout(
            GameConfig::with_grid(4, 4),
            Snake::from_cells(vec![p(1, 0), p(1, 1), p(0, 1), p(0, 0)], Direction::Up),
            vec![Apple::new(p(3, 3), AppleKind::Normal)],
            9,
        );

        world.set_pending_direction(Direction::Left);
        assert_eq!(world.tick(), TickOutcome::Died);
    }

    fn open_board() -> GridWorld {
        GridWorld::with_layout(
            GameConfig::default(),
            Snake::new(p(16, 12), Direction::Right),
            vec![Apple::new(p(0, 0), AppleKind::Normal)],
            10,
        )
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut world = open_board();
        assert_eq!(world.direction(), Direction::Right);

        world.set_pending_direction(Direction::Left);
        assert_eq!(world.pending_direction(), None);
        world.tick();

        assert_eq!(world.direction(), Direction::Right);
    }

    #[test]
    fn test_last_pending_direction_wins() {
        let mut world = open_board();

        world.set_pending_direction(Direction::Up);
        world.set_pending_direction(Direction::Down);
        assert_eq!(world.pending_direction(), Some(Direction::Down));

        // A rejected reversal leaves the earlier request in place
        world.set_pending_direction(Direction::Left);
        assert_eq!(world.pending_direction(), Some(Direction::Down));

        world.tick();
        assert_eq!(world.direction(), Direction::Down);
        assert_eq!(world.pending_direction(), None);
    }

    #[test]
    fn test_free_cell_scans_when_sampling_disabled() {
        let config = GameConfig {
            bad_apple: false,
            placement_attempts: 0,
            ..GameConfig::with_grid(2, 2)
        };
        let mut world = GridWorld::with_layout(
            config,
            Snake::from_cells(vec![p(0, 0), p(1, 0), p(1, 1)], Direction::Left),
            Vec::new(),
            12,
        );
        assert_eq!(world.free_cell(), Some(p(0, 1)));

        world.snake.body.push(p(0, 1));
        assert_eq!(world.free_cell(), None);
    }

    #[test]
    fn test_full_board_drops_apple() {
        let config = GameConfig {
            bad_apple: false,
            ..GameConfig::with_grid(2, 2)
        };
        let mut world = GridWorld::with_layout(
            config,
            Snake::from_cells(vec![p(1, 1), p(1, 0), p(0, 0)], Direction::Down),
            vec![Apple::new(p(0, 1), AppleKind::Normal)],
            13,
        );

        world.set_pending_direction(Direction::Left);
        assert_eq!(world.tick(), TickOutcome::Grew);
        assert_eq!(world.current_length(), 4);
        assert!(world.apples().is_empty());
        assert_eq!(world.record(), 4);
    }

    #[test]
    fn test_random_play_keeps_invariants() {
        let mut world = GridWorld::with_seed(GameConfig::with_grid(8, 6), 42);
        let mut steer = StdRng::seed_from_u64(99);
        let mut last_record = world.record();

        for _ in 0..5_000 {
            world.set_pending_direction(Direction::random(&mut steer));
            let before = world.current_length();

            let outcome = world.tick();
            let after = world.current_length();

            match outcome {
                TickOutcome::Moved => assert_eq!(after, before),
                TickOutcome::Grew => assert_eq!(after, before + 1),
                TickOutcome::ShrankBy2 => {
                    assert!(before >= 3);
                    assert_eq!(after, before - 1);
                }
                TickOutcome::Died => assert_eq!(after, 1),
            }

            assert!(world.record() >= last_record);
            assert!(world.record() >= after);
            last_record = world.record();

            let mut cells = world.snake_cells().to_vec();
            cells.sort_by_key(|pos| (pos.x, pos.y));
            cells.dedup();
            assert_eq!(cells.len(), after, "snake overlaps itself");

            assert_apples_clear(&world);
        }
    }
}
