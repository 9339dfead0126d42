use super::direction::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Bring the position back onto a `width` x `height` torus
    pub fn wrapped(&self, width: u32, height: u32) -> Self {
        Self {
            x: self.x.rem_euclid(width as i32),
            y: self.y.rem_euclid(height as i32),
        }
    }

    /// One step in `direction`, wrapping around the board edges
    pub fn stepped(&self, direction: Direction, width: u32, height: u32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy).wrapped(width, height)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Single-cell snake, as spawned at the start of every run
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: vec![head],
            direction,
        }
    }

    /// Snake with an explicit body, head first. Test setup only.
    #[cfg(test)]
    pub fn from_cells(body: Vec<Position>, direction: Direction) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one cell");
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Push a new head; the tail stays until trimmed
    pub fn push_head(&mut self, head: Position) {
        self.body.insert(0, head);
    }

    /// Remove up to `count` tail cells, never the head. Returns what was removed.
    pub fn trim_tail(&mut self, count: usize) -> Vec<Position> {
        let keep = self.body.len().saturating_sub(count).max(1);
        self.body.split_off(keep)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// What eating an apple does to the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppleKind {
    /// Grows the snake by one
    Normal,
    /// Shrinks the snake, or kills a snake too short to lose two cells
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Apple {
    pub position: Position,
    pub kind: AppleKind,
}

impl Apple {
    pub fn new(position: Position, kind: AppleKind) -> Self {
        Self { position, kind }
    }
}
