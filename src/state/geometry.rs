use std::str::FromStr;

use crate::error::MazeError;
use crate::infra::{Direction, Vec2};

/// Source of node positions and obstacle queries for [`Graph::build`].
///
/// [`Graph::build`]: crate::state::Graph::build
pub trait LevelGeometry {
    /// Centres of every node, in a stable order.
    fn node_positions(&self) -> Vec<Vec2>;

    /// Whether an obstacle blocks `distance` units of straight travel from
    /// `from` along `direction`.
    fn is_blocked(&self, from: Vec2, direction: Direction, distance: f32) -> bool;
}

/// Built-in level: the pursued agent starts at `P`, pursuers at `G`.
pub const CLASSIC_MAZE: &str = "\
###############
#G.....#.....G#
#.###.###.###.#
#.............#
#.#.##.#.##.#.#
#.#....P....#.#
#.#.##.#.##.#.#
#.............#
#.###.###.###.#
#G.....#.....G#
###############";

/// ASCII tile maze. `#` is a wall; every other character is open floor and
/// becomes a node. `P` and `G` mark spawn points for the pursued agent and the
/// pursuers. Cells outside the text are open.
///
/// Column `c` of row `r` sits at `(c, height - 1 - r)` so that up is +y.
#[derive(Debug, Clone)]
pub struct TileMaze {
    width: usize,
    height: usize,
    walls: Vec<bool>,
    pursued_spawns: Vec<Vec2>,
    pursuer_spawns: Vec<Vec2>,
}

impl TileMaze {
    pub fn parse(text: &str) -> Result<Self, MazeError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(MazeError::Empty);
        }

        let width = rows[0].chars().count();
        let height = rows.len();
        let mut walls = Vec::with_capacity(width * height);
        let mut pursued_spawns = Vec::new();
        let mut pursuer_spawns = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            let y = (height - 1 - row) as f32;
            for (col, ch) in line.chars().enumerate() {
                walls.push(ch == '#');
                let position = Vec2::new(col as f32, y);
                match ch {
                    'P' => pursued_spawns.push(position),
                    'G' => pursuer_spawns.push(position),
                    _ => {}
                }
            }
        }

        if walls.iter().all(|&wall| wall) {
            return Err(MazeError::NoOpenCells);
        }

        Ok(Self {
            width,
            height,
            walls,
            pursued_spawns,
            pursuer_spawns,
        })
    }

    pub fn classic() -> Result<Self, MazeError> {
        Self::parse(CLASSIC_MAZE)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pursued_spawns(&self) -> &[Vec2] {
        &self.pursued_spawns
    }

    pub fn pursuer_spawns(&self) -> &[Vec2] {
        &self.pursuer_spawns
    }

    /// Inner corners of the maze, used as scatter retreats.
    pub fn corners(&self) -> [Vec2; 4] {
        let max_x = self.width.saturating_sub(1) as f32;
        let max_y = self.height.saturating_sub(1) as f32;
        [
            Vec2::new(max_x, max_y),
            Vec2::new(0.0, max_y),
            Vec2::new(0.0, 0.0),
            Vec2::new(max_x, 0.0),
        ]
    }

    /// Whether the cell containing `position` is a wall.
    pub fn is_wall_at(&self, position: Vec2) -> bool {
        let col = position.x.round() as i64;
        let y = position.y.round() as i64;
        if col < 0 || y < 0 || col >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        let row = self.height as i64 - 1 - y;
        self.walls[(row as usize) * self.width + col as usize]
    }
}

impl FromStr for TileMaze {
    type Err = MazeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl LevelGeometry for TileMaze {
    fn node_positions(&self) -> Vec<Vec2> {
        let mut positions = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                if !self.walls[row * self.width + col] {
                    positions.push(Vec2::new(col as f32, (self.height - 1 - row) as f32));
                }
            }
        }
        positions
    }

    fn is_blocked(&self, from: Vec2, direction: Direction, distance: f32) -> bool {
        let steps = distance.ceil().max(1.0) as i32;
        (1..=steps).any(|step| {
            let along = (step as f32).min(distance);
            self.is_wall_at(from + direction.vector() * along)
        })
    }
}
