use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};

/// Smallest grid (in both dimensions) that still has a non-empty interior.
pub const MIN_SIDE: usize = 3;

/// Classification of a single pixel handed to us by the image decoder
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Path,
}

/// Structural type of a cell, fixed once the grid is built
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CellKind {
    Wall,
    Path,
    Border,
}

/// Independent markers that the pipeline stages put on cells
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Flag {
    Entrance,
    Exit,
    Visited,
    Route,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// The order in which the solver looks for free neighbors
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Up => "up",
                Direction::Down => "down",
                Direction::Left => "left",
                Direction::Right => "right",
            }
        )
    }
}

/// A grid position, `y` grows downwards
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The neighbouring point in the given direction, `None` when it would
    /// fall off the top or left edge of the coordinate space.
    pub fn step(self, direction: Direction) -> Option<Point> {
        match direction {
            Direction::Left => self.x.checked_sub(1).map(|x| Point { x, y: self.y }),
            Direction::Right => Some(Point {
                x: self.x + 1,
                y: self.y,
            }),
            Direction::Up => self.y.checked_sub(1).map(|y| Point { x: self.x, y }),
            Direction::Down => Some(Point {
                x: self.x,
                y: self.y + 1,
            }),
        }
    }

    pub fn manhattan(&self, other: &Point) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Default)]
struct Flags {
    entrance: AtomicBool,
    exit: AtomicBool,
    visited: AtomicBool,
    route: AtomicBool,
}

impl Flags {
    fn slot(&self, flag: Flag) -> &AtomicBool {
        match flag {
            Flag::Entrance => &self.entrance,
            Flag::Exit => &self.exit,
            Flag::Visited => &self.visited,
            Flag::Route => &self.route,
        }
    }
}

/// One grid position: a fixed structural kind plus a set of flags that can
/// be raised concurrently but never lowered.
#[derive(Debug)]
pub struct Cell {
    kind: CellKind,
    flags: Flags,
}

impl Cell {
    fn new(kind: CellKind) -> Self {
        Self {
            kind,
            flags: Flags::default(),
        }
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn has(&self, flag: Flag) -> bool {
        self.flags.slot(flag).load(Ordering::Acquire)
    }

    fn raise(&self, flag: Flag) {
        self.flags.slot(flag).store(true, Ordering::Release);
    }

    /// Flip `visited` from false to true. Only one caller ever sees `true`.
    fn try_visit(&self) -> bool {
        self.flags
            .visited
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Rectangular maze model. The structure is immutable after construction,
/// the flags live in atomics so that the solver workers can share a `&Grid`.
#[derive(Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build the grid from decoded rows of tiles. The outermost ring is
    /// always turned into [`CellKind::Border`], whatever the input says.
    pub fn from_tiles<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        if height < MIN_SIDE {
            return Err(MazeError::MalformedInput(format!(
                "grid needs at least {MIN_SIDE} rows, got {height}"
            )));
        }

        let width = rows[0].as_ref().len();
        if width < MIN_SIDE {
            return Err(MazeError::MalformedInput(format!(
                "grid needs at least {MIN_SIDE} columns, got {width}"
            )));
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(MazeError::MalformedInput(format!(
                    "row {y} has {} columns, expected {width}",
                    row.len()
                )));
            }

            for (x, tile) in row.iter().enumerate() {
                let kind = if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    CellKind::Border
                } else {
                    match tile {
                        Tile::Wall => CellKind::Wall,
                        Tile::Path => CellKind::Path,
                    }
                };
                cells.push(Cell::new(kind));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Whether the point lies in the solvable area, i.e. inside the border ring
    pub fn is_interior(&self, point: Point) -> bool {
        (1..self.width - 1).contains(&point.x) && (1..self.height - 1).contains(&point.y)
    }

    pub fn cell(&self, point: Point) -> Result<&Cell> {
        if !self.contains(point) {
            return Err(MazeError::OutOfBounds {
                x: point.x,
                y: point.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(&self.cells[point.y * self.width + point.x])
    }

    pub fn classify(&self, x: usize, y: usize) -> Result<CellKind> {
        Ok(self.cell(Point { x, y })?.kind())
    }

    pub fn has_flag(&self, x: usize, y: usize, flag: Flag) -> Result<bool> {
        Ok(self.cell(Point { x, y })?.has(flag))
    }

    /// Raise a flag on a cell. Raising a flag that is already set is a no-op.
    /// Only path cells can be an entrance or an exit.
    pub fn set_flag(&self, x: usize, y: usize, flag: Flag) -> Result<()> {
        let cell = self.cell(Point { x, y })?;
        if matches!(flag, Flag::Entrance | Flag::Exit) && cell.kind() != CellKind::Path {
            return Err(MazeError::MalformedInput(format!(
                "{:?} cell at ({}, {}) cannot be flagged {:?}",
                cell.kind(),
                x,
                y,
                flag
            )));
        }
        cell.raise(flag);
        Ok(())
    }

    /// Atomically check that `point` is a free interior path cell and mark it
    /// visited. Returns `true` only for the single caller that won the cell.
    pub fn claim(&self, point: Point) -> bool {
        if !self.is_interior(point) {
            return false;
        }
        let cell = &self.cells[point.y * self.width + point.x];
        cell.kind == CellKind::Path && cell.try_visit()
    }

    /// Neighbour of `point` in `direction`, if it stays in the solvable area
    pub fn neighbor(&self, point: Point, direction: Direction) -> Option<Point> {
        point.step(direction).filter(|p| self.is_interior(*p))
    }

    /// Every position carrying `flag`, in row-major order
    pub fn points_with(&self, flag: Flag) -> impl Iterator<Item = Point> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, cell)| cell.has(flag))
            .map(move |(i, _)| Point {
                x: i % self.width,
                y: i / self.width,
            })
    }

    pub fn count(&self, flag: Flag) -> usize {
        self.cells.iter().filter(|cell| cell.has(flag)).count()
    }

    /// Row-major access to the cells, used by the renderers
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            for cell in row {
                let symbol = if cell.has(Flag::Entrance) {
                    'S'
                } else if cell.has(Flag::Exit) {
                    'E'
                } else if cell.has(Flag::Route) {
                    '*'
                } else if cell.has(Flag::Visited) {
                    '.'
                } else if cell.kind() == CellKind::Wall {
                    '#'
                } else {
                    ' '
                };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
