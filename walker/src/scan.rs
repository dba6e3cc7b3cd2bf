use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::grid::{CellKind, Flag, Grid, Point};

/// The two openings of a maze, in the order the perimeter walk found them
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Openings {
    pub entrance: Point,
    pub exit: Point,
}

/// Walk the innermost ring of the solvable area clockwise starting at (1, 1):
/// right along the top, down the right side, left along the bottom and up the
/// left side. Corners show up twice, once for each side they belong to.
pub fn perimeter(grid: &Grid) -> impl Iterator<Item = Point> {
    let max_x = grid.width() - 2;
    let max_y = grid.height() - 2;

    let top = (1..=max_x).map(|x| Point { x, y: 1 });
    let right = (1..=max_y).map(move |y| Point { x: max_x, y });
    let bottom = (1..=max_x).rev().map(move |x| Point { x, y: max_y });
    let left = (1..=max_y).rev().map(|y| Point { x: 1, y });

    top.chain(right).chain(bottom).chain(left)
}

/// Locate the entrance and the exit of the maze. The first free path cell on
/// the perimeter becomes the entrance, the second one the exit. The entrance
/// is also marked visited to seed the search. Nothing is flagged when the
/// walk fails.
pub fn find_openings(grid: &Grid) -> Result<Openings> {
    let mut entrance: Option<Point> = None;
    let mut exit: Option<Point> = None;

    for point in perimeter(grid) {
        let cell = grid.cell(point)?;
        if cell.kind() != CellKind::Path || cell.has(Flag::Entrance) || cell.has(Flag::Exit) {
            continue;
        }
        match entrance {
            None => entrance = Some(point),
            Some(first) if first != point => {
                exit = Some(point);
                break;
            }
            Some(_) => {}
        }
    }

    let (Some(entrance), Some(exit)) = (entrance, exit) else {
        debug!("perimeter walk found entrance={:?}, no exit", entrance);
        return Err(MazeError::NoOpeningFound);
    };

    grid.set_flag(entrance.x, entrance.y, Flag::Entrance)?;
    grid.set_flag(entrance.x, entrance.y, Flag::Visited)?;
    grid.set_flag(exit.x, exit.y, Flag::Exit)?;

    debug!("found entrance at {} and exit at {}", entrance, exit);

    Ok(Openings { entrance, exit })
}
