//! Random perfect mazes, used by the frontend, the tests and the benchmarks
//! when there is no bitmap at hand.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{MazeError, Result};
use crate::grid::Tile;

/// Carve a maze of `columns` x `rows` logical cells with a randomized
/// depth-first search. The result is `2 * columns + 3` tiles wide and
/// `2 * rows + 3` tiles high: a one tile margin (which becomes the grid
/// border), the outer wall, and the cells separated by walls. The outer wall
/// has an opening above the top left cell and one below the bottom right cell.
pub fn perfect_maze<R: Rng + ?Sized>(
    columns: usize,
    rows: usize,
    rng: &mut R,
) -> Result<Vec<Vec<Tile>>> {
    if columns == 0 || rows == 0 {
        return Err(MazeError::MalformedInput(format!(
            "cannot generate a maze of {columns}x{rows} cells"
        )));
    }

    let width = 2 * columns + 3;
    let height = 2 * rows + 3;
    let mut tiles = vec![vec![Tile::Wall; width]; height];

    // the margin is open space around the outer wall
    for (y, row) in tiles.iter_mut().enumerate() {
        for (x, tile) in row.iter_mut().enumerate() {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                *tile = Tile::Path;
            }
        }
    }

    // logical cell (cx, cy) lives at tile (2cx + 2, 2cy + 2)
    let at = |cx: usize, cy: usize| (2 * cx + 2, 2 * cy + 2);

    let mut visited = vec![vec![false; columns]; rows];
    let mut stack = vec![(0usize, 0usize)];
    visited[0][0] = true;
    let (x, y) = at(0, 0);
    tiles[y][x] = Tile::Path;

    while let Some(&(cx, cy)) = stack.last() {
        let mut neighbors = Vec::with_capacity(4);
        if cx > 0 && !visited[cy][cx - 1] {
            neighbors.push((cx - 1, cy));
        }
        if cx + 1 < columns && !visited[cy][cx + 1] {
            neighbors.push((cx + 1, cy));
        }
        if cy > 0 && !visited[cy - 1][cx] {
            neighbors.push((cx, cy - 1));
        }
        if cy + 1 < rows && !visited[cy + 1][cx] {
            neighbors.push((cx, cy + 1));
        }

        let Some(&(nx, ny)) = neighbors.choose(&mut *rng) else {
            stack.pop();
            continue;
        };

        visited[ny][nx] = true;
        let (x0, y0) = at(cx, cy);
        let (x1, y1) = at(nx, ny);
        tiles[(y0 + y1) / 2][(x0 + x1) / 2] = Tile::Path;
        tiles[y1][x1] = Tile::Path;
        stack.push((nx, ny));
    }

    let (entrance_x, _) = at(0, 0);
    tiles[1][entrance_x] = Tile::Path;
    let (exit_x, _) = at(columns - 1, rows - 1);
    tiles[height - 2][exit_x] = Tile::Path;

    Ok(tiles)
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::grid::{Flag, Grid, Point};
    use crate::scan::find_openings;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_dimensions_and_openings() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let tiles = perfect_maze(6, 4, &mut rng).unwrap();

        assert_eq!(tiles.len(), 11);
        assert!(tiles.iter().all(|row| row.len() == 15));

        let grid = Grid::from_tiles(&tiles).unwrap();
        let openings = find_openings(&grid).unwrap();
        assert_eq!(openings.entrance, Point::new(2, 1));
        assert_eq!(openings.exit, Point::new(12, 9));
        assert_eq!(grid.count(Flag::Entrance), 1);
    }

    #[test]
    fn test_every_cell_is_carved() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let tiles = perfect_maze(5, 5, &mut rng).unwrap();

        // a perfect maze on n cells has exactly n - 1 passages
        let cells = (0..5)
            .flat_map(|cy| (0..5).map(move |cx| (2 * cx + 2, 2 * cy + 2)))
            .filter(|&(x, y)| tiles[y][x] == Tile::Path)
            .count();
        let passages: usize = tiles[2..11]
            .iter()
            .enumerate()
            .map(|(dy, row)| {
                row[2..11]
                    .iter()
                    .enumerate()
                    .filter(|&(dx, tile)| (dx + dy) % 2 == 1 && *tile == Tile::Path)
                    .count()
            })
            .sum();

        assert_eq!(cells, 25);
        assert_eq!(passages, 24);
    }

    #[test]
    fn test_empty_maze() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            perfect_maze(0, 3, &mut rng),
            Err(MazeError::MalformedInput(_))
        ));
    }
}
