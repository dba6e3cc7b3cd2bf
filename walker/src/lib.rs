pub mod error;
pub mod frontier;
pub mod generate;
pub mod grid;
pub mod route;
pub mod scan;
pub mod solve;
pub mod trail;
pub mod util;

pub use error::{MazeError, Result};
pub use grid::{Cell, CellKind, Direction, Flag, Grid, Point, Tile};
pub use route::{annotate, Route};
pub use scan::{find_openings, Openings};
pub use solve::{SolveStats, Solution, Solver, SolverConfig};

/// Run the whole pipeline on a freshly built grid: find the openings, race
/// the solver from the entrance to the exit and flag the winning route.
pub fn walk(grid: &Grid, config: &SolverConfig) -> Result<Solution> {
    let openings = find_openings(grid)?;
    let solution = Solver::new(config.clone())?.solve(grid, openings.entrance, openings.exit)?;
    annotate(grid, &solution.route)?;
    Ok(solution)
}
