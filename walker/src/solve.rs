use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::thread;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::frontier::Frontier;
use crate::grid::{CellKind, Direction, Flag, Grid, Point};
use crate::route::Route;
use crate::trail::Trail;

pub const DEFAULT_WORKERS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Size of the worker pool
    pub workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Counters collected while solving
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Tasks handed to the frontier at branch points
    pub forked: usize,
    /// Tasks that ran out of free neighbours
    pub dead_ends: usize,
    /// Tasks still queued when the pool stopped, thrown away unexplored
    pub drained: usize,
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Solution {
    pub route: Route,
    pub stats: SolveStats,
}

/// A candidate route being extended by one worker
#[derive(Debug)]
struct Task {
    trail: Trail,
}

/// Outcome of expanding a task until it cannot move anymore
enum Expansion {
    Solved(Trail),
    DeadEnd,
    Cancelled,
}

/// State shared by all the workers of one solve run
struct Shared<'a> {
    grid: &'a Grid,
    exit: Point,
    frontier: Frontier<Task>,
    winner: OnceLock<Trail>,
    forked: AtomicUsize,
    dead_ends: AtomicUsize,
}

/// Races a fixed pool of worker threads from the entrance to the exit. The
/// first worker that steps onto the exit wins, the rest are cancelled.
/// The route found is valid but not necessarily the shortest one.
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Result<Self> {
        if config.workers == 0 {
            return Err(MazeError::MalformedInput(
                "the solver needs at least one worker".into(),
            ));
        }
        Ok(Self { config })
    }

    pub fn solve(&self, grid: &Grid, entrance: Point, exit: Point) -> Result<Solution> {
        // reject bad endpoints before anything touches the grid
        for point in [entrance, exit] {
            let kind = grid.classify(point.x, point.y)?;
            if kind != CellKind::Path {
                return Err(MazeError::MalformedInput(format!(
                    "route endpoint {} is a {:?} cell",
                    point, kind
                )));
            }
        }
        grid.set_flag(entrance.x, entrance.y, Flag::Visited)?;

        if entrance == exit {
            debug!("entrance and exit are both at {}", entrance);
            return Ok(Solution {
                route: Route::new(vec![entrance])?,
                stats: SolveStats::default(),
            });
        }

        let shared = Shared {
            grid,
            exit,
            frontier: Frontier::with_tasks(
                self.config.workers,
                [Task {
                    trail: Trail::start(entrance),
                }],
            ),
            winner: OnceLock::new(),
            forked: AtomicUsize::new(0),
            dead_ends: AtomicUsize::new(0),
        };

        debug!(
            "solving from {} to {} with {} workers",
            entrance, exit, self.config.workers
        );

        thread::scope(|s| {
            for id in 0..self.config.workers {
                let shared = &shared;
                s.spawn(move || work(id, shared));
            }
        });

        let exhausted = shared.frontier.is_exhausted();
        // tasks queued after the winner was announced are not explored
        let drained = shared.frontier.drain().len();
        let stats = SolveStats {
            forked: shared.forked.load(Ordering::Relaxed),
            dead_ends: shared.dead_ends.load(Ordering::Relaxed),
            drained,
        };

        let Some(trail) = shared.winner.into_inner() else {
            // nobody won, so the pool can only have stopped for lack of work
            debug_assert!(exhausted, "solver stopped without a winner or exhaustion");
            debug!(
                "frontier exhausted without reaching {} ({:?})",
                exit, stats
            );
            return Err(MazeError::Unsolvable);
        };

        let route = Route::new(trail.to_vec())?;
        info!(
            "found route of length {} ({} forks, {} dead ends, {} drained)",
            route.len(),
            stats.forked,
            stats.dead_ends,
            stats.drained
        );

        Ok(Solution { route, stats })
    }
}

/// Worker loop: pull tasks until the frontier closes or this worker wins
fn work(id: usize, shared: &Shared<'_>) {
    while let Some(task) = shared.frontier.pop() {
        trace!("worker {} expanding task at {}", id, task.trail.head());

        match expand(shared, task) {
            Expansion::Solved(trail) => {
                let steps = trail.len();
                if shared.winner.set(trail).is_ok() {
                    debug!("worker {} reached the exit in {} steps", id, steps);
                } else {
                    debug!("worker {} reached the exit after the race was decided", id);
                }
                shared.frontier.close();
                return;
            }
            Expansion::DeadEnd => {
                shared.dead_ends.fetch_add(1, Ordering::Relaxed);
            }
            Expansion::Cancelled => return,
        }
    }
    trace!("worker {} terminated", id);
}

/// Extend a task one cell at a time. The first free direction continues the
/// current task in place, every other free direction becomes a new task on
/// the frontier.
fn expand(shared: &Shared<'_>, task: Task) -> Expansion {
    let Shared {
        grid,
        exit,
        frontier,
        ..
    } = shared;
    let mut trail = task.trail;

    loop {
        if frontier.is_closed() {
            return Expansion::Cancelled;
        }

        let here = trail.head();
        let mut claimed = Direction::SEARCH_ORDER
            .iter()
            .filter_map(|direction| grid.neighbor(here, *direction))
            .filter(|point| grid.claim(*point));

        let Some(next) = claimed.next() else {
            trace!("dead end at {}", here);
            return Expansion::DeadEnd;
        };

        for branch in claimed {
            let fork = trail.clone().push(branch);
            if branch == *exit {
                return Expansion::Solved(fork);
            }
            if frontier.push(Task { trail: fork }).is_err() {
                return Expansion::Cancelled;
            }
            shared.forked.fetch_add(1, Ordering::Relaxed);
        }

        trail = trail.push(next);
        if next == *exit {
            return Expansion::Solved(trail);
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::grid::test::parse_fixture;
    use crate::scan::find_openings;

    fn solver(workers: usize) -> Solver {
        Solver::new(SolverConfig { workers }).unwrap()
    }

    fn assert_valid(grid: &Grid, route: &Route, entrance: Point, exit: Point) {
        assert_eq!(route.start(), entrance);
        assert_eq!(route.end(), exit);
        assert!(route.is_connected());
        for point in route.iter() {
            assert_eq!(grid.classify(point.x, point.y).unwrap(), CellKind::Path);
            assert!(grid.has_flag(point.x, point.y, Flag::Visited).unwrap());
        }
    }

    #[test]
    fn test_zero_workers() {
        assert!(matches!(
            Solver::new(SolverConfig { workers: 0 }),
            Err(MazeError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_basic_route() {
        let grid = parse_fixture(
            "
            #########
            ### #####
            ##  #  ##
            ## #   ##
            #   # ###
            #########
            #########
            ",
        );
        let openings = find_openings(&grid).unwrap();

        let solution = solver(4)
            .solve(&grid, openings.entrance, openings.exit)
            .unwrap();

        assert_valid(&grid, &solution.route, openings.entrance, openings.exit);
        // the only way through
        assert_eq!(
            solution.route.points(),
            &[
                Point::new(3, 1),
                Point::new(3, 2),
                Point::new(2, 2),
                Point::new(2, 3),
                Point::new(2, 4),
                Point::new(1, 4),
            ]
        );
    }

    #[test]
    fn test_open_room() {
        // an all path interior, every worker gets something to do
        let room = "
            ############
            #          #
            #          #
            #          #
            #          #
            #          #
            ############
            ";
        let entrance = Point::new(1, 1);
        let exit = Point::new(10, 5);

        for workers in [1, 2, 10] {
            let grid = parse_fixture(room);
            let solution = solver(workers).solve(&grid, entrance, exit).unwrap();
            assert_valid(&grid, &solution.route, entrance, exit);
            assert!(solution.route.len() >= 14);
        }
    }

    #[test]
    fn test_unsolvable() {
        let pockets = "
            #######
            #  #  #
            #  #  #
            #  #  #
            #######
            ";

        for workers in [1, 3, 10] {
            let grid = parse_fixture(pockets);
            assert_eq!(
                solver(workers).solve(&grid, Point::new(1, 1), Point::new(5, 3)),
                Err(MazeError::Unsolvable)
            );
            // the left pocket was fully explored, the right one never touched
            assert_eq!(grid.count(Flag::Visited), 6);
            assert!(!grid.has_flag(5, 3, Flag::Visited).unwrap());
        }
    }

    #[test]
    fn test_entrance_is_exit() {
        let grid = parse_fixture(
            "
            ###
            # #
            ###
            ",
        );

        let solution = solver(3)
            .solve(&grid, Point::new(1, 1), Point::new(1, 1))
            .unwrap();

        assert_eq!(solution.route.points(), &[Point::new(1, 1)]);
        assert!(grid.has_flag(1, 1, Flag::Visited).unwrap());
    }

    #[test]
    fn test_exit_reached_by_a_fork() {
        // from (2, 1) both (1, 1) and (3, 1) are free, the exit is the second
        // direction and therefore a forked task
        let grid = parse_fixture(
            "
            #####
            #   #
            #####
            ",
        );
        let solution = solver(1)
            .solve(&grid, Point::new(2, 1), Point::new(3, 1))
            .unwrap();

        assert_eq!(
            solution.route.points(),
            &[Point::new(2, 1), Point::new(3, 1)]
        );
    }

    #[test]
    fn test_stats_single_worker_room() {
        // with one worker every task ends as a dead end, the winner or is
        // drained once the exit is found
        let grid = parse_fixture(
            "
            #####
            #   #
            #   #
            #   #
            #####
            ",
        );

        let solution = solver(1)
            .solve(&grid, Point::new(1, 1), Point::new(3, 3))
            .unwrap();
        let stats = solution.stats;

        assert_eq!(
            solution.route.points(),
            &[
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(3, 1),
                Point::new(3, 2),
                Point::new(3, 3),
            ]
        );
        assert_eq!(
            stats,
            SolveStats {
                forked: 2,
                dead_ends: 0,
                drained: 2,
            }
        );
        assert_eq!(stats.forked, stats.dead_ends + stats.drained);
    }

    #[test]
    fn test_stats_with_dead_end() {
        // the corridor to the right is tried first and dead ends, the forked
        // task going down finds the exit
        let grid = parse_fixture(
            "
            ######
            #    #
            ## ###
            ## ###
            ######
            ",
        );

        let solution = solver(1)
            .solve(&grid, Point::new(1, 1), Point::new(2, 3))
            .unwrap();

        assert_eq!(
            solution.route.points(),
            &[
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(2, 2),
                Point::new(2, 3),
            ]
        );
        assert_eq!(
            solution.stats,
            SolveStats {
                forked: 1,
                dead_ends: 1,
                drained: 0,
            }
        );
    }

    #[test]
    fn test_stats_accounting_larger_room() {
        let grid = parse_fixture(
            "
            ############
            #          #
            #          #
            #          #
            #          #
            #          #
            ############
            ",
        );

        let stats = solver(1)
            .solve(&grid, Point::new(1, 1), Point::new(10, 5))
            .unwrap()
            .stats;

        assert!(stats.drained > 0);
        assert_eq!(stats.forked, stats.dead_ends + stats.drained);
    }

    #[test]
    fn test_endpoints_must_be_paths() {
        let grid = parse_fixture(
            "
            #####
            # # #
            #####
            ",
        );

        assert!(matches!(
            solver(2).solve(&grid, Point::new(2, 1), Point::new(3, 1)),
            Err(MazeError::MalformedInput(_))
        ));
        assert!(matches!(
            solver(2).solve(&grid, Point::new(0, 0), Point::new(3, 1)),
            Err(MazeError::MalformedInput(_))
        ));
        assert!(matches!(
            solver(2).solve(&grid, Point::new(1, 1), Point::new(2, 1)),
            Err(MazeError::MalformedInput(_))
        ));
        // a rejected run leaves no trace on the grid
        assert_eq!(grid.count(Flag::Visited), 0);
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let grid = parse_fixture(
            "
            ###
            # #
            ###
            ",
        );

        assert!(matches!(
            solver(1).solve(&grid, Point::new(1, 1), Point::new(9, 9)),
            Err(MazeError::OutOfBounds { x: 9, y: 9, .. })
        ));
    }
}
