use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::grid::{Flag, Grid, Point};

/// Accepted path from the entrance (first point) to the exit (last point)
#[derive(Debug, PartialEq, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRoute")]
pub struct Route {
    points: Vec<Point>,
}

#[derive(Deserialize)]
struct RawRoute {
    points: Vec<Point>,
}

impl TryFrom<RawRoute> for Route {
    type Error = MazeError;

    fn try_from(raw: RawRoute) -> Result<Self> {
        Route::new(raw.points)
    }
}

impl Route {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.is_empty() {
            return Err(MazeError::MalformedInput(
                "a route needs at least one point".into(),
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Every consecutive pair of points is one step apart
    pub fn is_connected(&self) -> bool {
        self.points.windows(2).all(|w| w[0].manhattan(&w[1]) == 1)
    }
}

/// Flag every cell of the route as part of it. Running this again with the
/// same route leaves the grid as it is.
pub fn annotate(grid: &Grid, route: &Route) -> Result<()> {
    for point in route.iter() {
        grid.set_flag(point.x, point.y, Flag::Route)?;
    }
    Ok(())
}
