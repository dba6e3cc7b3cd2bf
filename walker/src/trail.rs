use std::sync::Arc;

use crate::grid::Point;

#[derive(Debug)]
struct Node {
    point: Point,
    parent: Option<Arc<Node>>,
}

impl Drop for Node {
    // unlink iteratively, dropping a long chain recursively would blow the stack
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// Persistent list of the points a task walked through, newest first.
/// Forking a trail is O(1) and the branches share their common prefix.
#[derive(Clone, Debug)]
pub struct Trail {
    head: Arc<Node>,
    len: usize,
}

impl Trail {
    pub fn start(point: Point) -> Self {
        Self {
            head: Arc::new(Node {
                point,
                parent: None,
            }),
            len: 1,
        }
    }

    /// Extend the trail with one more point
    pub fn push(self, point: Point) -> Self {
        Self {
            head: Arc::new(Node {
                point,
                parent: Some(self.head),
            }),
            len: self.len + 1,
        }
    }

    /// The point the trail currently ends at
    pub fn head(&self) -> Point {
        self.head.point
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// All points from the first one to the head
    pub fn to_vec(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.len);
        let mut node = Some(&self.head);
        while let Some(n) = node {
            points.push(n.point);
            node = n.parent.as_ref();
        }
        points.reverse();
        points
    }
}
