/*
    Argus, conjunction screening and collision probability for Earth orbit
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! A 3-D k-d tree over propagated positions. The all-on-all screener builds one per
//! coarse time step and asks it for every pair of objects within the miss threshold.

struct Node {
    index: usize,
    axis: usize,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

/// A static k-d tree over a set of 3-D points, indexed by insertion order.
pub struct KdTree {
    root: Option<Box<Node>>,
    points: Vec<[f64; 3]>,
}

impl KdTree {
    /// Builds the tree by recursive median split on alternating axes.
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build(&points, &mut indices, 0);
        Self { root, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn build(points: &[[f64; 3]], indices: &mut [usize], depth: usize) -> Option<Box<Node>> {
        if indices.is_empty() {
            return None;
        }
        let axis = depth % 3;
        let median = indices.len() / 2;
        indices.select_nth_unstable_by(median, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));
        let index = indices[median];
        let (left, rest) = indices.split_at_mut(median);
        let right = &mut rest[1..];
        Some(Box::new(Node {
            index,
            axis,
            left: Self::build(points, left, depth + 1),
            right: Self::build(points, right, depth + 1),
        }))
    }

    /// Indices of every point within `radius` of `center`, including exact matches.
    pub fn within_radius(&self, center: &[f64; 3], radius: f64) -> Vec<usize> {
        let mut found = Vec::new();
        if let Some(root) = &self.root {
            self.search(root, center, radius, &mut found);
        }
        found
    }

    fn search(&self, node: &Node, center: &[f64; 3], radius: f64, found: &mut Vec<usize>) {
        let point = &self.points[node.index];
        let dist_sq = (point[0] - center[0]).powi(2)
            + (point[1] - center[1]).powi(2)
            + (point[2] - center[2]).powi(2);
        if dist_sq <= radius * radius {
            found.push(node.index);
        }
        let delta = center[node.axis] - point[node.axis];
        let (near, far) = if delta < 0.0 {
            (&node.left, &node.right)
        } else {
            (&node.right, &node.left)
        };
        if let Some(child) = near {
            self.search(child, center, radius, found);
        }
        // The far half-space can only contribute when the splitting plane is in range.
        if delta.abs() <= radius {
            if let Some(child) = far {
                self.search(child, center, radius, found);
            }
        }
    }

    /// Every unordered pair of points within `radius` of each other, as `(i, j)` with `i < j`.
    pub fn pairs_within(&self, radius: f64) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.points.len() {
            for j in self.within_radius(&self.points[i], radius) {
                if j > i {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
