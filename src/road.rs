//! A simple road network for the fleet to drive on.

use crate::map::MapModel;
use crate::math::{Bounds, Coordinate};
use crate::planner::RoutePlanner;
use cgmath::MetricSpace;
use itertools::iproduct;
use rand::{Rng, RngCore};
use smallvec::SmallVec;

/// Scales distances into the integer costs used by the route search.
const COST_SCALE: f64 = 1e6;

/// A road network of nodes joined by two-way roads.
#[derive(Clone, Debug)]
pub struct RoadMap {
    /// The positions of the road nodes.
    nodes: Vec<Coordinate>,
    /// The nodes adjacent to each node.
    adjacent: Vec<SmallVec<[usize; 4]>>,
    /// The extents of the map.
    bounds: Bounds,
}

impl RoadMap {
    /// Creates a road map from its nodes and the roads between them,
    /// given as pairs of node indices.
    pub fn new(nodes: Vec<Coordinate>, roads: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut adjacent = vec![SmallVec::new(); nodes.len()];
        for (a, b) in roads {
            if a >= nodes.len() || b >= nodes.len() {
                panic!("Road ({a}, {b}) joins a node outside the map");
            }
            adjacent[a].push(b);
            adjacent[b].push(a);
        }
        let bounds = Bounds::enclosing(&nodes).unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0));
        Self {
            nodes,
            adjacent,
            bounds,
        }
    }

    /// Creates a grid of `cols` by `rows` nodes, `spacing` apart, with roads between neighbours.
    pub fn grid(cols: usize, rows: usize, spacing: f64) -> Self {
        let nodes = iproduct!(0..rows, 0..cols)
            .map(|(row, col)| Coordinate::new(col as f64 * spacing, row as f64 * spacing))
            .collect();
        let index = |row: usize, col: usize| row * cols + col;
        let roads = iproduct!(0..rows, 0..cols).flat_map(|(row, col)| {
            let east = (col + 1 < cols).then(|| (index(row, col), index(row, col + 1)));
            let north = (row + 1 < rows).then(|| (index(row, col), index(row + 1, col)));
            east.into_iter().chain(north)
        });
        Self::new(nodes, roads)
    }

    /// The positions of the road nodes.
    pub fn nodes(&self) -> &[Coordinate] {
        &self.nodes
    }

    /// Finds the index of the node closest to `position`.
    fn nearest_node(&self, position: Coordinate) -> Option<usize> {
        self.nodes
            .iter()
            .map(|node| node.distance2(position))
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }

    /// The roads leaving a node, with the cost of driving along each.
    fn successors(&self, node: usize) -> impl Iterator<Item = (usize, u64)> + '_ {
        let from = self.nodes[node];
        self.adjacent[node].iter().map(move |&to| {
            let cost = (COST_SCALE * from.distance(self.nodes[to])).ceil() as u64;
            (to, cost)
        })
    }

    /// A lower bound on the cost of driving from a node to the goal.
    fn heuristic(&self, node: usize, goal: usize) -> u64 {
        (COST_SCALE * self.nodes[node].distance(self.nodes[goal])).floor() as u64
    }
}

impl MapModel for RoadMap {
    fn random_position(&self, rng: &mut dyn RngCore) -> Coordinate {
        self.bounds.lerp(rng.gen(), rng.gen())
    }

    fn nearest_road_node(&self, position: Coordinate) -> Coordinate {
        self.nearest_node(position)
            .map(|idx| self.nodes[idx])
            .unwrap_or(position)
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl RoutePlanner for RoadMap {
    fn find_path(&self, from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
        let (Some(start), Some(goal)) = (self.nearest_node(from), self.nearest_node(to)) else {
            return vec![];
        };
        let result = pathfinding::directed::astar::astar(
            &start,
            |node| self.successors(*node),
            |node| self.heuristic(*node, goal),
            |node| *node == goal,
        );
        let Some((route, _)) = result else {
            return vec![];
        };

        let mut path: Vec<_> = route.into_iter().map(|idx| self.nodes[idx]).collect();
        if path.last() != Some(&to) {
            path.push(to);
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn grid_layout() {
        let map = RoadMap::grid(3, 2, 10.0);
        assert_eq!(map.nodes().len(), 6);
        assert_eq!(map.nodes()[4], Coordinate::new(10.0, 10.0));
        assert_eq!(map.bounds(), Bounds::new(0.0, 0.0, 10.0, 20.0));
        // Corner nodes have two roads, edge nodes three.
        assert_eq!(map.adjacent[0].len(), 2);
        assert_eq!(map.adjacent[1].len(), 3);
    }

    #[test]
    fn snaps_to_nearest_node() {
        let map = RoadMap::grid(3, 3, 10.0);
        assert_eq!(
            map.nearest_road_node(Coordinate::new(12.0, 17.0)),
            Coordinate::new(10.0, 20.0)
        );
    }

    #[test]
    fn random_positions_lie_within_bounds() {
        let map = RoadMap::grid(4, 4, 5.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(map.bounds().contains(map.random_position(&mut rng)));
        }
    }

    #[test]
    fn shortest_route_along_roads() {
        let map = RoadMap::grid(3, 3, 10.0);
        let path = map.find_path(Coordinate::new(0.0, 0.0), Coordinate::new(20.0, 0.0));
        assert_eq!(
            path,
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(10.0, 0.0),
                Coordinate::new(20.0, 0.0),
            ]
        );

        let path = map.find_path(Coordinate::new(0.0, 0.0), Coordinate::new(20.0, 20.0));
        assert_eq!(path.len(), 5);
        assert_eq!(path.last(), Some(&Coordinate::new(20.0, 20.0)));
    }

    #[test]
    fn route_ends_at_off_road_destination() {
        let map = RoadMap::grid(2, 2, 10.0);
        let to = Coordinate::new(9.0, 1.0);
        let path = map.find_path(Coordinate::new(0.0, 0.0), to);
        assert_eq!(path.last(), Some(&to));
        assert_eq!(path[path.len() - 2], Coordinate::new(10.0, 0.0));
    }

    #[test]
    fn disconnected_destination_is_unreachable() {
        let nodes = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(5.0, 5.0),
        ];
        let map = RoadMap::new(nodes, [(0, 1)]);
        assert!(map
            .find_path(Coordinate::new(0.0, 0.0), Coordinate::new(5.0, 5.0))
            .is_empty());
        assert!(RoadMap::new(vec![], Vec::new())
            .find_path(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .is_empty());
    }
}
