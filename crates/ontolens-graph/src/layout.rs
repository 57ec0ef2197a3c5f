//! Force-directed layout (Fruchterman–Reingold)

use crate::config::LayoutConfig;
use crate::graph::OntologyGraph;
use ontolens_domain::NodeId;
use std::collections::HashMap;

/// Smallest distance used in force computations
const MIN_DISTANCE: f64 = 0.01;

/// Assigns 2D coordinates to the nodes of an [`OntologyGraph`]
///
/// Starts from the positions the registry assigned and runs a fixed number of
/// simulation steps. Connected nodes attract, all pairs repel, and a weak
/// gravity keeps disconnected components on the canvas. Positions are
/// clamped to the square canvas centred on the origin.
pub struct ForceLayout {
    config: LayoutConfig,
    canvas_size: f64,
}

impl ForceLayout {
    /// Create a layout for a canvas of the given size
    pub fn new(config: LayoutConfig, canvas_size: f64) -> Self {
        Self {
            config,
            canvas_size,
        }
    }

    /// Run the simulation and write positions back into the graph
    pub fn apply(&self, graph: &mut OntologyGraph) {
        let n = graph.node_count();
        if n == 0 || self.config.iterations == 0 {
            return;
        }
        if !(self.canvas_size.is_finite() && self.canvas_size > 0.0) {
            tracing::warn!(canvas_size = self.canvas_size, "invalid canvas size, skipping layout");
            return;
        }

        let index: HashMap<&NodeId, usize> = graph
            .nodes()
            .enumerate()
            .map(|(i, node)| (&node.id, i))
            .collect();
        let mut positions: Vec<(f64, f64)> = graph.nodes().map(|node| (node.x, node.y)).collect();
        let springs: Vec<(usize, usize)> = graph
            .edges()
            .filter(|edge| !edge.is_self_loop())
            .filter_map(|edge| Some((*index.get(&edge.source)?, *index.get(&edge.target)?)))
            .collect();

        let half = self.canvas_size / 2.0;
        let k = (self.canvas_size * self.canvas_size / n as f64).sqrt().max(MIN_DISTANCE);
        let initial_temperature = self.config.initial_temperature * self.canvas_size;

        for step in 0..self.config.iterations {
            let mut displacement = vec![(0.0_f64, 0.0_f64); n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let (dx, dy, dist) = separation(positions[i], positions[j], i, j);
                    let force = k * k / dist;
                    let (fx, fy) = (dx / dist * force, dy / dist * force);
                    displacement[i].0 += fx;
                    displacement[i].1 += fy;
                    displacement[j].0 -= fx;
                    displacement[j].1 -= fy;
                }
            }

            for &(u, v) in &springs {
                let (dx, dy, dist) = separation(positions[u], positions[v], u, v);
                let force = dist * dist / k;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                displacement[u].0 -= fx;
                displacement[u].1 -= fy;
                displacement[v].0 += fx;
                displacement[v].1 += fy;
            }

            let temperature =
                initial_temperature * (1.0 - step as f64 / self.config.iterations as f64);

            for (position, delta) in positions.iter_mut().zip(displacement.iter()) {
                let dx = delta.0 - position.0 * self.config.gravity * k / half.max(MIN_DISTANCE);
                let dy = delta.1 - position.1 * self.config.gravity * k / half.max(MIN_DISTANCE);
                let length = (dx * dx + dy * dy).sqrt();
                if length < f64::EPSILON || !length.is_finite() {
                    continue;
                }
                let step_length = length.min(temperature);
                position.0 = (position.0 + dx / length * step_length).clamp(-half, half);
                position.1 = (position.1 + dy / length * step_length).clamp(-half, half);
            }
        }

        for (node, (x, y)) in graph.nodes_mut().zip(positions) {
            node.x = x;
            node.y = y;
        }

        tracing::debug!(
            nodes = n,
            springs = springs.len(),
            iterations = self.config.iterations,
            "force layout applied"
        );
    }
}

/// Vector from `b` to `a` and its (non-zero) length
///
/// Coincident nodes are nudged apart along a direction derived from their
/// indices so the result stays deterministic.
fn separation(a: (f64, f64), b: (f64, f64), i: usize, j: usize) -> (f64, f64, f64) {
    let mut dx = a.0 - b.0;
    let mut dy = a.1 - b.1;
    let mut dist = (dx * dx + dy * dy).sqrt();
    if dist < MIN_DISTANCE {
        let angle = (i * 31 + j * 17) as f64;
        dx = angle.cos() * MIN_DISTANCE;
        dy = angle.sin() * MIN_DISTANCE;
        dist = MIN_DISTANCE;
    }
    (dx, dy, dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphConfig;
    use ontolens_domain::{Entity, EntityRef, Relation};

    fn chain(len: usize) -> (Vec<Entity>, Vec<Relation>) {
        let entities: Vec<Entity> = (0..len).map(|i| Entity::new("Issue", format!("N-{}", i))).collect();
        let relations = (1..len)
            .map(|i| {
                Relation::new(
                    format!("r{}", i),
                    EntityRef::new("Issue", format!("N-{}", i - 1)),
                    EntityRef::new("Issue", format!("N-{}", i)),
                    "blocks",
                )
            })
            .collect();
        (entities, relations)
    }

    fn distance(graph: &OntologyGraph, a: &str, b: &str) -> f64 {
        let a = graph.node(&NodeId::from_raw(a)).unwrap();
        let b = graph.node(&NodeId::from_raw(b)).unwrap();
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_positions_stay_finite_and_on_canvas() {
        let (entities, relations) = chain(20);
        let config = GraphConfig::compact().with_seed(3);
        let graph = OntologyGraph::build_with_layout(&entities, &relations, &config);

        let half = config.canvas_size / 2.0;
        for node in graph.nodes() {
            assert!(node.x.is_finite() && node.y.is_finite());
            assert!(node.x.abs() <= half && node.y.abs() <= half);
        }
    }

    #[test]
    fn test_layout_is_deterministic_for_a_seed() {
        let (entities, relations) = chain(10);
        let config = GraphConfig::compact().with_seed(21);
        let a = OntologyGraph::build_with_layout(&entities, &relations, &config);
        let b = OntologyGraph::build_with_layout(&entities, &relations, &config);

        for (na, nb) in a.nodes().zip(b.nodes()) {
            assert_eq!((na.x, na.y), (nb.x, nb.y));
        }
    }

    #[test]
    fn test_connected_pair_ends_closer_than_unconnected_pair() {
        let entities = vec![Entity::new("Issue", "A"), Entity::new("Issue", "B")];
        let relations = vec![Relation::new(
            "r1",
            EntityRef::new("Issue", "A"),
            EntityRef::new("Issue", "B"),
            "blocks",
        )];
        let config = GraphConfig::default().with_seed(8);

        let connected = OntologyGraph::build_with_layout(&entities, &relations, &config);
        let unconnected = OntologyGraph::build_with_layout(&entities, &[], &config);

        assert!(
            distance(&connected, "Issue::A", "Issue::B")
                < distance(&unconnected, "Issue::A", "Issue::B")
        );
    }

    #[test]
    fn test_coincident_nodes_are_separated() {
        let (a, b, dist) = separation((1.0, 1.0), (1.0, 1.0), 0, 1);
        assert!(dist > 0.0);
        assert!(a.is_finite() && b.is_finite());
    }

    #[test]
    fn test_invalid_canvas_skips_layout() {
        let (entities, relations) = chain(3);
        let mut graph = OntologyGraph::build(&entities, &relations, &GraphConfig::default().with_seed(5));
        let before: Vec<(f64, f64)> = graph.nodes().map(|n| (n.x, n.y)).collect();

        ForceLayout::new(LayoutConfig::default(), -100.0).apply(&mut graph);
        ForceLayout::new(LayoutConfig::default(), f64::NAN).apply(&mut graph);

        let after: Vec<(f64, f64)> = graph.nodes().map(|n| (n.x, n.y)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_graph_is_noop() {
        let mut graph = OntologyGraph::empty();
        ForceLayout::new(LayoutConfig::default(), 100.0).apply(&mut graph);
        assert!(graph.is_empty());
    }
}
