use rand::distr::weighted::WeightedIndex;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::{Graph, GraphError};
use crate::util::create_parent;

/// Rejection draws attempted before falling back to an explicit candidate list
const MAX_REJECTIONS: usize = 64;

/// One edge of a growing graph
///
/// `t` is the growth step that created the edge; edges of the seed graph have `t = 0`
/// and are never turned into choices.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub t: usize,
}

/// Options for [make_rp_graph]
///
/// - `r`: probability that an edge after the first picks its target among all nodes
///   rather than among friends-of-friends of the new node
/// - `p`: probability that a target is picked uniformly rather than proportionally to
///   its degree
#[derive(Debug, Clone)]
pub struct RpGraphOptions {
    pub n_max: usize,
    pub r: f64,
    pub p: f64,
    pub m: usize,
    pub directed: bool,
    pub seed_graph: Option<Graph>,
}

impl RpGraphOptions {
    /// Grow to `n_max` nodes with one edge per new node
    pub fn new(n_max: usize, r: f64, p: f64) -> Self {
        Self {
            n_max,
            r,
            p,
            m: 1,
            directed: false,
            seed_graph: None,
        }
    }

    /// Number of edges each new node adds
    pub fn with_edges_per_node(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    /// Start from the given graph instead of the complete graph on `m + 1` nodes
    pub fn with_seed_graph(mut self, graph: Graph) -> Self {
        self.seed_graph = Some(graph);
        self
    }

    pub fn directed(mut self) -> Self {
        self.directed = true;
        self
    }

    fn validate(&self) -> Result<(), GraphError> {
        for (name, value) in [("r", self.r), ("p", self.p)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GraphError::InvalidProbability { name, value });
            }
        }
        if self.m == 0 {
            return Err(GraphError::NoEdgesPerNode);
        }
        Ok(())
    }
}

/// Grow a graph under the (r,p) attachment rule
///
/// Starting from the seed graph, nodes are added until the graph has `n_max` nodes. Each
/// new node adds up to `m` edges:
///
/// - the first edge, and with probability `r` every later edge, picks its target among
///   all existing nodes; otherwise the target is picked among the friends-of-friends of
///   the new node, falling back to all nodes when there are none left
/// - inside the chosen pool the target is uniform with probability `p` and proportional
///   to degree otherwise
///
/// Self loops and duplicate edges are never created; a node stops adding edges when no
/// candidate is left.
///
/// # Returns
///
/// The grown graph and its edge list: seed edges first (`t = 0`), then the grown edges in
/// the order they were added.
///
/// # Example
///
/// ```
/// use netgrowth::synth::{make_rp_graph, RpGraphOptions};
/// use netgrowth::util::create_rng;
///
/// let options = RpGraphOptions::new(100, 1.0, 0.5).with_edges_per_node(2);
/// let (graph, edges) = make_rp_graph(&options, &mut create_rng(42)).unwrap();
/// assert_eq!(graph.n_nodes(), 100);
/// assert_eq!(edges.len(), graph.n_edges());
/// ```
pub fn make_rp_graph<R: Rng + ?Sized>(
    options: &RpGraphOptions,
    rng: &mut R,
) -> Result<(Graph, Vec<Edge>), GraphError> {
    options.validate()?;
    let mut graph = match &options.seed_graph {
        Some(seed) => seed.clone(),
        None => Graph::complete(options.m + 1, options.directed),
    };
    if graph.is_directed() != options.directed {
        return Err(GraphError::DirectionMismatch {
            seed: graph.is_directed(),
            requested: options.directed,
        });
    }
    if graph.n_nodes() > options.n_max {
        return Err(GraphError::SeedTooLarge {
            seed: graph.n_nodes(),
            n_max: options.n_max,
        });
    }

    let uniform = Bernoulli::new(options.p).map_err(|_| GraphError::InvalidProbability {
        name: "p",
        value: options.p,
    })?;
    let global = Bernoulli::new(options.r).map_err(|_| GraphError::InvalidProbability {
        name: "r",
        value: options.r,
    })?;

    let mut edges: Vec<Edge> = graph
        .edges()
        .iter()
        .map(|&(from, to)| Edge { from, to, t: 0 })
        .collect();

    let mut t = 0;
    while graph.n_nodes() < options.n_max {
        t += 1;
        let node = graph.add_node();
        let mut targets: Vec<usize> = Vec::with_capacity(options.m);
        for j in 0..options.m {
            let pick_uniform = uniform.sample(rng);
            let local = j > 0 && !global.sample(rng);
            let target = if local {
                let pool = friend_of_friend_pool(&graph, node, &targets);
                if pool.is_empty() {
                    pick_global(&graph, node, &targets, pick_uniform, rng)
                } else {
                    Some(pick_from_pool(&graph, &pool, pick_uniform, rng))
                }
            } else {
                pick_global(&graph, node, &targets, pick_uniform, rng)
            };

            let Some(target) = target else {
                break;
            };
            graph.add_edge(node, target);
            targets.push(target);
            edges.push(Edge {
                from: node,
                to: target,
                t,
            });
        }
    }

    tracing::debug!(
        "Grew (r={}, p={}, m={}) graph: {} nodes, {} edges",
        options.r,
        options.p,
        options.m,
        graph.n_nodes(),
        graph.n_edges()
    );
    Ok((graph, edges))
}

/// Neighbours of the new node's targets that the node could still attach to
fn friend_of_friend_pool(graph: &Graph, node: usize, targets: &[usize]) -> Vec<usize> {
    let pool: BTreeSet<usize> = targets
        .iter()
        .flat_map(|&t| graph.neighbors(t).iter().copied())
        .filter(|&c| c != node && !targets.contains(&c))
        .collect();
    pool.into_iter().collect()
}

fn pick_from_pool<R: Rng + ?Sized>(
    graph: &Graph,
    pool: &[usize],
    pick_uniform: bool,
    rng: &mut R,
) -> usize {
    if !pick_uniform {
        // All-zero weights cannot be sampled; those fall through to a uniform pick
        if let Ok(weights) = WeightedIndex::new(pool.iter().map(|&c| graph.degree(c) as f64)) {
            return pool[weights.sample(rng)];
        }
    }
    pool[rng.random_range(0..pool.len())]
}

fn pick_global<R: Rng + ?Sized>(
    graph: &Graph,
    node: usize,
    targets: &[usize],
    pick_uniform: bool,
    rng: &mut R,
) -> Option<usize> {
    let excluded = |c: usize| c == node || targets.contains(&c);
    for _ in 0..MAX_REJECTIONS {
        let draw = if pick_uniform {
            graph.sample_uniform(rng)
        } else {
            graph.sample_preferential(rng)
        };
        match draw {
            Some(c) if !excluded(c) => return Some(c),
            Some(_) => continue,
            None => break,
        }
    }

    let pool: Vec<usize> = (0..graph.n_nodes()).filter(|&c| !excluded(c)).collect();
    if pool.is_empty() {
        return None;
    }
    Some(pick_from_pool(graph, &pool, pick_uniform, rng))
}

/// Write an edge list as CSV with the columns `from,to,t`
///
/// Missing parent directories are created.
pub fn write_edge_list(edges: &[Edge], path: impl AsRef<Path>) -> Result<(), GraphError> {
    let path = path.as_ref();
    create_parent(path).map_err(|e| GraphError::CSVError(e.to_string()))?;
    let mut writer = csv::Writer::from_path(path).map_err(|e| GraphError::CSVError(e.to_string()))?;
    for edge in edges {
        writer
            .serialize(edge)
            .map_err(|e| GraphError::CSVError(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| GraphError::CSVError(e.to_string()))?;
    Ok(())
}

/// Read an edge list written by [write_edge_list]
pub fn read_edge_list(path: impl AsRef<Path>) -> Result<Vec<Edge>, GraphError> {
    let mut reader = csv::Reader::from_path(path.as_ref())
        .map_err(|e| GraphError::CSVError(format!("{}: {}", path.as_ref().display(), e)))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| GraphError::CSVError(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::create_rng;

    #[test]
    fn grows_to_requested_size() {
        let options = RpGraphOptions::new(200, 0.5, 0.5).with_edges_per_node(3);
        let (graph, edges) = make_rp_graph(&options, &mut create_rng(3)).unwrap();

        assert_eq!(graph.n_nodes(), 200);
        // Seed K4 has 6 edges, every later node adds exactly 3
        assert_eq!(edges.len(), 6 + 196 * 3);
        assert_eq!(edges.iter().filter(|e| e.t == 0).count(), 6);
        assert!(edges.iter().all(|e| e.from != e.to));
        assert!(edges.windows(2).all(|w| w[0].t <= w[1].t));
    }

    #[test]
    fn same_seed_same_graph() {
        let options = RpGraphOptions::new(100, 0.7, 0.2).with_edges_per_node(2);
        let (_, a) = make_rp_graph(&options, &mut create_rng(11)).unwrap();
        let (_, b) = make_rp_graph(&options, &mut create_rng(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn preferential_growth_has_heavier_tail_than_uniform() {
        let max_degree = |p: f64| {
            let options = RpGraphOptions::new(3000, 1.0, p);
            let (graph, _) = make_rp_graph(&options, &mut create_rng(5)).unwrap();
            *graph.degree_counts().keys().last().unwrap()
        };
        assert!(max_degree(0.0) > max_degree(1.0));
    }

    #[test]
    fn small_seed_runs_out_of_candidates_gracefully() {
        // Node 1 can only attach to the seed node, node 2 to both earlier nodes
        let options = RpGraphOptions::new(3, 1.0, 1.0)
            .with_edges_per_node(5)
            .with_seed_graph(Graph::complete(1, false));
        let (graph, edges) = make_rp_graph(&options, &mut create_rng(0)).unwrap();
        assert_eq!(graph.n_nodes(), 3);
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn validates_options() {
        let mut rng = create_rng(0);
        assert_eq!(
            make_rp_graph(&RpGraphOptions::new(10, 1.5, 0.5), &mut rng).unwrap_err(),
            GraphError::InvalidProbability {
                name: "r",
                value: 1.5
            }
        );
        assert_eq!(
            make_rp_graph(
                &RpGraphOptions::new(10, 1.0, 0.5).with_edges_per_node(0),
                &mut rng
            )
            .unwrap_err(),
            GraphError::NoEdgesPerNode
        );
        assert_eq!(
            make_rp_graph(
                &RpGraphOptions::new(5, 1.0, 0.5).with_seed_graph(Graph::complete(10, false)),
                &mut rng
            )
            .unwrap_err(),
            GraphError::SeedTooLarge { seed: 10, n_max: 5 }
        );
        assert!(matches!(
            make_rp_graph(
                &RpGraphOptions::new(50, 1.0, 0.5).with_seed_graph(Graph::complete(3, true)),
                &mut rng
            ),
            Err(GraphError::DirectionMismatch { .. })
        ));
    }

    #[test]
    fn edge_list_round_trip_on_disk() {
        let dir = std::env::temp_dir().join(format!("netgrowth-edges-{}", std::process::id()));
        let path = dir.join("nested").join("g.csv");
        let edges = vec![
            Edge { from: 0, to: 1, t: 0 },
            Edge { from: 2, to: 0, t: 1 },
        ];
        write_edge_list(&edges, &path).unwrap();
        assert_eq!(read_edge_list(&path).unwrap(), edges);
        std::fs::remove_dir_all(&dir).ok();
    }
}
