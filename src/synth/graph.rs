use rand::Rng;
use std::collections::{BTreeMap, HashSet};

/// A simple growing graph over nodes `0..n`
///
/// Besides the adjacency lists the graph keeps a degree urn: every node appears in the urn
/// once per unit of attachment degree, so a uniform draw from the urn is a draw
/// proportional to degree. For directed graphs the attachment degree is the in-degree and
/// neighbours are out-neighbours.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    directed: bool,
    adjacency: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
    edge_set: HashSet<(usize, usize)>,
    edge_list: Vec<(usize, usize)>,
    urn: Vec<usize>,
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Default::default()
        }
    }

    /// The complete graph on `n` nodes
    ///
    /// Directed complete graphs carry both `i -> j` and `j -> i`.
    pub fn complete(n: usize, directed: bool) -> Self {
        let mut graph = Self::new(directed);
        for _ in 0..n {
            graph.add_node();
        }
        for i in 0..n {
            for j in (i + 1)..n {
                graph.add_edge(i, j);
                if directed {
                    graph.add_edge(j, i);
                }
            }
        }
        graph
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn n_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edge_list.len()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edge_list
    }

    /// Append a new isolated node and return its id
    pub fn add_node(&mut self) -> usize {
        self.adjacency.push(Vec::new());
        self.in_degree.push(0);
        self.adjacency.len() - 1
    }

    /// Grow the node range so that `id` is a valid node
    pub(crate) fn ensure_node(&mut self, id: usize) {
        while self.adjacency.len() <= id {
            self.add_node();
        }
    }

    fn key(&self, u: usize, v: usize) -> (usize, usize) {
        if self.directed {
            (u, v)
        } else {
            (u.min(v), u.max(v))
        }
    }

    /// Add the edge `u - v` (`u -> v` when directed)
    ///
    /// Returns `false`, leaving the graph untouched, for self loops and duplicate edges.
    pub fn add_edge(&mut self, u: usize, v: usize) -> bool {
        if u == v || self.has_edge(u, v) {
            return false;
        }
        self.ensure_node(u.max(v));
        let key = self.key(u, v);
        self.edge_set.insert(key);
        self.edge_list.push((u, v));
        self.adjacency[u].push(v);
        self.in_degree[v] += 1;
        self.urn.push(v);
        if !self.directed {
            self.adjacency[v].push(u);
            self.in_degree[u] += 1;
            self.urn.push(u);
        }
        true
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.edge_set.contains(&self.key(u, v))
    }

    /// Neighbours of `v` (out-neighbours when directed); empty for unknown nodes
    pub fn neighbors(&self, v: usize) -> &[usize] {
        self.adjacency.get(v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attachment degree of `v`: the degree, or the in-degree when directed
    pub fn degree(&self, v: usize) -> usize {
        self.in_degree.get(v).copied().unwrap_or(0)
    }

    /// Whether `c` is reachable from `u` in exactly two steps through one of its neighbours
    pub fn is_friend_of_friend(&self, u: usize, c: usize) -> bool {
        c != u && self.neighbors(u).iter().any(|&w| self.has_edge(w, c))
    }

    /// Histogram of attachment degrees, `degree -> number of nodes`
    pub fn degree_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for &d in &self.in_degree {
            *counts.entry(d).or_insert(0) += 1;
        }
        counts
    }

    /// Draw a node uniformly at random
    pub(crate) fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.adjacency.is_empty() {
            return None;
        }
        Some(rng.random_range(0..self.adjacency.len()))
    }

    /// Draw a node with probability proportional to its attachment degree
    pub(crate) fn sample_preferential<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.urn.is_empty() {
            return None;
        }
        Some(self.urn[rng.random_range(0..self.urn.len())])
    }
}
