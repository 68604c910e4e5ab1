use rand::Rng;
use std::collections::HashSet;

use super::{read_edge_list, Edge, Graph, GraphError};
use crate::data::{ChoiceData, ChoiceSet};
use crate::util::DataPaths;

/// Replay an edge list and extract one choice set per attachment to an existing node
///
/// The edges are added to an initially empty graph in order. Before adding a grown edge
/// `u -> v` (`t > 0`) whose target `v` is already known, a [ChoiceSet] is emitted with `v`
/// as the chosen candidate and up to `n_alt` alternatives drawn uniformly without
/// replacement from the other known nodes, excluding `u` and the nodes `u` is already
/// attached to. Degrees and friend-of-friend flags are taken from the graph as it was
/// just before the edge.
///
/// Seed edges (`t = 0`), edges to unseen targets, duplicates, self loops and edges without
/// any alternative only update the graph (or are skipped).
pub fn process_edges<R: Rng + ?Sized>(
    edges: &[Edge],
    n_alt: usize,
    directed: bool,
    rng: &mut R,
) -> Result<ChoiceData, GraphError> {
    let mut graph = Graph::new(directed);
    let mut seen: Vec<usize> = Vec::new();
    let mut is_seen: Vec<bool> = Vec::new();
    let mut data = ChoiceData::default();
    let mut skipped = 0;

    for edge in edges {
        let (u, v) = (edge.from, edge.to);
        if u == v || graph.has_edge(u, v) {
            skipped += 1;
            continue;
        }

        let target_known = is_seen.get(v).copied().unwrap_or(false);
        if edge.t > 0 && target_known {
            let source_known = is_seen.get(u).copied().unwrap_or(false);
            match choice_set(&graph, &seen, source_known, u, v, n_alt, data.len(), rng)? {
                Some(set) => data.push(set),
                None => skipped += 1,
            }
        }

        for node in [u, v] {
            if is_seen.len() <= node {
                is_seen.resize(node + 1, false);
            }
            if !is_seen[node] {
                is_seen[node] = true;
                seen.push(node);
            }
        }
        graph.add_edge(u, v);
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} of {} edges while extracting choices", skipped, edges.len());
    }
    tracing::debug!("Extracted {}", data);
    Ok(data)
}

#[allow(clippy::too_many_arguments)]
fn choice_set<R: Rng + ?Sized>(
    graph: &Graph,
    seen: &[usize],
    source_known: bool,
    u: usize,
    v: usize,
    n_alt: usize,
    id: usize,
    rng: &mut R,
) -> Result<Option<ChoiceSet>, GraphError> {
    let attached = graph.neighbors(u);
    let allowed = |c: usize| c != u && c != v && !attached.contains(&c);
    let available = seen
        .len()
        .saturating_sub(1 + usize::from(source_known) + attached.len());

    let alternatives: Vec<usize> = if available <= n_alt {
        seen.iter().copied().filter(|&c| allowed(c)).collect()
    } else {
        let mut picked: HashSet<usize> = HashSet::with_capacity(n_alt);
        let mut alternatives = Vec::with_capacity(n_alt);
        while alternatives.len() < n_alt {
            let c = seen[rng.random_range(0..seen.len())];
            if allowed(c) && picked.insert(c) {
                alternatives.push(c);
            }
        }
        alternatives
    };
    if alternatives.is_empty() {
        return Ok(None);
    }

    let candidates: Vec<usize> = std::iter::once(v).chain(alternatives).collect();
    let degrees = candidates.iter().map(|&c| graph.degree(c) as f64).collect();
    let fof = candidates
        .iter()
        .map(|&c| graph.is_friend_of_friend(u, c))
        .collect();
    Ok(Some(ChoiceSet::new(id, degrees, fof, 0)?))
}

/// Turn the named synthetic graph into a choice dataset on disk
///
/// Reads `<data>/synth_graphs/<graph>.csv`, extracts choice sets with [process_edges] and
/// writes them to `<data>/choices/<graph>.csv`.
pub fn process_all_edges<R: Rng + ?Sized>(
    paths: &DataPaths,
    graph: &str,
    n_alt: usize,
    directed: bool,
    rng: &mut R,
) -> Result<ChoiceData, GraphError> {
    let edges = read_edge_list(paths.graph(graph))?;
    let data = process_edges(&edges, n_alt, directed, rng)?;
    data.write_csv(paths.choices(graph))?;
    tracing::info!(
        "Processed {} edges of {} into {} choice sets",
        edges.len(),
        graph,
        data.len()
    );
    Ok(data)
}
