//! Adjacency graph between fragments and its connected subgraphs.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;

use crate::fragments::{FragmentArena, FragmentId};

/// Undirected graph of fragments, edges weighted by the gap between them.
pub type PartGraph = UnGraph<FragmentId, f64>;

/// Link every pair of parts whose bounding boxes are no more than
/// `max_gap` apart. Nodes are added in `parts` order.
pub fn build_links(arena: &FragmentArena, parts: &[FragmentId], max_gap: f64) -> PartGraph {
    let mut graph = PartGraph::with_capacity(parts.len(), parts.len());
    let nodes: Vec<NodeIndex> = parts.iter().map(|&id| graph.add_node(id)).collect();

    for i in 0..parts.len() {
        let bi = arena.get(parts[i]).bounds();
        for j in (i + 1)..parts.len() {
            let gap = bi.gap(&arena.get(parts[j]).bounds());
            if gap <= max_gap {
                graph.add_edge(nodes[i], nodes[j], gap);
            }
        }
    }

    graph
}

/// Maximal connected sets of fragments, each sorted by fragment id, and
/// ordered by their first fragment id.
pub fn connected_sets(graph: &PartGraph) -> Vec<Vec<FragmentId>> {
    let mut union = UnionFind::<usize>::new(graph.node_count());
    for edge in graph.edge_indices() {
        if let Some((a, b)) = graph.edge_endpoints(edge) {
            union.union(a.index(), b.index());
        }
    }

    let mut sets: Vec<(usize, Vec<FragmentId>)> = Vec::new();
    for node in graph.node_indices() {
        let root = union.find(node.index());
        match sets.iter_mut().find(|(r, _)| *r == root) {
            Some((_, set)) => set.push(graph[node]),
            None => sets.push((root, vec![graph[node]])),
        }
    }

    let mut sets: Vec<Vec<FragmentId>> = sets
        .into_iter()
        .map(|(_, mut set)| {
            set.sort();
            set
        })
        .collect();
    sets.sort_by_key(|set| set[0]);
    sets
}

/// Restriction of `graph` to the given fragments, nodes following the
/// order of `set`.
pub fn sub_graph(graph: &PartGraph, set: &[FragmentId]) -> PartGraph {
    let mut sub = PartGraph::with_capacity(set.len(), set.len());
    let mut mapping: Vec<(NodeIndex, NodeIndex)> = Vec::with_capacity(set.len());

    for &id in set {
        if let Some(old) = graph.node_indices().find(|&n| graph[n] == id) {
            mapping.push((old, sub.add_node(id)));
        }
    }

    for edge in graph.edge_indices() {
        let (a, b) = match graph.edge_endpoints(edge) {
            Some(ends) => ends,
            None => continue,
        };
        let na = mapping.iter().find(|(old, _)| *old == a).map(|(_, new)| *new);
        let nb = mapping.iter().find(|(old, _)| *old == b).map(|(_, new)| *new);
        if let (Some(na), Some(nb)) = (na, nb) {
            sub.add_edge(na, nb, graph[edge]);
        }
    }

    sub
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::build_fragments;
    use crate::model::Point;
    use crate::pixels::PixelSource;

    fn arena() -> FragmentArena {
        // Three blobs: two close ones on the left, one far on the right
        let source = PixelSource::from_ascii(&[
            "##.##........##",
            "##.##........##",
        ])
        .unwrap();
        build_fragments(&source, Point::new(0, 0))
    }

    #[test]
    fn links_close_parts_only() {
        let arena = arena();
        let graph = build_links(&arena, &arena.ids(), 2.0);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge_indices().next().unwrap();
        assert_eq!(graph[edge], 1.0);
    }

    #[test]
    fn partitions_into_connected_sets() {
        let arena = arena();
        let graph = build_links(&arena, &arena.ids(), 2.0);
        let sets = connected_sets(&graph);
        assert_eq!(
            sets,
            vec![vec![FragmentId(0), FragmentId(1)], vec![FragmentId(2)]]
        );
    }

    #[test]
    fn large_gap_links_everything() {
        let arena = arena();
        let graph = build_links(&arena, &arena.ids(), 100.0);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(connected_sets(&graph).len(), 1);
    }

    #[test]
    fn sub_graph_keeps_inner_edges() {
        let arena = arena();
        let graph = build_links(&arena, &arena.ids(), 9.0);
        // 0-1 gap 1, 1-2 gap 8, 0-2 gap 11
        assert_eq!(graph.edge_count(), 2);
        let sub = sub_graph(&graph, &[FragmentId(1), FragmentId(2)]);
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
        let edge = sub.edge_indices().next().unwrap();
        assert_eq!(sub[edge], 8.0);
    }

    #[test]
    fn empty_graph_has_no_sets() {
        let graph = PartGraph::default();
        assert!(connected_sets(&graph).is_empty());
    }
}
