//! Cluster decomposer: enumerates the connected subsets of a fragment graph.
//!
//! Each connected subset is offered at most once to the adapter. Growth
//! stops as soon as the compound becomes too large or too heavy (both only
//! increase when parts are added), and too light compounds are grown but
//! not offered.

use crate::fragments::{FragmentArena, FragmentId};
use crate::glyph::Glyph;
use crate::graph::PartGraph;
use crate::model::Rect;

/// Geometric predicates and evaluation callback driving a decomposition.
pub trait ClusterAdapter {
    fn is_too_small(&self, bounds: &Rect) -> bool;

    fn is_too_large(&self, bounds: &Rect) -> bool;

    fn is_too_light(&self, weight: u32) -> bool;

    fn is_too_heavy(&self, weight: u32) -> bool;

    /// Called for each acceptable compound, `parts` sorted by id.
    fn evaluate_glyph(&mut self, glyph: Glyph, parts: &[FragmentId]);
}

/// One decomposition run over a graph.
pub struct GlyphCluster<'a, A: ClusterAdapter> {
    graph: &'a PartGraph,
    arena: &'a FragmentArena,
    adapter: &'a mut A,
    adjacency: Vec<Vec<usize>>,
    offered: usize,
}

impl<'a, A: ClusterAdapter> GlyphCluster<'a, A> {
    pub fn new(graph: &'a PartGraph, arena: &'a FragmentArena, adapter: &'a mut A) -> Self {
        let mut adjacency = vec![Vec::new(); graph.node_count()];
        for node in graph.node_indices() {
            let mut neighbors: Vec<usize> = graph.neighbors(node).map(|n| n.index()).collect();
            neighbors.sort_unstable();
            neighbors.dedup();
            adjacency[node.index()] = neighbors;
        }
        Self {
            graph,
            arena,
            adapter,
            adjacency,
            offered: 0,
        }
    }

    /// Run the decomposition, returning the number of compounds offered.
    pub fn decompose(mut self) -> usize {
        for root in 0..self.adjacency.len() {
            let part = self.arena.get(self.node_part(root));
            let (bounds, weight) = (part.bounds(), part.weight());
            if self.adapter.is_too_large(&bounds) || self.adapter.is_too_heavy(weight) {
                continue;
            }
            let extension: Vec<usize> = self.adjacency[root]
                .iter()
                .copied()
                .filter(|&u| u > root)
                .collect();
            let mut subset = vec![root];
            self.extend(&mut subset, bounds, weight, extension, root);
        }
        self.offered
    }

    fn node_part(&self, node: usize) -> FragmentId {
        self.graph[petgraph::graph::NodeIndex::new(node)]
    }

    fn extend(
        &mut self,
        subset: &mut Vec<usize>,
        bounds: Rect,
        weight: u32,
        mut extension: Vec<usize>,
        root: usize,
    ) {
        self.offer(subset, weight);

        while !extension.is_empty() {
            let w = extension.remove(0);
            let part = self.arena.get(self.node_part(w));
            let new_bounds = bounds.union(&part.bounds());
            let new_weight = weight + part.weight();
            if self.adapter.is_too_large(&new_bounds) || self.adapter.is_too_heavy(new_weight) {
                continue;
            }

            // Exclusive neighbors of w: beyond root, outside subset and its neighborhood
            let mut next = extension.clone();
            for &u in &self.adjacency[w] {
                if u > root
                    && !subset.contains(&u)
                    && !subset.iter().any(|&s| self.adjacency[s].contains(&u))
                    && !next.contains(&u)
                {
                    next.push(u);
                }
            }

            subset.push(w);
            self.extend(subset, new_bounds, new_weight, next, root);
            subset.pop();
        }
    }

    fn offer(&mut self, subset: &[usize], weight: u32) {
        if self.adapter.is_too_light(weight) {
            return;
        }
        let mut parts: Vec<FragmentId> = subset.iter().map(|&n| self.node_part(n)).collect();
        parts.sort();
        if let Some(glyph) = self.arena.compound(&parts) {
            self.offered += 1;
            self.adapter.evaluate_glyph(glyph, &parts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::build_fragments;
    use crate::graph::build_links;
    use crate::model::Point;
    use crate::pixels::PixelSource;

    struct Recorder {
        max_weight: u32,
        min_weight: u32,
        seen: Vec<Vec<usize>>,
    }

    impl Recorder {
        fn new(min_weight: u32, max_weight: u32) -> Self {
            Self {
                max_weight,
                min_weight,
                seen: Vec::new(),
            }
        }
    }

    impl ClusterAdapter for Recorder {
        fn is_too_small(&self, _bounds: &Rect) -> bool {
            false
        }

        fn is_too_large(&self, _bounds: &Rect) -> bool {
            false
        }

        fn is_too_light(&self, weight: u32) -> bool {
            weight < self.min_weight
        }

        fn is_too_heavy(&self, weight: u32) -> bool {
            weight > self.max_weight
        }

        fn evaluate_glyph(&mut self, _glyph: Glyph, parts: &[FragmentId]) {
            self.seen.push(parts.iter().map(|p| p.0).collect());
        }
    }

    fn decompose(rows: &[&str], max_gap: f64, recorder: &mut Recorder) -> usize {
        let source = PixelSource::from_ascii(rows).unwrap();
        let arena = build_fragments(&source, Point::new(0, 0));
        let graph = build_links(&arena, &arena.ids(), max_gap);
        GlyphCluster::new(&graph, &arena, recorder).decompose()
    }

    #[test]
    fn path_of_three_has_six_subsets() {
        let mut recorder = Recorder::new(0, 1000);
        let offered = decompose(&["#.#.#"], 1.0, &mut recorder);
        assert_eq!(offered, 6);
        let mut seen = recorder.seen.clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                vec![0],
                vec![0, 1],
                vec![0, 1, 2],
                vec![1],
                vec![1, 2],
                vec![2],
            ]
        );
    }

    #[test]
    fn triangle_has_seven_subsets() {
        let mut recorder = Recorder::new(0, 1000);
        let offered = decompose(&["#.#.#"], 10.0, &mut recorder);
        assert_eq!(offered, 7);
        let mut seen = recorder.seen.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn disconnected_parts_are_never_combined() {
        let mut recorder = Recorder::new(0, 1000);
        let offered = decompose(&["#....#"], 1.0, &mut recorder);
        assert_eq!(offered, 2);
        assert!(recorder.seen.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn heavy_compounds_stop_growth() {
        // Each part weighs 2, compounds above 3 are too heavy
        let mut recorder = Recorder::new(0, 3);
        let offered = decompose(&["#.#.#", "#.#.#"], 10.0, &mut recorder);
        assert_eq!(offered, 3);
        assert!(recorder.seen.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn light_compounds_grow_but_are_not_offered() {
        // Each part weighs 1, compounds need at least 2
        let mut recorder = Recorder::new(2, 1000);
        let offered = decompose(&["#.#.#"], 1.0, &mut recorder);
        assert_eq!(offered, 3);
        assert!(recorder.seen.iter().all(|s| s.len() >= 2));
    }
}
