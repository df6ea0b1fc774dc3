//! Fragment source and pruner.
//!
//! The pixel buffer is read as vertical runs; runs of adjacent columns
//! that overlap vertically belong to the same connected fragment.

use petgraph::unionfind::UnionFind;

use crate::config::Parameters;
use crate::glyph::Glyph;
use crate::model::{Point, Rect};
use crate::pixels::PixelSource;

/// Index of a fragment within its [`FragmentArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(pub usize);

/// Atomic connected component.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub id: FragmentId,
    pub glyph: Glyph,
}

impl Fragment {
    pub fn bounds(&self) -> Rect {
        self.glyph.bounds
    }

    pub fn weight(&self) -> u32 {
        self.glyph.weight
    }
}

/// All fragments of one extraction pass, ordered by left abscissa then
/// top ordinate. `fragments[i].id == FragmentId(i)`.
#[derive(Debug, Clone, Default)]
pub struct FragmentArena {
    fragments: Vec<Fragment>,
}

impl FragmentArena {
    /// Build an arena from glyphs, in the given order.
    pub fn from_glyphs(glyphs: Vec<Glyph>) -> Self {
        let fragments = glyphs
            .into_iter()
            .enumerate()
            .map(|(i, glyph)| Fragment {
                id: FragmentId(i),
                glyph,
            })
            .collect();
        Self { fragments }
    }

    pub fn get(&self, id: FragmentId) -> &Fragment {
        &self.fragments[id.0]
    }

    pub fn ids(&self) -> Vec<FragmentId> {
        self.fragments.iter().map(|f| f.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Compound glyph made of the given parts.
    pub fn compound(&self, parts: &[FragmentId]) -> Option<Glyph> {
        let pixels: Vec<Point> = parts
            .iter()
            .flat_map(|&id| self.get(id).glyph.pixels().iter().copied())
            .collect();
        Glyph::from_pixels(pixels)
    }
}

/// A vertical run of foreground pixels.
#[derive(Debug, Clone, Copy)]
struct Run {
    x: i32,
    start: i32,
    stop: i32,
}

/// Vertical runs, grouped per column.
fn column_runs(source: &PixelSource) -> Vec<Vec<Run>> {
    let mut columns = Vec::with_capacity(source.width());
    for x in 0..source.width() as i32 {
        let mut runs = Vec::new();
        let mut start: Option<i32> = None;
        for y in 0..source.height() as i32 {
            match (source.is_foreground(x, y), start) {
                (true, None) => start = Some(y),
                (false, Some(s)) => {
                    runs.push(Run { x, start: s, stop: y - 1 });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push(Run {
                x,
                start: s,
                stop: source.height() as i32 - 1,
            });
        }
        columns.push(runs);
    }
    columns
}

/// Build the connected fragments of a buffer whose top-left pixel lies at
/// `origin` in sheet coordinates.
pub fn build_fragments(source: &PixelSource, origin: Point) -> FragmentArena {
    let columns = column_runs(source);
    let runs: Vec<Run> = columns.iter().flatten().copied().collect();
    let mut union = UnionFind::<usize>::new(runs.len());

    // Link overlapping runs of consecutive columns
    let mut first_of_column = Vec::with_capacity(columns.len());
    let mut offset = 0;
    for col in &columns {
        first_of_column.push(offset);
        offset += col.len();
    }
    for x in 1..columns.len() {
        let prev = first_of_column[x - 1];
        let cur = first_of_column[x];
        for (i, a) in columns[x - 1].iter().enumerate() {
            for (j, b) in columns[x].iter().enumerate() {
                if a.start.max(b.start) <= a.stop.min(b.stop) {
                    union.union(prev + i, cur + j);
                }
            }
        }
    }

    // Gather pixels per component, in order of first appearance
    let mut slot_of_root: Vec<Option<usize>> = vec![None; runs.len()];
    let mut components: Vec<Vec<Point>> = Vec::new();
    for (i, run) in runs.iter().enumerate() {
        let root = union.find(i);
        let slot = match slot_of_root[root] {
            Some(s) => s,
            None => {
                components.push(Vec::new());
                slot_of_root[root] = Some(components.len() - 1);
                components.len() - 1
            }
        };
        for y in run.start..=run.stop {
            components[slot].push(Point::new(origin.x + run.x, origin.y + y));
        }
    }

    let mut glyphs: Vec<Glyph> = components.into_iter().filter_map(Glyph::from_pixels).collect();
    glyphs.sort_by_key(|g| (g.bounds.x, g.bounds.y));
    FragmentArena::from_glyphs(glyphs)
}

/// Purge the population of candidate parts as much as possible, since the
/// cost of their later combinations is exponential.
///
/// Parts lighter than `min_part_weight` are dropped, as well as parts
/// starting on the rightmost column `x_max` (they belong to the stem of the
/// next slice). Beyond `max_part_count`, only the heaviest parts are kept,
/// in decreasing weight order.
pub fn purge_parts(
    arena: &FragmentArena,
    parts: Vec<FragmentId>,
    x_max: i32,
    params: &Parameters,
) -> Vec<FragmentId> {
    let mut parts: Vec<FragmentId> = parts
        .into_iter()
        .filter(|&id| {
            let part = arena.get(id);
            part.weight() >= params.min_part_weight && part.bounds().x != x_max
        })
        .collect();

    if parts.len() > params.max_part_count {
        parts.sort_by(|a, b| arena.get(*b).weight().cmp(&arena.get(*a).weight()));
        parts.truncate(params.max_part_count);
    }

    parts
}
