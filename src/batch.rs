//! Merging many small graphs into one batch
//!
//! Graphs are laid out back to back: graph `k` owns the node range `node_ranges[k]` and the edge
//! range `edge_ranges[k]`, and its edge endpoints are shifted by the start of its node range.

use crate::record::MalformedInput;
use crate::sparse::SparseGraph;
use std::ops::Range;
use tracing::*;

/// Several graphs merged by disjoint union
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchedGraph {
    pub graph: SparseGraph,
    pub node_ranges: Vec<Range<usize>>,
    pub edge_ranges: Vec<Range<usize>>,
}
impl BatchedGraph {
    /// Lay out all graphs in order, offsetting node ids so they don't overlap.
    pub fn union<'a, I: IntoIterator<Item = &'a SparseGraph>>(graphs: I) -> Self {
        let mut out = Self::default();
        for g in graphs {
            let node_start = out.graph.node_count();
            let edge_start = out.graph.edge_count();
            out.graph.node_feat.extend_from_slice(&g.node_feat);
            out.graph.src.extend(g.src.iter().map(|s| s + node_start));
            out.graph.dst.extend(g.dst.iter().map(|d| d + node_start));
            out.graph.edge_feat.extend_from_slice(&g.edge_feat);
            out.node_ranges.push(node_start..out.graph.node_count());
            out.edge_ranges.push(edge_start..out.graph.edge_count());
        }
        out
    }

    pub fn batch_size(&self) -> usize {
        self.node_ranges.len()
    }

    /// Which input graph each batched node came from.
    pub fn node_graph_ids(&self) -> Vec<usize> {
        expand_ranges(&self.node_ranges)
    }
    /// Which input graph each batched edge came from.
    pub fn edge_graph_ids(&self) -> Vec<usize> {
        expand_ranges(&self.edge_ranges)
    }
}

fn expand_ranges(ranges: &[Range<usize>]) -> Vec<usize> {
    ranges
        .iter()
        .enumerate()
        .flat_map(|(k, r)| std::iter::repeat(k).take(r.len()))
        .collect()
}

/// Labels stacked row by row, one row per graph
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelTensor {
    pub width: usize,
    /// Kept apart from `data` since zero-width rows take no space
    rows: usize,
    pub data: Vec<f32>,
}
impl LabelTensor {
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.rows {
            return None;
        }
        self.data.get((i * self.width)..((i + 1) * self.width))
    }
}

/// A collated mini-batch
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub graph: BatchedGraph,
    pub labels: LabelTensor,
    /// `sqrt(1 / nodes)` of the owning graph, one entry per batched node
    pub norm_n: Vec<f32>,
    /// `sqrt(1 / edges)` of the owning graph, one entry per batched edge
    pub norm_e: Vec<f32>,
}

fn size_norm(ranges: &[Range<usize>], what: &'static str) -> Result<Vec<f32>, MalformedInput> {
    let mut out = Vec::with_capacity(ranges.last().map_or(0, |r| r.end));
    for (graph, r) in ranges.iter().enumerate() {
        if r.is_empty() {
            return Err(MalformedInput::EmptyGraph { graph, what });
        }
        let w = (1.0 / r.len() as f32).sqrt();
        out.extend(std::iter::repeat(w).take(r.len()));
    }
    Ok(out)
}

/// Merge `(graph, label)` samples into one batch with size normalization weights.
///
/// Every label must have the same length, and every graph needs at least one node and one edge.
#[instrument(level = "debug", skip_all, fields(samples = samples.len()))]
pub fn collate<G, L>(samples: &[(G, L)]) -> Result<Batch, MalformedInput>
where
    G: AsRef<SparseGraph>,
    L: AsRef<[f32]>,
{
    let Some((_, first)) = samples.first() else {
        return Err(MalformedInput::EmptyBatch);
    };
    let width = first.as_ref().len();
    let mut labels = LabelTensor {
        width,
        rows: samples.len(),
        data: Vec::with_capacity(width * samples.len()),
    };
    for (index, (_, l)) in samples.iter().enumerate() {
        let l = l.as_ref();
        if l.len() != width {
            return Err(MalformedInput::LabelShape {
                index,
                expected: width,
                found: l.len(),
            });
        }
        labels.data.extend_from_slice(l);
    }
    let graph = BatchedGraph::union(samples.iter().map(|(g, _)| g.as_ref()));
    let norm_n = size_norm(&graph.node_ranges, "nodes")?;
    let norm_e = size_norm(&graph.edge_ranges, "edges")?;
    debug!(
        nodes = graph.graph.node_count(),
        edges = graph.graph.edge_count(),
        "collated batch"
    );
    Ok(Batch {
        graph,
        labels,
        norm_n,
        norm_e,
    })
}
