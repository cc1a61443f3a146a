use super::macros::*;
use crate::prelude::*;

/// A path graph with `n` nodes, one directed edge per consecutive pair
fn chain(n: usize) -> SparseGraph {
    let edges = n.saturating_sub(1);
    SparseGraph {
        node_feat: vec![0; n],
        src: (0..edges).collect(),
        dst: (1..=edges).collect(),
        edge_feat: vec![1; edges],
    }
}

#[test]
fn node_norms() {
    trace_capture!();
    let samples = [
        (chain(3), vec![0.5f32]),
        (chain(5), vec![1.5]),
        (chain(2), vec![-2.0]),
    ];
    let batch = collate(&samples).unwrap();
    assert_eq!(batch.norm_n.len(), 10);
    let third = (1.0 / 3.0f32).sqrt();
    let fifth = (1.0 / 5.0f32).sqrt();
    let half = (1.0 / 2.0f32).sqrt();
    assert!(batch.norm_n[..3].iter().all(|&w| w == third));
    assert!(batch.norm_n[3..8].iter().all(|&w| w == fifth));
    assert!(batch.norm_n[8..].iter().all(|&w| w == half));

    assert_eq!(batch.norm_e.len(), 7);
    assert!(batch.norm_e[..2].iter().all(|&w| w == half));
    assert!(batch.norm_e[2..6].iter().all(|&w| w == 0.5));
    assert_eq!(batch.norm_e[6], 1.0);
}

#[test]
fn disjoint_union() {
    let samples = [(chain(3), [1.0f32]), (chain(2), [2.0]), (chain(4), [3.0])];
    let batch = collate(&samples).unwrap();
    let graph = &batch.graph;
    assert_eq!(graph.batch_size(), 3);
    assert_eq!(graph.graph.node_count(), 9);
    assert_eq!(graph.graph.src, [0, 1, 3, 5, 6, 7]);
    assert_eq!(graph.graph.dst, [1, 2, 4, 6, 7, 8]);
    assert_eq!(graph.node_ranges, [0..3, 3..5, 5..9]);
    assert_eq!(graph.edge_ranges, [0..2, 2..3, 3..6]);
    assert_eq!(graph.node_graph_ids(), [0, 0, 0, 1, 1, 2, 2, 2, 2]);
    assert_eq!(graph.edge_graph_ids(), [0, 0, 1, 2, 2, 2]);

    assert_eq!(batch.labels.rows(), 3);
    assert_eq!(batch.labels.row(1), Some(&[2.0f32][..]));
    assert_eq!(batch.labels.data, [1.0, 2.0, 3.0]);
}

#[test]
fn borrowed_samples() {
    let graphs = [chain(2), chain(3)];
    let labels = [vec![1.0f32, 0.0], vec![0.0, 1.0]];
    let samples = graphs.iter().zip(&labels).collect::<Vec<_>>();
    let batch = collate(&samples).unwrap();
    assert_eq!(batch.labels.width, 2);
    assert_eq!(batch.labels.row(1), Some(&[0.0f32, 1.0][..]));
}

#[test]
fn zero_width_labels() {
    let samples = [(chain(2), Vec::<f32>::new()), (chain(3), Vec::new())];
    let batch = collate(&samples).unwrap();
    assert_eq!(batch.labels.width, 0);
    assert_eq!(batch.labels.rows(), 2);
    assert_eq!(batch.labels.row(1), Some(&[][..]));
    assert_eq!(batch.labels.row(5), None);
}

#[test]
fn empty_graphs_rejected() {
    trace_capture!();
    let samples = [(chain(3), [1.0f32]), (chain(0), [1.0])];
    assert_eq!(
        collate(&samples),
        Err(MalformedInput::EmptyGraph {
            graph: 1,
            what: "nodes"
        })
    );
    let samples = [(chain(1), [1.0f32])];
    assert_eq!(
        collate(&samples),
        Err(MalformedInput::EmptyGraph {
            graph: 0,
            what: "edges"
        })
    );
}

#[test]
fn bad_labels_rejected() {
    let samples = [(chain(3), vec![1.0f32]), (chain(2), vec![1.0, 2.0])];
    assert_eq!(
        collate(&samples),
        Err(MalformedInput::LabelShape {
            index: 1,
            expected: 1,
            found: 2
        })
    );
    let empty: [(SparseGraph, Vec<f32>); 0] = [];
    assert_eq!(collate(&empty), Err(MalformedInput::EmptyBatch));
}
