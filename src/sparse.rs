//! Dense bond matrices to sparse edge lists

use crate::record::{MalformedInput, MoleculeRecord};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::*;

/// A molecule as a directed graph with integer node and edge features.
///
/// Edge `k` runs from `src[k]` to `dst[k]` and carries `edge_feat[k]`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseGraph {
    pub node_feat: Vec<u32>,
    pub src: Vec<usize>,
    pub dst: Vec<usize>,
    pub edge_feat: Vec<u32>,
}
impl SparseGraph {
    /// Scan the bond matrix in row-major order, emitting one directed edge per nonzero cell.
    ///
    /// Nothing is deduplicated or symmetrized: a bond stored in both triangles becomes two edges,
    /// and a nonzero diagonal cell becomes a self-loop. Records whose fields disagree on the
    /// atom count are rejected.
    #[instrument(level = "trace", skip_all, fields(atoms = record.num_atom))]
    pub fn from_record(record: &MoleculeRecord) -> Result<Self, MalformedInput> {
        record.validate()?;
        let n = record.num_atom;
        let mut out = Self {
            node_feat: record.atom_type.clone(),
            ..Self::default()
        };
        for i in 0..n {
            for j in 0..n {
                let bond = record.bond_type[(i, j)];
                if bond != 0 {
                    out.src.push(i);
                    out.dst.push(j);
                    out.edge_feat.push(bond);
                }
            }
        }
        trace!(edges = out.edge_count(), "converted record");
        Ok(out)
    }

    pub fn node_count(&self) -> usize {
        self.node_feat.len()
    }
    pub fn edge_count(&self) -> usize {
        self.edge_feat.len()
    }

    /// Iterate over `(source, target, feature)` triples in edge order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.src
            .iter()
            .zip(&self.dst)
            .zip(&self.edge_feat)
            .map(|((&s, &d), &f)| (s, d, f))
    }

    /// Build a `petgraph` view with the same node and edge order.
    pub fn to_petgraph(&self) -> DiGraph<u32, u32> {
        let mut g = DiGraph::with_capacity(self.node_count(), self.edge_count());
        for &f in &self.node_feat {
            g.add_node(f);
        }
        for (s, d, f) in self.edges() {
            g.add_edge(NodeIndex::new(s), NodeIndex::new(d), f);
        }
        g
    }
}

impl AsRef<SparseGraph> for SparseGraph {
    fn as_ref(&self) -> &SparseGraph {
        self
    }
}
