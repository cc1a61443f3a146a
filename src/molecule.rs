//! Structure-level queries and edits on a [`MoleculeGraph`]

use crate::atom_info::default_valence;
use crate::structure::*;
use petgraph::prelude::*;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::*;

/// Aromatic bonds couldn't be assigned alternating orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("can't kekulize: no double bond could be placed on aromatic atom {atom}")]
pub struct KekulizeError {
    pub atom: usize,
}

pub trait Molecule {
    /// Sum of bond orders on an atom, rounded up so aromatic rings count as whole bonds.
    fn bond_order_sum(&self, atom: NodeIndex) -> u8;
    /// Hydrogens implied by the default valence, on top of the explicit ones.
    fn implicit_hydrogens(&self, atom: NodeIndex) -> u8;
    fn total_hydrogens(&self, atom: NodeIndex) -> u8;
    /// Whether any bond on this atom is aromatic.
    fn is_aromatic_atom(&self, atom: NodeIndex) -> bool;
    /// Replace aromatic bonds with explicit single and double bonds, clearing aromatic flags.
    fn kekulize(&mut self) -> Result<(), KekulizeError>;
}

impl Molecule for MoleculeGraph {
    fn bond_order_sum(&self, atom: NodeIndex) -> u8 {
        self.edges(atom)
            .map(|e| e.weight().order())
            .sum::<f32>()
            .ceil()
            .clamp(0.0, 255.0) as u8
    }
    fn implicit_hydrogens(&self, atom: NodeIndex) -> u8 {
        let a = self[atom];
        if a.data.no_implicit() {
            return 0;
        }
        let Some(valence) = default_valence(a.protons, a.charge) else {
            return 0;
        };
        valence
            .saturating_sub(self.bond_order_sum(atom))
            .saturating_sub(a.explicit_hydrogens())
    }
    fn total_hydrogens(&self, atom: NodeIndex) -> u8 {
        self[atom].explicit_hydrogens() + self.implicit_hydrogens(atom)
    }
    fn is_aromatic_atom(&self, atom: NodeIndex) -> bool {
        self.edges(atom).any(|e| *e.weight() == Bond::Aromatic)
    }

    #[instrument(level = "debug", skip_all, fields(atoms = self.node_count()))]
    fn kekulize(&mut self) -> Result<(), KekulizeError> {
        let n = self.node_count();
        // atoms that still have room for one double bond inside the aromatic system
        let mut needs = vec![false; n];
        for atom in self.node_indices() {
            let mut aromatic = 0u8;
            let mut fixed = 0f32;
            for e in self.edges(atom) {
                match *e.weight() {
                    Bond::Aromatic => aromatic += 1,
                    b => fixed += b.order(),
                }
            }
            if aromatic == 0 {
                continue;
            }
            let a = self[atom];
            let Some(valence) = default_valence(a.protons, a.charge) else {
                continue;
            };
            let used = a.explicit_hydrogens() as f32 + fixed + aromatic as f32;
            needs[atom.index()] = valence as f32 - used >= 1.0;
            trace!(atom = atom.index(), used, needs = needs[atom.index()], "checked aromatic atom");
        }

        let mut partner = vec![None::<EdgeIndex>; n];
        if !match_all(self, &needs, &mut partner) {
            let atom = (0..n)
                .find(|&i| needs[i] && partner[i].is_none())
                .unwrap_or_default();
            return Err(KekulizeError { atom });
        }

        for e in self.edge_indices().collect::<Vec<_>>() {
            if self[e] == Bond::Aromatic {
                let Some((a, _)) = self.edge_endpoints(e) else {
                    continue;
                };
                self[e] = if partner[a.index()] == Some(e) {
                    Bond::Double
                } else {
                    Bond::Single
                };
            }
        }
        for atom in self.node_weights_mut() {
            atom.data.set_aromatic(false);
        }
        debug!("kekulized");
        Ok(())
    }
}

/// Pair up every atom in `needs` over aromatic bonds, backtracking on dead ends.
fn match_all(graph: &MoleculeGraph, needs: &[bool], partner: &mut [Option<EdgeIndex>]) -> bool {
    // most constrained atom first
    let mut best: Option<(NodeIndex, SmallVec<(NodeIndex, EdgeIndex), 4>)> = None;
    for atom in graph.node_indices() {
        if !needs[atom.index()] || partner[atom.index()].is_some() {
            continue;
        }
        let options: SmallVec<(NodeIndex, EdgeIndex), 4> = graph
            .edges(atom)
            .filter(|e| *e.weight() == Bond::Aromatic)
            .map(|e| {
                let other = if e.source() == atom {
                    e.target()
                } else {
                    e.source()
                };
                (other, e.id())
            })
            .filter(|(o, _)| needs[o.index()] && partner[o.index()].is_none())
            .collect();
        if best.as_ref().map_or(true, |b| options.len() < b.1.len()) {
            best = Some((atom, options));
        }
    }
    let Some((atom, options)) = best else {
        return true;
    };
    for (other, edge) in options {
        partner[atom.index()] = Some(edge);
        partner[other.index()] = Some(edge);
        if match_all(graph, needs, partner) {
            return true;
        }
        partner[atom.index()] = None;
        partner[other.index()] = None;
    }
    false
}
