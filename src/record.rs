//! Dense per-molecule tensors

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::*;

/// Input that would make a conversion produce garbage instead of a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInput {
    #[error("graph {graph} in the batch has no {what}")]
    EmptyGraph { graph: usize, what: &'static str },
    #[error("can't collate an empty batch")]
    EmptyBatch,
    #[error("label {index} has {found} values, expected {expected}")]
    LabelShape {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("{what} has length {found}, expected {expected}")]
    Length {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("atom {atom} has type {atom_type}, but there are only {num_atom_type} types")]
    AtomTypeOutOfRange {
        atom: usize,
        atom_type: u32,
        num_atom_type: usize,
    },
    #[error("not a permutation of 0..{0}")]
    BadPermutation(usize),
    #[error("matrix is {rows}x{cols}, expected a square matrix")]
    NotSquare { rows: usize, cols: usize },
    #[error("can't split {nodes} nodes into {clusters} clusters")]
    ClusterCount { clusters: usize, nodes: usize },
    #[error("assignment row {row} has {nonzero} nonzero entries, expected a single 1")]
    AssignmentRow { row: usize, nonzero: usize },
}

/// One molecule as dense tensors.
///
/// `atom_type` and `bond_type` hold dictionary indices; bond index 0 means "no bond".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeRecord {
    pub num_atom: usize,
    pub atom_type: Vec<u32>,
    /// Repeat rank of each atom's type: how many atoms of the same type come before it
    pub atom_type_pe: Vec<u32>,
    pub bond_type: DMatrix<u32>,
    pub bag_of_atoms: Vec<u32>,
    pub logp_sa: f32,
    /// The regression target
    pub logp_sa_cycle_normalized: f32,
    pub smile: String,
}
impl MoleculeRecord {
    pub fn new(num_atom: usize, num_atom_type: usize) -> Self {
        Self {
            num_atom,
            atom_type: vec![0; num_atom],
            atom_type_pe: vec![0; num_atom],
            bond_type: DMatrix::zeros(num_atom, num_atom),
            bag_of_atoms: vec![0; num_atom_type],
            logp_sa: 0.0,
            logp_sa_cycle_normalized: 0.0,
            smile: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.num_atom
    }
    pub fn is_empty(&self) -> bool {
        self.num_atom == 0
    }

    /// Check the shape invariants between the fields.
    pub fn validate(&self) -> Result<(), MalformedInput> {
        let n = self.num_atom;
        for (what, found) in [
            ("atom_type", self.atom_type.len()),
            ("atom_type_pe", self.atom_type_pe.len()),
            ("bond_type rows", self.bond_type.nrows()),
            ("bond_type columns", self.bond_type.ncols()),
        ] {
            if found != n {
                return Err(MalformedInput::Length {
                    what,
                    expected: n,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Fill `bag_of_atoms` with the histogram of `atom_type`.
    pub fn set_bag_of_atoms(&mut self) -> Result<(), MalformedInput> {
        let num_atom_type = self.bag_of_atoms.len();
        let mut bag = vec![0; num_atom_type];
        for (atom, &tp) in self.atom_type.iter().enumerate() {
            let slot = bag
                .get_mut(tp as usize)
                .ok_or(MalformedInput::AtomTypeOutOfRange {
                    atom,
                    atom_type: tp,
                    num_atom_type,
                })?;
            *slot += 1;
        }
        self.bag_of_atoms = bag;
        Ok(())
    }

    /// Fill `atom_type_pe` with the repeat rank of each atom's type, scanning left to right.
    pub fn set_atom_type_pe(&mut self) {
        let mut seen = ahash::AHashMap::<u32, u32>::new();
        self.atom_type_pe = self
            .atom_type
            .iter()
            .map(|&tp| {
                let count = seen.entry(tp).or_insert(0);
                let pe = *count;
                *count += 1;
                pe
            })
            .collect();
    }

    /// Reorder atoms so that new atom `i` is old atom `perm[i]`. Rows and columns of the bond
    /// matrix move together, so every bond stays between the same two atoms.
    pub fn permute(&mut self, perm: &[usize]) -> Result<(), MalformedInput> {
        let n = self.num_atom;
        let mut seen = vec![false; n];
        if perm.len() != n
            || !perm
                .iter()
                .all(|&p| p < n && !std::mem::replace(&mut seen[p], true))
        {
            return Err(MalformedInput::BadPermutation(n));
        }
        self.validate()?;
        self.atom_type = perm.iter().map(|&p| self.atom_type[p]).collect();
        self.atom_type_pe = perm.iter().map(|&p| self.atom_type_pe[p]).collect();
        let old = &self.bond_type;
        self.bond_type = DMatrix::from_fn(n, n, |i, j| old[(perm[i], perm[j])]);
        trace!(?perm, "permuted atoms");
        Ok(())
    }

    /// Apply a uniformly random atom permutation, returning it.
    #[cfg(feature = "rand")]
    pub fn shuffle_indexing<R: rand::Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<usize>, MalformedInput> {
        use rand::seq::SliceRandom;
        let mut perm = (0..self.num_atom).collect::<Vec<_>>();
        perm.shuffle(rng);
        self.permute(&perm)?;
        Ok(perm)
    }

    /// Whether every bond is stored in both triangles of the bond matrix.
    pub fn is_symmetric(&self) -> bool {
        self.bond_type == self.bond_type.transpose()
    }

    /// Number of nonzero cells in the bond matrix.
    pub fn bond_entries(&self) -> usize {
        self.bond_type.iter().filter(|&&b| b != 0).count()
    }
}
