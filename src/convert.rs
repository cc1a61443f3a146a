//! Records to chemical structures and SMILES strings, and back
//!
//! Atom words in the atom dictionary are augmented symbols: the element symbol followed by
//! optional space-separated tokens, `H1`/`H2`/`H3` for explicit hydrogens and `+`/`-` for a
//! unit charge. Bond words are `NONE`, `SINGLE`, `DOUBLE`, `TRIPLE` and `AROMATIC`, with `NONE`
//! at index 0.

use crate::atom_info::protons_for_symbol;
use crate::dictionary::{Dictionary, LookupError};
use crate::disp::smiles::{generate_smiles, SmilesConfig};
use crate::molecule::{KekulizeError, Molecule};
use crate::parse::smiles::{SmilesError, SmilesParser};
use crate::record::{MalformedInput, MoleculeRecord};
use crate::structure::*;
use nalgebra::DMatrix;
use petgraph::prelude::*;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::*;

/// Name of the "no bond" entry in a bond dictionary
pub const NO_BOND: &str = "NONE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Malformed(#[from] MalformedInput),
    #[error("{0:?} doesn't start with a known element symbol")]
    UnknownElement(String),
    #[error(transparent)]
    TooManyHydrogens(#[from] TooManyHydrogens),
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error("the bond dictionary maps NONE to {0}, expected 0")]
    MisplacedNoBond(usize),
}

/// Parse an augmented atom symbol like `"N + H1"`.
///
/// Unrecognized tokens after the element are skipped. An `H<n>` token fixes the hydrogen
/// count, so the atom won't pick up implicit hydrogens. Conflicting tokens don't depend on
/// their order: `-` beats `+`, and the largest hydrogen count wins.
pub fn decode_atom(token: &str) -> Result<Atom, ConversionError> {
    let mut parts = token.split_whitespace();
    let sym = parts.next().unwrap_or_default();
    let protons =
        protons_for_symbol(sym).ok_or_else(|| ConversionError::UnknownElement(token.to_string()))?;
    let parts = parts.collect::<SmallVec<&str, 4>>();
    for part in &parts {
        if !matches!(*part, "+" | "-" | "H1" | "H2" | "H3") {
            trace!(token, part, "skipped unknown atom token");
        }
    }
    let mut atom = Atom::new(protons);
    if parts.contains(&"-") {
        atom.charge = -1;
    } else if parts.contains(&"+") {
        atom.charge = 1;
    }
    let hydrogens = [("H3", 3), ("H2", 2), ("H1", 1)]
        .into_iter()
        .find(|(tok, _)| parts.contains(tok));
    if let Some((_, h)) = hydrogens {
        atom.set_hydrogens(h)?;
        atom.data.set_no_implicit(true);
    }
    Ok(atom)
}

/// Write the augmented symbol that [`decode_atom`] reads back.
///
/// Only the sign of the charge survives, and hydrogen counts above 3 aren't recognized on
/// the way back in.
pub fn encode_atom(atom: &Atom) -> String {
    let mut out = atom.symbol().to_string();
    match atom.explicit_hydrogens() {
        0 => {}
        h => {
            out.push_str(" H");
            out.push_str(&h.to_string());
        }
    }
    match atom.charge {
        0 => {}
        c if c > 0 => out.push_str(" +"),
        _ => out.push_str(" -"),
    }
    out
}

/// Build a chemical structure from a record.
///
/// Only the upper triangle of the bond matrix is read. A bond stored only below the diagonal
/// is dropped with a warning.
#[instrument(level = "debug", skip_all, fields(atoms = record.num_atom))]
pub fn record_to_structure(
    record: &MoleculeRecord,
    atom_dict: &Dictionary,
    bond_dict: &Dictionary,
) -> Result<MoleculeGraph, ConversionError> {
    record.validate()?;
    let n = record.num_atom;
    let mut graph = MoleculeGraph::with_capacity(n, n);
    for &tp in &record.atom_type {
        graph.add_node(decode_atom(atom_dict.word(tp as usize)?)?);
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let upper = record.bond_type[(i, j)];
            let name = bond_dict.word(upper as usize)?;
            match Bond::from_name(name) {
                Some(Bond::Non) => {
                    if record.bond_type[(j, i)] != 0 {
                        warn!(i, j, "bond only stored below the diagonal, ignoring it");
                    }
                }
                Some(bond) => {
                    graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), bond);
                }
                None => trace!(i, j, name, "skipped unknown bond"),
            }
        }
    }
    for atom in graph.node_indices() {
        if graph.is_aromatic_atom(atom) {
            graph[atom].data.set_aromatic(true);
        }
    }
    Ok(graph)
}

/// Canonical SMILES for a structure, optionally with aromatic bonds written as alternating
/// single and double bonds.
pub fn structure_to_string(
    graph: &MoleculeGraph,
    remove_aromatic: bool,
) -> Result<String, ConversionError> {
    let smiles = if remove_aromatic {
        let mut graph = graph.clone();
        graph.kekulize()?;
        generate_smiles(&graph, SmilesConfig::new())
    } else {
        generate_smiles(graph, SmilesConfig::new())
    };
    Ok(smiles)
}

pub fn record_to_smiles(
    record: &MoleculeRecord,
    atom_dict: &Dictionary,
    bond_dict: &Dictionary,
    remove_aromatic: bool,
) -> Result<String, ConversionError> {
    let graph = record_to_structure(record, atom_dict, bond_dict)?;
    structure_to_string(&graph, remove_aromatic)
}

/// SMILES for each record in order, stopping at the first one that fails to convert.
///
/// The error carries the position of the failing record.
pub fn records_to_smiles<'a, I: IntoIterator<Item = &'a MoleculeRecord>>(
    records: I,
    atom_dict: &Dictionary,
    bond_dict: &Dictionary,
    remove_aromatic: bool,
) -> Result<Vec<String>, (usize, ConversionError)> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            record_to_smiles(record, atom_dict, bond_dict, remove_aromatic).map_err(|err| (i, err))
        })
        .collect()
}

impl MoleculeRecord {
    /// Encode a structure, registering its atom and bond words in the dictionaries.
    ///
    /// Bonds are stored in both triangles. The target properties are left at zero.
    #[instrument(level = "debug", skip_all, fields(atoms = graph.node_count()))]
    pub fn from_structure(
        graph: &MoleculeGraph,
        atom_dict: &mut Dictionary,
        bond_dict: &mut Dictionary,
    ) -> Result<Self, ConversionError> {
        if bond_dict.is_empty() {
            bond_dict.add_word(NO_BOND);
        }
        match bond_dict.index(NO_BOND)? {
            0 => {}
            idx => return Err(ConversionError::MisplacedNoBond(idx)),
        }
        let n = graph.node_count();
        let atom_type = graph
            .node_weights()
            .map(|atom| atom_dict.add_word(&encode_atom(atom)) as u32)
            .collect::<Vec<_>>();
        let mut bond_type = DMatrix::zeros(n, n);
        for edge in graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            let idx = bond_dict.add_word(edge.weight().name()) as u32;
            bond_type[(a, b)] = idx;
            bond_type[(b, a)] = idx;
        }
        let mut record = MoleculeRecord::new(n, atom_dict.len());
        record.atom_type = atom_type;
        record.bond_type = bond_type;
        record.set_bag_of_atoms()?;
        record.set_atom_type_pe();
        record.smile = generate_smiles(graph, SmilesConfig::new());
        Ok(record)
    }

    /// Parse a SMILES string and encode it.
    pub fn from_smiles(
        smiles: &str,
        atom_dict: &mut Dictionary,
        bond_dict: &mut Dictionary,
    ) -> Result<Self, ConversionError> {
        let graph = SmilesParser::new(smiles).parse()?;
        Self::from_structure(&graph, atom_dict, bond_dict)
    }
}
