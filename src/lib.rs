#[rustfmt::skip]
pub mod atom_info;
pub mod batch;
pub mod convert;
pub mod dataset;
pub mod dictionary;
pub mod disp;
pub mod molecule;
pub mod ncut;
pub mod parse;
pub mod record;
pub mod sparse;
pub mod structure;

pub mod prelude {
    pub use crate::batch::{collate, Batch, BatchedGraph, LabelTensor};
    pub use crate::convert::{
        decode_atom, encode_atom, record_to_smiles, record_to_structure, records_to_smiles,
        structure_to_string, ConversionError,
    };
    pub use crate::dataset::{DatasetConfig, MoleculeDataset, MoleculeSplit, Split, StorageError};
    pub use crate::dictionary::{Dictionary, LookupError};
    pub use crate::disp::smiles::{generate_smiles, SmilesConfig};
    pub use crate::molecule::{KekulizeError, Molecule};
    pub use crate::ncut::{compute_ncut, NcutError, SpectralOracle};
    pub use crate::parse::smiles::{SmilesError, SmilesParser};
    pub use crate::record::{MalformedInput, MoleculeRecord};
    pub use crate::smiles;
    pub use crate::sparse::SparseGraph;
    pub use crate::structure::*;
}

#[cfg(test)]
mod tests;
