//! Text formats for molecules

pub mod smiles;
