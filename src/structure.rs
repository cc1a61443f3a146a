//! Atoms, bonds, and the editable molecule graph built from them

use crate::atom_info::ATOM_DATA;
use fmtastic::{Subscript, Superscript};
use modular_bitfield::prelude::*;
use petgraph::prelude::*;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("an atom can hold at most 15 explicit hydrogens, got {0}")]
pub struct TooManyHydrogens(pub usize);

/// Per-atom flags packed into a byte
#[bitfield]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomData {
    pub explicit_h: B4,
    /// Bracket atoms carry all of their hydrogens explicitly
    pub no_implicit: bool,
    pub aromatic: bool,
    #[skip]
    __: B2,
}

/// One atom of a [`MoleculeGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom {
    pub protons: u8,
    pub charge: i8,
    /// Mass number, 0 for the natural mix
    pub isotope: u16,
    pub data: AtomData,
}
impl Atom {
    pub fn new(protons: u8) -> Self {
        Self {
            protons,
            charge: 0,
            isotope: 0,
            data: AtomData::new(),
        }
    }
    /// An atom written in lowercase in SMILES
    pub fn new_aromatic(protons: u8) -> Self {
        let mut atom = Self::new(protons);
        atom.data.set_aromatic(true);
        atom
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }
    pub fn with_isotope(mut self, isotope: u16) -> Self {
        self.isotope = isotope;
        self
    }

    pub fn explicit_hydrogens(self) -> u8 {
        self.data.explicit_h()
    }
    pub fn set_hydrogens(&mut self, h: u8) -> Result<(), TooManyHydrogens> {
        if h > 15 {
            return Err(TooManyHydrogens(h as usize));
        }
        self.data.set_explicit_h(h);
        Ok(())
    }

    pub fn symbol(self) -> &'static str {
        ATOM_DATA.get(self.protons as usize).map_or("*", |e| e.sym)
    }
    pub fn name(self) -> &'static str {
        ATOM_DATA
            .get(self.protons as usize)
            .map_or("unknown", |e| e.name)
    }
}
/// Formula-style rendering: `¹³CH₄`, `NH⁺`, `O²⁻`
impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.isotope != 0 {
            write!(f, "{}", Superscript(self.isotope))?;
        }
        f.write_str(self.symbol())?;
        match self.explicit_hydrogens() {
            0 => {}
            1 => f.write_str("H")?,
            h => write!(f, "H{}", Subscript(h))?,
        }
        match self.charge.unsigned_abs() {
            0 => return Ok(()),
            1 => {}
            c => write!(f, "{}", Superscript(c))?,
        }
        f.write_str(if self.charge > 0 { "⁺" } else { "⁻" })
    }
}

/// Bond orders, named the way bond dictionaries spell them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Bond {
    /// No bond. Only used for `.` and empty matrix cells, never stored in a graph
    Non = 0,
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}
impl Bond {
    pub const ALL: [Self; 5] = [
        Self::Non,
        Self::Single,
        Self::Double,
        Self::Triple,
        Self::Aromatic,
    ];

    /// Electrons shared per atom; aromatic bonds count as one and a half.
    pub fn order(self) -> f32 {
        match self {
            Self::Non => 0.0,
            Self::Single => 1.0,
            Self::Double => 2.0,
            Self::Triple => 3.0,
            Self::Aromatic => 1.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Non => "NONE",
            Self::Single => "SINGLE",
            Self::Double => "DOUBLE",
            Self::Triple => "TRIPLE",
            Self::Aromatic => "AROMATIC",
        }
    }
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}
impl Display for Bond {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The editable chemical structure: atoms joined by bonds
pub type MoleculeGraph = UnGraph<Atom, Bond>;
