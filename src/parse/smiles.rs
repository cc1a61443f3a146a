use crate::atom_info::protons_for_symbol;
use crate::structure::*;
use ahash::AHashMap;
use atoi::FromRadix10Checked;
use petgraph::prelude::*;
use thiserror::Error;
use tracing::*;
use SmilesErrorKind::*;

/// Parse a SMILES literal, panicking on failure. Meant for tests and examples.
#[macro_export]
macro_rules! smiles {
    ($smiles:literal) => {
        $crate::parse::smiles::SmilesParser::new($smiles)
            .parse()
            .expect(concat!("invalid SMILES literal ", $smiles))
    };
}

/// What went wrong, see [`SmilesError`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesErrorKind {
    #[error(transparent)]
    TooManyHydrogens(#[from] crate::structure::TooManyHydrogens),
    #[error("{0:?} is not a recognized element")]
    UnknownElement(String),
    #[error("ring {0} is never closed")]
    UnclosedLoop(usize),
    #[error("number doesn't fit in {0}")]
    NumberTooLarge(&'static str),
    #[error("expected a ring number after '%'")]
    ExpectedRingNumber,
    #[error("expected an atom, found {}", found(.0))]
    ExpectedAtom(Option<u8>),
    #[error("bracket atom is missing its ']'")]
    ExpectedClosingBracket,
    #[error("branch is missing its ')'")]
    ExpectedClosingParen,
    #[error("ring bond written as {0} on one end and {1} on the other")]
    LoopBondMismatch(Bond, Bond),
    #[error("atoms are already bonded")]
    DuplicateBond,
}

fn found(c: &Option<u8>) -> String {
    match c {
        Some(c) => format!("{:?}", *c as char),
        None => "end of input".to_string(),
    }
}

/// A SMILES string couldn't be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid SMILES at byte {index}: {kind}")]
pub struct SmilesError {
    pub index: usize,
    pub kind: SmilesErrorKind,
}
impl SmilesError {
    pub const fn new(index: usize, kind: SmilesErrorKind) -> Self {
        Self { index, kind }
    }
}

/// Single-pass SMILES reader.
///
/// Branches are tracked on an explicit stack of parent atoms, and ring bonds wait in a map
/// keyed by ring number until their second digit shows up. A bond symbol is held until the
/// atom or ring digit it applies to.
#[derive(Debug, Clone)]
pub struct SmilesParser<'a> {
    input: &'a [u8],
    pos: usize,
    graph: MoleculeGraph,
    /// Open rings: the atom that opened each one and its bond symbol, if it had one
    rings: AHashMap<usize, (NodeIndex, Option<Bond>)>,
}
impl<'a> SmilesParser<'a> {
    pub fn new<I: AsRef<[u8]> + ?Sized>(input: &'a I) -> Self {
        Self {
            input: input.as_ref(),
            pos: 0,
            graph: MoleculeGraph::new_undirected(),
            rings: AHashMap::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
    fn err(&self, kind: SmilesErrorKind) -> SmilesError {
        SmilesError::new(self.pos, kind)
    }

    /// Bond two atoms. With no bond symbol, two aromatic atoms get an aromatic bond and
    /// anything else a single one.
    fn connect(&mut self, a: NodeIndex, b: NodeIndex, bond: Option<Bond>) {
        let bond = bond.unwrap_or_else(|| {
            if self.graph[a].data.aromatic() && self.graph[b].data.aromatic() {
                Bond::Aromatic
            } else {
                Bond::Single
            }
        });
        if bond != Bond::Non {
            self.graph.add_edge(a, b, bond);
        }
    }

    /// Read a run of digits, if there is one. Values that overflow `T` are errors.
    fn read_number<T: FromRadix10Checked>(&mut self) -> Result<Option<T>, SmilesError> {
        let start = self.pos;
        let (n, used) = T::from_radix_10_checked(&self.input[self.pos..]);
        self.pos += used;
        match n {
            _ if used == 0 => Ok(None),
            Some(n) => Ok(Some(n)),
            None => Err(SmilesError::new(
                start,
                NumberTooLarge(std::any::type_name::<T>()),
            )),
        }
    }

    fn read_bond(&mut self) -> Option<Bond> {
        let bond = match self.peek()? {
            b'.' => Bond::Non,
            b'-' | b'/' | b'\\' => Bond::Single,
            b'=' => Bond::Double,
            b'#' => Bond::Triple,
            b':' => Bond::Aromatic,
            _ => return None,
        };
        self.pos += 1;
        Some(bond)
    }

    /// An atom from the organic subset, written without brackets
    fn read_organic(&mut self) -> Option<Atom> {
        let next = self.input.get(self.pos + 1).copied();
        let (protons, len, aromatic) = match (self.peek()?, next) {
            (b'C', Some(b'l')) => (17, 2, false),
            (b'B', Some(b'r')) => (35, 2, false),
            (b'B', _) => (5, 1, false),
            (b'C', _) => (6, 1, false),
            (b'N', _) => (7, 1, false),
            (b'O', _) => (8, 1, false),
            (b'F', _) => (9, 1, false),
            (b'P', _) => (15, 1, false),
            (b'S', _) => (16, 1, false),
            (b'I', _) => (53, 1, false),
            (b'*', _) => (0, 1, false),
            (b'b', _) => (5, 1, true),
            (b'c', _) => (6, 1, true),
            (b'n', _) => (7, 1, true),
            (b'o', _) => (8, 1, true),
            (b'p', _) => (15, 1, true),
            (b's', _) => (16, 1, true),
            _ => return None,
        };
        self.pos += len;
        Some(if aromatic {
            Atom::new_aromatic(protons)
        } else {
            Atom::new(protons)
        })
    }

    /// Element symbol inside brackets. Lowercase marks an aromatic atom, and the longest
    /// matching symbol wins so that `Cl` isn't read as `C`.
    fn read_element(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let first = match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                return Ok(Atom::new(0));
            }
            Some(c) if c.is_ascii_alphabetic() => c,
            c => return Err(self.err(ExpectedAtom(c))),
        };
        let aromatic = first.is_ascii_lowercase();
        let max_len = 1 + self.input[(start + 1)..]
            .iter()
            .take_while(|c| c.is_ascii_lowercase())
            .take(2)
            .count();
        for len in (1..=max_len).rev() {
            let mut sym = String::from_utf8_lossy(&self.input[start..(start + len)]).into_owned();
            sym[..1].make_ascii_uppercase();
            if let Some(protons) = protons_for_symbol(&sym) {
                self.pos += len;
                let mut atom = Atom::new(protons);
                atom.data.set_aromatic(aromatic);
                return Ok(atom);
            }
        }
        let sym = String::from_utf8_lossy(&self.input[start..(start + max_len)]).into_owned();
        Err(SmilesError::new(start, UnknownElement(sym)))
    }

    /// `+`, `++`, `+2` and the negative forms
    fn read_charge(&mut self) -> Result<i8, SmilesError> {
        let start = self.pos;
        let (sign, symbol) = match self.peek() {
            Some(c @ b'+') => (1, c),
            Some(c @ b'-') => (-1, c),
            _ => return Ok(0),
        };
        self.pos += 1;
        if let Some(magnitude) = self.read_number::<i8>()? {
            return Ok(sign * magnitude);
        }
        let repeats = self.input[self.pos..]
            .iter()
            .take_while(|&&c| c == symbol)
            .count();
        self.pos += repeats;
        let magnitude = i8::try_from(repeats + 1)
            .map_err(|_| SmilesError::new(start, NumberTooLarge("i8")))?;
        Ok(sign * magnitude)
    }

    /// A bracket atom: `[` isotope? element chirality? hydrogens? charge? `]`
    #[instrument(level = "trace", skip(self), fields(pos = self.pos))]
    fn read_bracket(&mut self) -> Result<Atom, SmilesError> {
        self.pos += 1;
        let isotope = self.read_number::<u16>()?.unwrap_or(0);
        let mut atom = self.read_element()?;
        atom.isotope = isotope;
        atom.data.set_no_implicit(true);
        // chirality isn't tracked
        while self.peek() == Some(b'@') {
            self.pos += 1;
        }
        if self.peek() == Some(b'H') {
            self.pos += 1;
            let h = self.read_number::<u8>()?.unwrap_or(1);
            atom.set_hydrogens(h).map_err(|e| self.err(e.into()))?;
        }
        atom.charge = self.read_charge()?;
        if self.peek() != Some(b']') {
            return Err(self.err(ExpectedClosingBracket));
        }
        self.pos += 1;
        trace!(%atom, "read bracket atom");
        Ok(atom)
    }

    fn read_ring_number(&mut self) -> Result<usize, SmilesError> {
        match self.peek() {
            Some(b'%') => {
                self.pos += 1;
                self.read_number::<usize>()?
                    .ok_or_else(|| self.err(ExpectedRingNumber))
            }
            Some(c @ b'0'..=b'9') => {
                self.pos += 1;
                Ok((c - b'0') as usize)
            }
            _ => Err(self.err(ExpectedRingNumber)),
        }
    }

    /// Open ring `num` at `atom`, or close it if it's already open. The bond symbols on both
    /// ends have to agree when both are written.
    fn ring_bond(
        &mut self,
        atom: NodeIndex,
        num: usize,
        at: usize,
        bond: Option<(Bond, usize)>,
    ) -> Result<(), SmilesError> {
        let Some((other, opened)) = self.rings.remove(&num) else {
            trace!(num, atom = atom.index(), "opened ring");
            self.rings.insert(num, (atom, bond.map(|b| b.0)));
            return Ok(());
        };
        let bond = match (bond, opened) {
            (Some((b1, idx)), Some(b2)) if b1 != b2 => {
                return Err(SmilesError::new(idx, LoopBondMismatch(b1, b2)));
            }
            (Some((b, _)), _) => Some(b),
            (None, opened) => opened,
        };
        if other == atom || self.graph.contains_edge(atom, other) {
            return Err(SmilesError::new(at, DuplicateBond));
        }
        trace!(num, atom = atom.index(), other = other.index(), "closed ring");
        self.connect(atom, other, bond);
        Ok(())
    }

    /// Parse the whole input into a molecule graph.
    #[instrument(level = "debug", skip_all)]
    pub fn parse(mut self) -> Result<MoleculeGraph, SmilesError> {
        let mut branches = Vec::<NodeIndex>::new();
        let mut prev = None::<NodeIndex>;
        // a bond symbol waiting for the atom or ring digit it belongs to
        let mut pending = None::<(Bond, usize)>;
        // set between a '(' and the first atom of its branch
        let mut empty_branch = false;

        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                b'(' | b')' if pending.is_some() || empty_branch => {
                    return Err(self.err(ExpectedAtom(Some(c))));
                }
                b'(' => {
                    let parent = prev.ok_or_else(|| self.err(ExpectedAtom(Some(c))))?;
                    branches.push(parent);
                    empty_branch = true;
                    self.pos += 1;
                }
                b')' => {
                    prev = Some(
                        branches
                            .pop()
                            .ok_or_else(|| self.err(ExpectedAtom(Some(c))))?,
                    );
                    self.pos += 1;
                }
                b'0'..=b'9' | b'%' => {
                    let atom = prev.ok_or_else(|| self.err(ExpectedAtom(Some(c))))?;
                    let num = self.read_ring_number()?;
                    self.ring_bond(atom, num, start, pending.take())?;
                }
                _ => {
                    if let Some(bond) = self.read_bond() {
                        if pending.is_some() || prev.is_none() {
                            return Err(SmilesError::new(start, ExpectedAtom(Some(c))));
                        }
                        pending = Some((bond, start));
                        continue;
                    }
                    let atom = if c == b'[' {
                        self.read_bracket()?
                    } else {
                        self.read_organic()
                            .ok_or_else(|| self.err(ExpectedAtom(Some(c))))?
                    };
                    let node = self.graph.add_node(atom);
                    if let Some(parent) = prev {
                        self.connect(parent, node, pending.take().map(|b| b.0));
                    }
                    prev = Some(node);
                    empty_branch = false;
                }
            }
        }

        if pending.is_some() || empty_branch {
            return Err(self.err(ExpectedAtom(None)));
        }
        if !branches.is_empty() {
            return Err(self.err(ExpectedClosingParen));
        }
        if let Some(&num) = self.rings.keys().min() {
            return Err(self.err(UnclosedLoop(num)));
        }
        debug!(
            atoms = self.graph.node_count(),
            bonds = self.graph.edge_count(),
            "parsed SMILES"
        );
        Ok(self.graph)
    }
}
